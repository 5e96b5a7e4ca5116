use crate::{
    api::ApiClient,
    config::RuntimeConfiguration,
    error::GradebookResult,
    maud_conveniences::render_nav,
    routes::sse::SseEvent,
};
use maud::{DOCTYPE, Markup, html};
use tokio::sync::broadcast::{Receiver, Sender, channel};

// error responses carry the banner, so htmx has to swap them too
const HTMX_CONFIG: &str = r#"{"responseHandling": [{"code": "204", "swap": false}, {"code": ".*", "swap": true}]}"#;

#[derive(Clone, Debug)]
pub struct GradebookState {
    api: ApiClient,
    config: RuntimeConfiguration,
    sse_events_sender: Sender<SseEvent>,
}

impl GradebookState {
    pub fn new(config: RuntimeConfiguration) -> GradebookResult<Self> {
        let api = ApiClient::new(&config.api_config())?;
        let (tx, _rx) = channel(16);

        Ok(Self {
            api,
            config,
            sse_events_sender: tx,
        })
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    meta name="htmx-config" content=(HTMX_CONFIG) {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Gradebook" }
                }
                body hx-ext="sse" sse-connect="/sse_feed" class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav())
                    div id="error_banner" class="max-w-4xl w-full" {}
                    (markup)
                }
            }
        }
    }

    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<SseEvent> {
        self.sse_events_sender.subscribe()
    }

    pub fn send_sse_event(&self, event: SseEvent) {
        let _ = self.sse_events_sender.send(event);
    }
}
