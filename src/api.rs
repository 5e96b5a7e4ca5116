//! Transport to the external grades REST API.
//!
//! Every call goes through [`ApiClient`], which owns a pooled [`reqwest::Client`] and the
//! configured base URL. Non-2xx answers are turned into [`GradebookError::ApiStatus`] with the
//! response body kept as the message, and empty or `null` bodies decode as the default value.

use crate::{
    config::ApiConfig,
    error::{
        ApiStatusSnafu, BuildClientSnafu, DecodeJsonSnafu, GradebookError, GradebookResult,
        NotABaseUrlSnafu, ReadBodySnafu, SendRequestSnafu,
    },
};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> GradebookResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("gradebook/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(BuildClientSnafu)?;

        Ok(Self {
            http,
            base_url: config.base_url().clone(),
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> GradebookResult<Url> {
        let mut url = self.base_url.clone();
        {
            let Ok(mut path) = url.path_segments_mut() else {
                return NotABaseUrlSnafu {
                    original: self.base_url.to_string(),
                }
                .fail();
            };
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> GradebookResult<(StatusCode, Url, Vec<u8>)> {
        let url = self.endpoint(segments)?;
        let method_name = method_name(&method);
        debug!(method = method_name, %url, "calling grades API");

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context(SendRequestSnafu {
            method: method_name,
            url: url.to_string(),
        })?;
        let status = response.status();
        let bytes = response.bytes().await.context(ReadBodySnafu {
            url: url.to_string(),
        })?;

        Ok((status, url, bytes.to_vec()))
    }

    fn check_status(
        status: StatusCode,
        method: &'static str,
        url: &Url,
        bytes: &[u8],
    ) -> GradebookResult<()> {
        if status.is_success() {
            return Ok(());
        }

        let message = String::from_utf8_lossy(bytes).into_owned();
        warn!(%status, method, %url, ?message, "grades API refused request");
        ApiStatusSnafu {
            status,
            method,
            url: url.to_string(),
            message,
        }
        .fail()
    }

    /// `GET` a collection. An empty or `null` body is an empty list.
    pub async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> GradebookResult<Vec<T>> {
        let (status, url, bytes) = self.send(Method::GET, segments, None::<&()>).await?;
        Self::check_status(status, "GET", &url, &bytes)?;
        decode_or_default(&url, &bytes)
    }

    /// Like [`Self::get_list`], but a `404` is read as "nothing there yet".
    pub async fn get_list_or_empty<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> GradebookResult<Vec<T>> {
        match self.get_list(segments).await {
            Err(GradebookError::ApiStatus { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(vec![])
            }
            other => other,
        }
    }

    /// `GET` a single object, with a `404` mapped to `None`.
    pub async fn get_one<T: DeserializeOwned>(&self, segments: &[&str]) -> GradebookResult<Option<T>> {
        let (status, url, bytes) = self.send(Method::GET, segments, None::<&()>).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check_status(status, "GET", &url, &bytes)?;
        decode_or_default::<Option<T>>(&url, &bytes)
    }

    pub async fn post<B: Serialize + Sync>(&self, segments: &[&str], body: &B) -> GradebookResult<()> {
        let (status, url, bytes) = self.send(Method::POST, segments, Some(body)).await?;
        Self::check_status(status, "POST", &url, &bytes)
    }

    pub async fn delete(&self, segments: &[&str]) -> GradebookResult<()> {
        let (status, url, bytes) = self.send(Method::DELETE, segments, None::<&()>).await?;
        Self::check_status(status, "DELETE", &url, &bytes)
    }
}

fn method_name(method: &Method) -> &'static str {
    if method == Method::POST {
        "POST"
    } else if method == Method::DELETE {
        "DELETE"
    } else {
        "GET"
    }
}

fn decode_or_default<T: DeserializeOwned + Default>(url: &Url, bytes: &[u8]) -> GradebookResult<T> {
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Ok(T::default());
    }

    serde_json::from_slice(trimmed).context(DecodeJsonSnafu {
        url: url.to_string(),
    })
}
