use crate::error::{BadEnvVarSnafu, GradebookResult, NotABaseUrlSnafu, ParseUrlSnafu};
use dotenvy::var;
use reqwest::Url;
use snafu::{ResultExt, ensure};
use std::sync::Arc;

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    api_config: Arc<ApiConfig>,
    server_ip: Arc<str>,
}

impl RuntimeConfiguration {
    pub fn new() -> GradebookResult<Self> {
        let server_ip = var("GRADEBOOK_SERVER_IP").unwrap_or_else(|_| DEFAULT_SERVER_IP.to_string());

        Ok(Self::from_parts(ApiConfig::new()?, server_ip))
    }

    pub fn from_parts(api_config: ApiConfig, server_ip: impl Into<Arc<str>>) -> Self {
        Self {
            api_config: Arc::new(api_config),
            server_ip: server_ip.into(),
        }
    }

    pub fn api_config(&self) -> Arc<ApiConfig> {
        self.api_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }
}

/// Where the external grade-management REST API lives.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
}

impl ApiConfig {
    pub fn new() -> GradebookResult<Self> {
        let name = "GRADEBOOK_API_URL";
        let raw = var(name).context(BadEnvVarSnafu { name })?;
        Self::from_url_str(&raw)
    }

    pub fn from_url_str(raw: &str) -> GradebookResult<Self> {
        let base_url = Url::parse(raw).context(ParseUrlSnafu { original: raw })?;
        ensure!(
            !base_url.cannot_be_a_base(),
            NotABaseUrlSnafu { original: raw }
        );

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
