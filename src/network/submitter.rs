use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::components::validation::{Credentials, ValidationErrorMap};
use crate::config::Config;
use crate::infrastructure::error::WidgetError;

/// Server verdict on a submission.
///
/// Wire format: `{"status": "ok"}` or
/// `{"status": "fail", "data": {"login": {"code": "...", "args": []}}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitResponse {
    Ok,
    Fail {
        #[serde(default)]
        data: ValidationErrorMap,
    },
}

/// Sends credentials to a named endpoint.
///
/// Transport and protocol failures come back as `Err`; a rejection by the
/// server is a successful call returning [`SubmitResponse::Fail`].
#[async_trait(?Send)]
pub trait Submitter {
    async fn submit(&self, endpoint: &str, credentials: &Credentials) -> Result<SubmitResponse, WidgetError>;
}

/// JSON-over-HTTP submitter: POSTs to `{base_url}/{endpoint}`.
pub struct HttpSubmitter {
    client: Client,
    base_url: String,
}

impl HttpSubmitter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WidgetError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, WidgetError> {
        Self::new(
            config.endpoint_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[async_trait(?Send)]
impl Submitter for HttpSubmitter {
    async fn submit(&self, endpoint: &str, credentials: &Credentials) -> Result<SubmitResponse, WidgetError> {
        let url = self.url_for(endpoint);
        tracing::debug!(url = %url, login = %credentials.login, "submitting credentials");

        let response = self.client.post(&url).json(credentials).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Some servers answer a rejection with a 4xx status and the usual body.
        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(WidgetError::network(
                format!("server responded with {}", status),
                Some(url),
            )),
            Err(e) => Err(WidgetError::Parsing {
                message: e.to_string(),
                content_type: "JSON".to_string(),
            }),
        }
    }
}
