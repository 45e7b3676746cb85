//! Single-shot callback delivery.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::callback::{validate_callback_url, SsrfError};
use crate::egress::{new_safe_http_client, EgressError, SafeHttpClient};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("callback rejected: {0}")]
    Rejected(#[from] SsrfError),

    #[error(transparent)]
    Egress(#[from] EgressError),
}

/// Event body posted to a callback URL.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackEvent {
    pub request_id: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

impl CallbackEvent {
    pub fn new(action: impl Into<String>, stream: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().simple().to_string(),
            action: action.into(),
            created_at: Utc::now(),
            stream,
        }
    }

    /// Connectivity probe sent by the callback test endpoint.
    pub fn test() -> Self {
        Self::new("on_test", None)
    }
}

/// Posts callback events through the egress guard. No retries.
#[derive(Clone, Debug)]
pub struct CallbackNotifier {
    client: SafeHttpClient,
}

impl CallbackNotifier {
    pub fn new(timeout: Duration) -> Result<Self, EgressError> {
        Ok(Self {
            client: new_safe_http_client(timeout)?,
        })
    }

    /// Validate `url`, post `event` once and return the upstream status code.
    pub async fn deliver(&self, url: &str, event: &CallbackEvent) -> Result<u16, NotifyError> {
        validate_callback_url(url).await?;

        let response = self.client.post_json(url, event).await?;
        let status = response.status().as_u16();

        tracing::info!(
            action = %event.action,
            request_id = %event.request_id,
            status,
            "Callback delivered"
        );

        Ok(status)
    }
}
