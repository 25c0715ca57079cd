use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

use super::{Notifier, NotifyError, RecordUpdate};

#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpNotifier {
    pub fn new(mut base_url: Url) -> Self {
        // `Url::join` drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!(base_url = %base_url, "✅ Notifier configured");

        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, NotifyError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| NotifyError::InvalidEndpoint(e.to_string()))
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, update: &RecordUpdate) -> Result<(), NotifyError> {
        let url = self.endpoint(&update.path)?;
        debug!(%url, "Notifying record update");

        let response = self
            .client
            .put(url)
            .json(&update.payload)
            .send()
            .await
            .map_err(|e| NotifyError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
