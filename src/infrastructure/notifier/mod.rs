use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod http;

#[cfg(test)]
pub mod recording;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier rejected update with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier unreachable: {0}")]
    Unreachable(String),

    #[error("invalid notifier endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A record update to deliver downstream, addressed relative to the notifier base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub path: String,
    pub payload: Value,
}

/// Downstream callback that records produced derivative keys against an entity.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, update: &RecordUpdate) -> Result<(), NotifyError>;
}
