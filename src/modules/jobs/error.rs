use thiserror::Error;

use crate::infrastructure::notifier::NotifyError;
use crate::infrastructure::storage::StorageError;
use crate::media::TransformError;

/// Every way a single job can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),

    #[error("failed to fetch source object '{key}': {source}")]
    SourceFetch {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to decode source media: {0}")]
    Decode(String),

    #[error("failed to encode derivative: {0}")]
    Encode(String),

    #[error("failed to stage job files: {0}")]
    Staging(#[from] std::io::Error),

    #[error("failed to upload derivative '{key}': {source}")]
    DerivativeUpload {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to notify record update: {0}")]
    Notification(#[from] NotifyError),
}

impl JobError {
    pub fn status_code(&self) -> u16 {
        match self {
            JobError::Validation(_) => 400,
            JobError::Notification(NotifyError::Rejected { status, .. }) if *status >= 400 => *status,
            // A 2xx other than 200 or a 3xx still failed the update; never echo a success code.
            _ => 500,
        }
    }
}

impl From<TransformError> for JobError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::Decode(reason) => JobError::Decode(reason),
            TransformError::Encode(reason) => JobError::Encode(reason),
            TransformError::Io(e) => JobError::Staging(e),
        }
    }
}
