use std::sync::Mutex;

use async_trait::async_trait;

use super::{Notifier, NotifyError, RecordUpdate};

/// Notifier that answers with a fixed status and remembers what it was sent.
pub struct RecordingNotifier {
    status: u16,
    updates: Mutex<Vec<RecordUpdate>>,
}

impl RecordingNotifier {
    pub fn responding(status: u16) -> Self {
        Self {
            status,
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, update: &RecordUpdate) -> Result<(), NotifyError> {
        self.updates.lock().unwrap().push(update.clone());
        if self.status == 200 {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: self.status,
                body: "unavailable".to_string(),
            })
        }
    }
}
