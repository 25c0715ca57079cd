use crate::modules::jobs::service::JobOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub jobs: JobOrchestrator,
}

impl AppState {
    pub fn new(jobs: JobOrchestrator) -> Self {
        Self { jobs }
    }
}
