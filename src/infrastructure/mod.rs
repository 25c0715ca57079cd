pub mod notifier;
pub mod queue;
pub mod storage;
