use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::modules::jobs::model::{JobRequest, JobResult};
use crate::modules::jobs::service::JobOrchestrator;
use futures_util::StreamExt;
use lapin::options::BasicAckOptions;
use tracing::{error, info, warn};

/// Consume job requests from `queue_name` one at a time.
///
/// Every delivery is acked once its job has returned, whatever the outcome:
/// jobs are single-shot and a failed one is not redelivered.
pub async fn start_job_worker(
    queue: RabbitMqService,
    queue_name: String,
    jobs: JobOrchestrator,
) -> anyhow::Result<()> {
    let mut consumer = queue.consume(&queue_name, "media_job_worker").await?;
    info!("🎥 Job worker listening on '{}'", queue_name);

    while let Some(delivery) = consumer.next().await {
        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!("❌ Consumer error: {}", e);
                continue;
            }
        };

        info!("📦 Received job message");
        match serde_json::from_slice::<JobRequest>(&delivery.data) {
            Ok(request) => log_result(&jobs.run(request).await),
            Err(e) => warn!("❌ Discarding unparseable job message: {}", e),
        }

        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
            error!("Failed to ack message: {}", e);
        }
    }

    warn!("Job queue consumer stream ended");
    Ok(())
}

fn log_result(result: &JobResult) {
    match result {
        JobResult::Success { produced_keys, .. } => {
            info!(?produced_keys, "✅ Queued job completed")
        }
        JobResult::Failure {
            status_code,
            message,
        } => error!(status_code, "❌ Queued job failed: {}", message),
    }
}
