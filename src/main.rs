use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod media;
mod modules;
mod routes;
mod state;
mod workers;

use config::settings::AppConfig;
use infrastructure::notifier::http::HttpNotifier;
use infrastructure::queue::rabbitmq::RabbitMqService;
use infrastructure::storage::s3::StorageService;
use modules::jobs::service::JobOrchestrator;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting media derivative service...");

    let config = AppConfig::new().context("Failed to load configuration")?;

    let storage = StorageService::new(
        &config.spaces_endpoint,
        &config.spaces_region,
        &config.spaces_bucket,
        &config.spaces_access_key,
        &config.spaces_secret_key,
    );
    let notifier = HttpNotifier::new(config.notifier_base_url.clone());
    let jobs = JobOrchestrator::new(
        Arc::new(storage),
        Arc::new(notifier),
        config.staging_dir.clone(),
    );

    if let Some(amqp_url) = &config.amqp_url {
        let queue = RabbitMqService::new(amqp_url).await?;
        let queue_name = config.job_queue.clone();
        let worker_jobs = jobs.clone();
        tokio::spawn(async move {
            if let Err(e) = workers::job_consumer::start_job_worker(queue, queue_name, worker_jobs).await {
                error!("Job worker stopped: {}", e);
            }
        });
    }

    let app = app::create_app(AppState::new(jobs));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
