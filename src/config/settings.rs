use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::env::{self, EnvKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub spaces_region: String,
    pub spaces_endpoint: String,
    pub spaces_bucket: String,
    pub spaces_access_key: String,
    pub spaces_secret_key: String,
    pub notifier_base_url: Url,
    pub staging_dir: PathBuf,
    pub amqp_url: Option<String>,
    pub job_queue: String,
}

fn required(key: EnvKey) -> Result<String, ConfigError> {
    let name = key.as_str();
    env::get_opt(key).ok_or(ConfigError::Missing(name))
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let spaces_region = required(EnvKey::SpacesRegion)?;
        let spaces_endpoint = env::get_opt(EnvKey::SpacesEndpoint)
            .unwrap_or_else(|| default_spaces_endpoint(&spaces_region));

        let raw_notifier = required(EnvKey::NotifierBaseUrl)?;
        let notifier_base_url = Url::parse(&raw_notifier).map_err(|e| ConfigError::Invalid {
            key: EnvKey::NotifierBaseUrl.as_str(),
            reason: e.to_string(),
        })?;

        let staging_dir = env::get_opt(EnvKey::StagingDir)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            spaces_region,
            spaces_endpoint,
            spaces_bucket: required(EnvKey::SpacesBucket)?,
            spaces_access_key: required(EnvKey::SpacesAccessKey)?,
            spaces_secret_key: required(EnvKey::SpacesSecretKey)?,
            notifier_base_url,
            staging_dir,
            amqp_url: env::get_opt(EnvKey::AmqpUrl),
            job_queue: env::get_or(EnvKey::JobQueue, "media_jobs"),
        })
    }
}

pub fn default_spaces_endpoint(region: &str) -> String {
    format!("https://{}.digitaloceanspaces.com", region)
}
