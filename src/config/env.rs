use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    SpacesRegion,
    SpacesEndpoint,
    SpacesBucket,
    SpacesAccessKey,
    SpacesSecretKey,
    NotifierBaseUrl,
    StagingDir,
    AmqpUrl,
    JobQueue,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::SpacesRegion => "DO_SPACES_REGION",
            EnvKey::SpacesEndpoint => "DO_SPACES_ENDPOINT",
            EnvKey::SpacesBucket => "DO_SPACES_BUCKET",
            EnvKey::SpacesAccessKey => "DO_ACCESS_KEY",
            EnvKey::SpacesSecretKey => "DO_SECRET_KEY",
            EnvKey::NotifierBaseUrl => "NOTIFIER_BASE_URL",
            EnvKey::StagingDir => "STAGING_DIR",
            EnvKey::AmqpUrl => "AMQP_URL",
            EnvKey::JobQueue => "JOB_QUEUE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Like [`get`], but treats an empty value the same as an unset one.
pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
