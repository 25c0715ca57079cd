use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationErrors};

use super::dto::{ThumbnailJobRequest, TranscodeJobRequest};
use super::error::JobError;
use crate::infrastructure::notifier::RecordUpdate;

/// Raw job request as received from any invocation surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobRequest {
    ImageThumbnail(ThumbnailJobRequest),
    AudioTranscode(TranscodeJobRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    ImageThumbnail,
    AudioTranscode,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::ImageThumbnail => "image_thumbnail",
            JobKind::AudioTranscode => "audio_transcode",
        }
    }
}

/// Kinds of record that can own a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityType {
    #[default]
    Track,
    Album,
    Artist,
    Playlist,
}

/// `(kind, wire name, notifier collection)`
const ENTITY_TYPES: [(EntityType, &str, &str); 4] = [
    (EntityType::Track, "track", "tracks"),
    (EntityType::Album, "album", "albums"),
    (EntityType::Artist, "artist", "artists"),
    (EntityType::Playlist, "playlist", "playlists"),
];

impl EntityType {
    fn entry(self) -> &'static (EntityType, &'static str, &'static str) {
        ENTITY_TYPES
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .unwrap_or(&ENTITY_TYPES[0])
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn collection(self) -> &'static str {
        self.entry().2
    }

    pub fn supported() -> Vec<&'static str> {
        ENTITY_TYPES.iter().map(|(_, name, _)| *name).collect()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ENTITY_TYPES
            .iter()
            .find(|(_, name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(kind, _, _)| *kind)
            .ok_or_else(|| {
                JobError::Validation(format!(
                    "unsupported entityType '{}'; supported types: {}",
                    s,
                    EntityType::supported().join(", ")
                ))
            })
    }
}

/// A request that passed validation. Field presence is now guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedJob {
    ImageThumbnail {
        entity_id: String,
        entity_type: EntityType,
        source_key: String,
    },
    AudioTranscode {
        track_id: String,
        source_key: String,
    },
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::ImageThumbnail(_) => JobKind::ImageThumbnail,
            JobRequest::AudioTranscode(_) => JobKind::AudioTranscode,
        }
    }

    pub fn validate(self) -> Result<ValidatedJob, JobError> {
        match self {
            JobRequest::ImageThumbnail(mut req) => {
                if req.entity_id.is_none() {
                    req.entity_id = req.track_id.take();
                }
                req.validate().map_err(validation_error)?;
                let entity_type = match req.entity_type.as_deref() {
                    Some(raw) if !raw.trim().is_empty() => raw.parse()?,
                    _ => EntityType::default(),
                };

                Ok(ValidatedJob::ImageThumbnail {
                    entity_id: req.entity_id.unwrap_or_default(),
                    entity_type,
                    source_key: req.cover_image_key.unwrap_or_default(),
                })
            }
            JobRequest::AudioTranscode(req) => {
                req.validate().map_err(validation_error)?;

                Ok(ValidatedJob::AudioTranscode {
                    track_id: req.track_id.unwrap_or_default(),
                    source_key: req.audio_file_wav_key.unwrap_or_default(),
                })
            }
        }
    }
}

fn validation_error(errors: ValidationErrors) -> JobError {
    let mut messages: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            match &error.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }
    messages.sort();
    JobError::Validation(messages.join("; "))
}

impl ValidatedJob {
    pub fn source_key(&self) -> &str {
        match self {
            ValidatedJob::ImageThumbnail { source_key, .. } => source_key,
            ValidatedJob::AudioTranscode { source_key, .. } => source_key,
        }
    }

    /// The downstream update announcing `produced` (label -> key).
    pub fn record_update(&self, produced: &BTreeMap<String, String>) -> RecordUpdate {
        match self {
            ValidatedJob::ImageThumbnail {
                entity_id,
                entity_type,
                ..
            } => RecordUpdate {
                path: format!("api/{}/update-thumbnail", entity_type.collection()),
                payload: json!({
                    "entityId": entity_id,
                    "entityType": entity_type.name(),
                    "thumbnailKeys": produced,
                }),
            },
            ValidatedJob::AudioTranscode { track_id, .. } => RecordUpdate {
                path: "api/tracks/update-mp3".to_string(),
                payload: json!({
                    "trackId": track_id,
                    "mp3Key": produced.get(super::planner::MP3_LABEL),
                }),
            },
        }
    }
}

/// Terminal outcome of one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobResult {
    Success {
        kind: JobKind,
        produced_keys: BTreeMap<String, String>,
    },
    Failure {
        status_code: u16,
        message: String,
    },
}

impl JobResult {
    pub fn status_code(&self) -> u16 {
        match self {
            JobResult::Success { .. } => 200,
            JobResult::Failure { status_code, .. } => *status_code,
        }
    }
}
