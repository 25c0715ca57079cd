use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

// Every field is optional at the wire level so that missing values reach
// validation and come back as a 400 with a readable message.

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailJobRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(
        required(message = "entityId (or trackId) is required"),
        length(min = 1, message = "entityId must not be empty")
    )]
    pub entity_id: Option<String>,
    /// Accepted in place of `entityId`; ignored when both are sent.
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    /// One of `track`, `album`, `artist`, `playlist`. Defaults to `track`.
    pub entity_type: Option<String>,
    #[validate(
        required(message = "coverImageKey is required"),
        length(min = 1, message = "coverImageKey must not be empty")
    )]
    pub cover_image_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TranscodeJobRequest {
    #[serde(rename = "trackId", default, deserialize_with = "string_or_number")]
    #[validate(
        required(message = "trackId is required"),
        length(min = 1, message = "trackId must not be empty")
    )]
    pub track_id: Option<String>,
    #[serde(rename = "audioFileWAVKey")]
    #[validate(
        required(message = "audioFileWAVKey is required"),
        length(min = 1, message = "audioFileWAVKey must not be empty")
    )]
    pub audio_file_wav_key: Option<String>,
}

/// Ids arrive as strings or as bare JSON numbers; both become strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}
