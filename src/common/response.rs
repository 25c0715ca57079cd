use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::modules::jobs::model::{JobKind, JobResult};
use crate::modules::jobs::planner::MP3_LABEL;

/// Invocation output: `{statusCode, body}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    #[schema(value_type = Object)]
    pub body: Value,
}

impl InvocationResponse {
    /// A request that never became a job, e.g. an unreadable body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            body: Value::String(message.into()),
        }
    }
}

impl From<JobResult> for InvocationResponse {
    fn from(result: JobResult) -> Self {
        let status_code = result.status_code();
        let body = match result {
            JobResult::Success {
                kind: JobKind::ImageThumbnail,
                produced_keys,
            } => json!({
                "message": "Thumbnail creation successful",
                "thumbnailKeys": produced_keys,
            }),
            JobResult::Success {
                kind: JobKind::AudioTranscode,
                produced_keys,
            } => json!({
                "message": "Conversion successful",
                "mp3Key": produced_keys.get(MP3_LABEL),
            }),
            JobResult::Failure { message, .. } => Value::String(message),
        };

        Self { status_code, body }
    }
}

impl IntoResponse for InvocationResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
