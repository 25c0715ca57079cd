use super::dto::{ThumbnailJobRequest, TranscodeJobRequest};
use super::model::JobRequest;
use crate::common::response::InvocationResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};

/// Generate `small` and `mid` WebP thumbnails for a cover image
#[utoipa::path(
    post,
    path = "/api/v1/jobs/thumbnail",
    request_body = ThumbnailJobRequest,
    responses(
        (status = 200, description = "Thumbnails stored and record updated", body = InvocationResponse),
        (status = 400, description = "Unreadable body, missing fields or unsupported entity type", body = InvocationResponse),
        (status = 500, description = "Fetch, transform, upload or notify failure", body = InvocationResponse)
    ),
    tag = "Jobs"
)]
pub async fn create_thumbnail(
    State(state): State<AppState>,
    payload: Result<Json<ThumbnailJobRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return InvocationResponse::bad_request(rejection.body_text()),
    };
    let result = state.jobs.run(JobRequest::ImageThumbnail(req)).await;
    InvocationResponse::from(result)
}

/// Transcode a WAV upload to a 128 kbps MP3
#[utoipa::path(
    post,
    path = "/api/v1/jobs/transcode",
    request_body = TranscodeJobRequest,
    responses(
        (status = 200, description = "MP3 stored and record updated", body = InvocationResponse),
        (status = 400, description = "Unreadable body or missing fields", body = InvocationResponse),
        (status = 500, description = "Fetch, transcode, upload or notify failure", body = InvocationResponse)
    ),
    tag = "Jobs"
)]
pub async fn create_transcode(
    State(state): State<AppState>,
    payload: Result<Json<TranscodeJobRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return InvocationResponse::bad_request(rejection.body_text()),
    };
    let result = state.jobs.run(JobRequest::AudioTranscode(req)).await;
    InvocationResponse::from(result)
}
