use axum::Router;
use axum::routing::post;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod planner;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs/thumbnail", post(handler::create_thumbnail))
        .route("/jobs/transcode", post(handler::create_transcode))
}
