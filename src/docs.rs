use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::create_thumbnail,
        crate::modules::jobs::handler::create_transcode,
    ),
    components(
        schemas(
            crate::modules::jobs::dto::ThumbnailJobRequest,
            crate::modules::jobs::dto::TranscodeJobRequest,
            crate::common::response::InvocationResponse,
        )
    ),
    tags(
        (name = "Jobs", description = "Media derivative generation")
    )
)]
pub struct ApiDoc;
