use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "corretor-hub", description = "CorretorHub API")
    )
)]
pub struct ApiDoc;
