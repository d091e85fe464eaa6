//! HTTP surface: the streaming generation endpoint plus health, provider
//! discovery and the OpenAPI document.

pub mod generate;
pub mod health;
pub mod providers;

use axum::{routing::get, Json, Router};
use postcraft_core::StageContext;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

/// Shared by every handler. Read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub ctx: StageContext,
}

impl AppState {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Postcraft API",
        version = "0.1.0",
        description = "LinkedIn post generation with streamed progress"
    ),
    paths(
        generate::generate_posts_stream,
        health::health,
        providers::get_providers,
    ),
    components(schemas(ApiResponse, health::HealthResponse, providers::ProviderInfo)),
    tags(
        (name = "generation", description = "Post generation"),
        (name = "system", description = "Health and discovery")
    )
)]
pub struct ApiDoc;

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-posts-stream", axum::routing::post(generate::generate_posts_stream))
        .route("/providers", get(providers::get_providers))
        .route("/openapi.json", get(serve_openapi))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use postcraft_core::models::{LlmProvider, ModelConfig};
    use postcraft_core::GeneratorConfig;
    use tower::ServiceExt;

    use super::*;

    pub fn mock_state() -> AppState {
        let config = GeneratorConfig {
            model: ModelConfig::for_provider(LlmProvider::Mock),
            ..GeneratorConfig::default()
        };
        AppState::new(config.build_context().unwrap())
    }

    pub async fn send(request: Request<Body>) -> Response<Body> {
        router(mock_state()).oneshot(request).await.unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
