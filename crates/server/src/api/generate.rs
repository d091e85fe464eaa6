use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use postcraft_core::{spawn_generation, GenerationRequest, StreamEvent};
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;

use super::{ApiResponse, AppState};

fn sse_frame(event: StreamEvent) -> Event {
    Event::default().json_data(&event).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to encode stream event");
        let fallback = json!({
            "type": "ERROR",
            "message": format!("Internal Server Error: {}", e),
        });
        Event::default().data(fallback.to_string())
    })
}

/// Stream post generation as server-sent events.
///
/// One `data:` frame per event; the last frame is always COMPLETE or ERROR.
/// Closing the connection cancels the run.
#[utoipa::path(
    post,
    path = "/api/generate-posts-stream",
    tag = "generation",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Event stream of PROGRESS, POST_GENERATED and a final COMPLETE or ERROR", body = String, content_type = "text/event-stream"),
        (status = 422, description = "Invalid request", body = ApiResponse)
    )
)]
pub async fn generate_posts_stream(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected generation body");
            return unprocessable(rejection.body_text());
        }
    };
    if let Err(e) = request.validate() {
        tracing::debug!(error = %e, "Rejected generation request");
        return unprocessable(e.to_string());
    }

    tracing::info!(
        topic = %request.topic,
        posts = request.post_count,
        project = request.github_project_url.is_some(),
        "Generation requested"
    );
    let events = spawn_generation(state.ctx.clone(), request);
    let stream = ReceiverStream::new(events).map(|event| Ok::<_, Infallible>(sse_frame(event)));

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn unprocessable(message: impl Into<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::failure(message)),
    )
        .into_response()
}
