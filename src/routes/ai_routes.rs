use std::convert::Infallible;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use futures_util::StreamExt;
use tracing::info;

use crate::agent::FragmentStream;
use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::{
    ChatRequest, CodeRequest, DocumentRequest, DocumentResponse, GeneratedIdea, IdeaRequest,
};
use crate::routes::extract::LenientJson;
use crate::service::relay_service::{relay_events, RelayService};

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST `/api/ai/chat`: relays the conversation as an event stream
pub async fn chat_handler(
    State(relay): State<RelayService>,
    Extension(user): Extension<AuthenticatedUser>,
    LenientJson(request): LenientJson<ChatRequest>,
) -> Result<Response, AppError> {
    let messages = request.into_messages()?;
    info!("Chat for user {} with {} messages", user.user_id, messages.len());

    let fragments = relay.chat(messages).await?;
    Ok(event_stream(fragments))
}

/// POST `/api/ai/generate-code`: streams generated code
pub async fn generate_code_handler(
    State(relay): State<RelayService>,
    Extension(user): Extension<AuthenticatedUser>,
    LenientJson(request): LenientJson<CodeRequest>,
) -> Result<Response, AppError> {
    info!("Code generation for user {}", user.user_id);
    let fragments = relay.generate_code(request).await?;
    Ok(event_stream(fragments))
}

/// POST `/api/ai/generate-document`: single JSON completion
pub async fn generate_document_handler(
    State(relay): State<RelayService>,
    LenientJson(request): LenientJson<DocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    relay.generate_document(request).await.map(Json)
}

/// POST `/api/ai/generate-idea`: single JSON completion parsed into an idea
pub async fn generate_idea_handler(
    State(relay): State<RelayService>,
    LenientJson(request): LenientJson<IdeaRequest>,
) -> Result<Json<GeneratedIdea>, AppError> {
    let params = request.validate()?;
    relay.generate_idea(params).await.map(Json)
}

/// GET `/health`
pub async fn health_handler() -> &'static str {
    "ok"
}

// ── Helper ────────────────────────────────────────────────────────────────────

/// Commits the event-stream headers and writes one `data:` event per item.
/// Each event is its own body frame, so it reaches the client unbuffered.
fn event_stream(fragments: FragmentStream) -> Response {
    let events = relay_events(fragments)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.payload())));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(events),
    )
        .into_response()
}
