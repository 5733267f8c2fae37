pub mod agent;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::CompletionProvider;
use crate::auth::{require_bearer, BearerAuthenticator};
use crate::routes::ai_routes::{
    chat_handler, generate_code_handler, generate_document_handler, generate_idea_handler,
    health_handler,
};
use crate::service::relay_service::RelayService;

/// Shared, read-only handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayService,
    pub auth: BearerAuthenticator,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, jwt_secret: &str) -> Self {
        Self {
            relay: RelayService::new(provider),
            auth: BearerAuthenticator::new(jwt_secret),
        }
    }
}

impl FromRef<AppState> for RelayService {
    fn from_ref(state: &AppState) -> Self {
        state.relay.clone()
    }
}

impl FromRef<AppState> for BearerAuthenticator {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    let ai_routes = Router::new()
        .route("/chat", post(chat_handler))
        .route("/generate-code", post(generate_code_handler))
        .route("/generate-document", post(generate_document_handler))
        .route("/generate-idea", post(generate_idea_handler))
        .route_layer(middleware::from_fn_with_state(state.auth.clone(), require_bearer));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/ai", ai_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
