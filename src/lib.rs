pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redis;
pub mod services;
pub mod store;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, redis::RedisClient, store::DiscussionStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DiscussionStore>,
    /// Rate limiting and session revocation are skipped when absent.
    pub redis: Option<Arc<RedisClient>>,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (viewer identity optional)
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route(
            "/api/discussions",
            get(handlers::discussions::list_discussions),
        )
        .route(
            "/api/discussions/{discussion_id}",
            get(handlers::discussions::get_discussion),
        )
        .route(
            "/api/discussions/{discussion_id}/threads",
            get(handlers::discussions::get_comment_threads),
        );

    // Routes that write on behalf of the viewer
    let protected_routes = Router::new()
        .route(
            "/api/discussions/{discussion_id}/comments",
            post(handlers::comments::create_comment),
        )
        .route(
            "/api/discussions/{discussion_id}/reactions",
            get(handlers::reactions::get_reactions).post(handlers::reactions::toggle_reaction),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
