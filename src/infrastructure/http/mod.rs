pub mod request_id;

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::{audio::AudioController, health, story::StoryController};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Assemble every route with its middleware stack
pub fn create_router(
    pool: Arc<DbPool>,
    story_controller: Arc<StoryController>,
    audio_controller: Arc<AudioController>,
) -> Router {
    let story_function = Router::new()
        .route("/functions/v1/generate-story", post(StoryController::generate))
        .with_state(story_controller.clone());

    let audio_function = Router::new()
        .route("/functions/v1/generate-audio", post(AudioController::generate))
        .with_state(audio_controller);

    let archive_routes = Router::new()
        .route("/api/stories", get(StoryController::list_stories))
        .route("/api/themes", get(StoryController::themes))
        .with_state(story_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(story_function)
        .merge(audio_function)
        .merge(archive_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(cors_layer()),
        )
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Bind and serve until the process is stopped
pub async fn start_http_server(
    config: &Config,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
