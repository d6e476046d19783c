use cs_morning::config::Config;
use cs_morning::database::{create_pool, run_migrations};
use cs_morning::redis::RedisClient;
use cs_morning::store::PgDiscussionStore;
use cs_morning::{AppState, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cs_morning=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        stance_policy = ?config.stance_policy,
        "Configuration loaded successfully"
    );

    // Create database connection pool
    let db = create_pool(&config).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    run_migrations(&db).await?;
    tracing::info!("Database migrations completed");

    // Create Redis client
    let redis = match &config.redis_url {
        Some(url) => {
            let client = RedisClient::new(url).await?;
            tracing::info!("Redis client created");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("REDIS_URL not set, rate limiting and session checks disabled");
            None
        }
    };

    // Create application state
    let state = AppState {
        store: Arc::new(PgDiscussionStore::new(db)),
        redis,
        config: Arc::new(config.clone()),
    };

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
