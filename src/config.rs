use std::env;

use crate::services::stance_tally::StancePolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_acquire_timeout_seconds: u64,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // Discussions
    pub stance_policy: StancePolicy,
    pub max_comment_length: usize,

    // Rate limits (requests per window)
    pub comment_rate_limit: u32,
    pub reaction_rate_limit: u32,
    pub rate_limit_window_seconds: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            database_min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            database_acquire_timeout_seconds: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            stance_policy: env::var("NEUTRAL_STANCE_POLICY")
                .ok()
                .and_then(|p| StancePolicy::parse(&p))
                .unwrap_or_default(),
            max_comment_length: env::var("MAX_COMMENT_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10000),

            comment_rate_limit: env::var("COMMENT_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            reaction_rate_limit: env::var("REACTION_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            rate_limit_window_seconds: 60,
        })
    }

    /// Configuration for tests and local runs without an environment.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 20,
            database_min_connections: 2,
            database_acquire_timeout_seconds: 30,
            redis_url: None,
            jwt_secret: jwt_secret.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            stance_policy: StancePolicy::default(),
            max_comment_length: 10000,
            comment_rate_limit: 10,
            reaction_rate_limit: 30,
            rate_limit_window_seconds: 60,
        }
    }
}
