use crate::error::Result;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct RedisClient {
    manager: Arc<Mutex<ConnectionManager>>,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
        })
    }

    // Rate limiting
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: u32,
        window_seconds: usize,
    ) -> Result<bool> {
        let mut conn = self.manager.lock().await;

        let current: u32 = conn.get::<_, Option<u32>>(key).await?.unwrap_or(0);

        if current >= limit {
            return Ok(false);
        }

        let count: u32 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(key, window_seconds as i64).await?;
        }

        Ok(true)
    }

    // Session management
    pub async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        let mut conn = self.manager.lock().await;
        let key = format!("session:{}", session_id);

        let user_id: Option<String> = conn.get(key).await?;
        Ok(user_id)
    }
}
