use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{params, Builder, Connection, Database};
use teloxide::types::UserId;

use super::{StorageError, UserStore};
use crate::service::{RequestKind, UserProfile, UserTier};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    username TEXT,
    first_name TEXT,
    last_name TEXT,
    tier TEXT CHECK(tier IN ('free', 'pro', 'plus')) DEFAULT 'free'
);
CREATE TABLE IF NOT EXISTS requests (
    request_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    request_type TEXT CHECK(request_type IN ('Summarize', 'Takeaways', 'Questions')),
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (user_id) REFERENCES users(user_id)
);
CREATE INDEX IF NOT EXISTS idx_requests_user_time ON requests(user_id, timestamp);
";

#[derive(Clone)]
pub struct TursoClient {
    inner: Arc<Database>,
}

fn is_remote(url: &str) -> bool {
    url.starts_with("libsql://") || url.starts_with("https://") || url.starts_with("http://")
}

impl TursoClient {
    pub async fn open(url: &str, token: Option<&str>) -> Result<Self, StorageError> {
        info!("Initializing TursoClient...");

        let db = if is_remote(url) {
            Builder::new_remote(url.to_string(), token.unwrap_or_default().to_string())
                .build()
                .await?
        } else {
            Builder::new_local(url).build().await?
        };

        let client = Self { inner: Arc::new(db) };
        client.migrate().await?;

        info!("TursoClient initialized");
        Ok(client)
    }

    pub async fn get_connection(&self) -> Result<Connection, StorageError> {
        let conn = self.inner.connect()?;
        Ok(conn)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        let conn = self.get_connection().await?;
        conn.execute_batch(SCHEMA).await?;
        debug!("Schema is up to date");
        Ok(())
    }
}

fn db_id(user_id: UserId) -> i64 {
    user_id.0 as i64
}

#[async_trait]
impl UserStore for TursoClient {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let conn = self.get_connection().await?;
        conn.execute(
            "INSERT INTO users (user_id, username, first_name, last_name) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name",
            params![
                db_id(profile.user_id),
                profile.username.clone(),
                profile.first_name.clone(),
                profile.last_name.clone()
            ],
        )
        .await?;
        Ok(())
    }

    async fn get_tier(&self, user_id: UserId) -> Result<UserTier, StorageError> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query("SELECT tier FROM users WHERE user_id = ?1", params![db_id(user_id)])
            .await?;

        match rows.next().await? {
            Some(row) => {
                let tier = row.get::<Option<String>>(0)?;
                match tier {
                    Some(tier) => UserTier::from_str(&tier).map_err(StorageError::InvalidValue),
                    None => Ok(UserTier::Free),
                }
            }
            None => Ok(UserTier::Free),
        }
    }

    async fn set_tier(&self, user_id: UserId, tier: UserTier) -> Result<(), StorageError> {
        let conn = self.get_connection().await?;
        conn.execute(
            "INSERT INTO users (user_id, tier) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET tier = excluded.tier",
            params![db_id(user_id), tier.as_str()],
        )
        .await?;
        Ok(())
    }

    async fn count_requests_today(&self, user_id: UserId) -> Result<u32, StorageError> {
        let conn = self.get_connection().await?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM requests WHERE user_id = ?1 AND DATE(timestamp) = DATE('now')",
                params![db_id(user_id)],
            )
            .await?;

        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };

        u32::try_from(count).map_err(|_| StorageError::InvalidValue(format!("request count {}", count)))
    }

    async fn append_request(&self, user_id: UserId, kind: RequestKind) -> Result<(), StorageError> {
        let conn = self.get_connection().await?;
        let tx = conn.transaction().await?;
        tx.execute("INSERT OR IGNORE INTO users (user_id) VALUES (?1)", params![db_id(user_id)])
            .await?;
        tx.execute(
            "INSERT INTO requests (user_id, request_type) VALUES (?1, ?2)",
            params![db_id(user_id), kind.as_str()],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
