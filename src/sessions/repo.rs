use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

/// Session rows keyed by the SHA-256 of the client token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()>;
    /// Bound user for a session that is still valid at `now`.
    async fn find_user(&self, token_hash: &[u8], now: OffsetDateTime)
        -> anyhow::Result<Option<Uuid>>;
    async fn delete(&self, token_hash: &[u8]) -> anyhow::Result<()>;
    async fn delete_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.db)
        .await
        .context("insert session")?;
        Ok(())
    }

    async fn find_user(
        &self,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Uuid>> {
        let row = sqlx::query_as::<_, (Uuid,)>(
            r#"
            SELECT user_id
              FROM sessions
             WHERE token_hash = $1
               AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("lookup session")?;
        Ok(row.map(|(user_id,)| user_id))
    }

    async fn delete(&self, token_hash: &[u8]) -> anyhow::Result<()> {
        // Logout is idempotent; zero affected rows is fine.
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.db)
            .await
            .context("delete session")?;
        Ok(())
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.db)
            .await
            .context("purge expired sessions")?;
        Ok(res.rows_affected())
    }
}
