use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub email: String,                // login key, stored as provided
    pub password_hash: String,        // Argon2 PHC string, never rendered
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Result of an insert that may collide with an existing email.
#[derive(Debug)]
pub enum CreateUserOutcome {
    Created(User),
    EmailTaken,
}
