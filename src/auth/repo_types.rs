use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Registered identity.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,      // unique user ID
    pub email: String, // lookup key, exact match
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
