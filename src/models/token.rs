//! Share-link token DTOs.
//!
//! The stored row (`AccessTokenRow`) lives in `store/postgres.rs`; these are
//! the API-facing shapes. None of them ever carries the token hash, and only
//! `IssuedLink` — returned exactly once at creation — carries the plaintext
//! secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::level::AccessLevel;

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub product_id: Uuid,
    pub org_id: Uuid,
    pub channel_id: Uuid,
    pub channel_name: String,
    pub access_level: String,
    /// 0 or negative means "already expired" and is stored as-is; the
    /// validator will refuse such a token. Omitted means no expiry.
    pub expires_in_days: Option<i64>,
    pub created_by: Option<String>,
    pub notes: Option<String>,
}

/// One-time issuance result. The `secret` and `url` are not retrievable again.
#[derive(Debug, Serialize)]
pub struct IssuedLink {
    pub token_id: Uuid,
    pub secret: String,
    pub url: String,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Link metadata for dashboards. Deliberately excludes secret and hash.
#[derive(Debug, Serialize)]
pub struct LinkMeta {
    pub token_id: Uuid,
    pub product_id: Uuid,
    pub channel_id: Uuid,
    pub channel_name: String,
    pub access_level: AccessLevel,
    pub is_revoked: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub use_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LinkUsage {
    pub token_id: Uuid,
    pub use_count: i64,
    pub first_used_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Successful validation: the granted level plus identifying metadata.
#[derive(Debug, Clone)]
pub struct ValidatedToken {
    pub token_id: Uuid,
    pub product_id: Uuid,
    pub org_id: Uuid,
    pub channel_id: Uuid,
    pub access_level: AccessLevel,
}
