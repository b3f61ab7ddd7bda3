//! Share-link token issuance and validation.
//!
//! Issuance is the only moment the plaintext secret exists; validation works
//! purely on the SHA-256 digest and fails closed on every mismatch.

use chrono::{Duration, Utc};

use crate::access::level::AccessLevel;
use crate::access::secret;
use crate::models::token::{CreateLinkRequest, IssuedLink, ValidatedToken};
use crate::store::postgres::{NewAccessToken, PgStore};

/// Why a presented token was refused. All reasons resolve to "no access";
/// they are distinguished only for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NotFound,
    Revoked,
    Expired,
    ProductMismatch,
}

#[derive(Debug)]
pub enum ValidationOutcome {
    Valid(ValidatedToken),
    Invalid(InvalidReason),
}

/// Mint a share link: random 256-bit secret, hash stored, plaintext returned
/// exactly once. A requested level that fails strict parsing is a caller
/// error, not a silent downgrade.
pub async fn issue_link(
    store: &PgStore,
    public_base_url: &str,
    req: &CreateLinkRequest,
) -> Result<IssuedLink, crate::errors::AppError> {
    let level = AccessLevel::parse_strict(&req.access_level)
        .ok_or_else(|| crate::errors::AppError::InvalidAccessLevel(req.access_level.clone()))?;

    let plaintext = secret::generate_secret();
    let token_hash = secret::hash_secret(&plaintext);

    // `expires_in_days <= 0` produces an expiry at or before now; such a
    // token is stored but will never validate.
    let expires_at = req.expires_in_days.map(|days| Utc::now() + Duration::days(days));

    let new_token = NewAccessToken {
        product_id: req.product_id,
        org_id: req.org_id,
        channel_id: req.channel_id,
        channel_name: &req.channel_name,
        access_level: level.as_str(),
        token_hash: &token_hash,
        expires_at,
        created_by: req.created_by.as_deref(),
        notes: req.notes.as_deref(),
    };

    let token_id = store.insert_access_token(&new_token).await?;

    tracing::info!(
        %token_id,
        product_id = %req.product_id,
        channel = %req.channel_name,
        level = %level,
        "share link issued"
    );

    Ok(IssuedLink {
        token_id,
        url: secret::share_url(public_base_url, req.product_id, &plaintext),
        secret: plaintext,
        access_level: level,
        expires_at,
    })
}

/// Validate a presented secret, optionally binding it to a product.
///
/// Fails closed: unknown digest, revoked, expired, or bound to a different
/// product all yield `Invalid`. On success a usage-counter update is
/// detached — its failure is logged and never affects the returned outcome.
pub async fn validate_token(
    store: &PgStore,
    presented_secret: &str,
    bind_product: Option<uuid::Uuid>,
) -> anyhow::Result<ValidationOutcome> {
    let token_hash = secret::hash_secret(presented_secret);

    let Some(row) = store.find_token_by_hash(&token_hash).await? else {
        return Ok(ValidationOutcome::Invalid(InvalidReason::NotFound));
    };

    if let Err(reason) = evaluate_row(&row, Utc::now(), bind_product) {
        return Ok(ValidationOutcome::Invalid(reason));
    }

    // Fire-and-forget usage tracking. Validation has already succeeded;
    // a failed counter update must not change that.
    let usage_store = store.clone();
    let token_id = row.id;
    tokio::spawn(async move {
        if let Err(e) = usage_store.record_token_use(token_id).await {
            tracing::warn!(%token_id, "usage counter update failed: {e}");
        }
    });

    Ok(ValidationOutcome::Valid(ValidatedToken {
        token_id: row.id,
        product_id: row.product_id,
        org_id: row.org_id,
        channel_id: row.channel_id,
        access_level: AccessLevel::parse_or_public(&row.access_level),
    }))
}

/// Pure checks over a fetched row, in refusal-priority order: revocation
/// first (it holds regardless of expiry), then expiry, then product binding.
fn evaluate_row(
    row: &crate::store::postgres::AccessTokenRow,
    now: chrono::DateTime<Utc>,
    bind_product: Option<uuid::Uuid>,
) -> Result<(), InvalidReason> {
    if row.is_revoked {
        return Err(InvalidReason::Revoked);
    }
    if let Some(expires_at) = row.expires_at {
        if expires_at < now {
            return Err(InvalidReason::Expired);
        }
    }
    if let Some(product_id) = bind_product {
        if row.product_id != product_id {
            return Err(InvalidReason::ProductMismatch);
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::postgres::AccessTokenRow;
    use chrono::{DateTime, Duration};
    use uuid::Uuid;

    fn row() -> AccessTokenRow {
        AccessTokenRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            channel_id: Uuid::new_v4(),
            channel_name: "Email Campaign #1".to_string(),
            access_level: "after_click".to_string(),
            is_revoked: false,
            expires_at: None,
            use_count: 0,
            first_used_at: None,
            last_used_at: None,
            created_by: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_live_token_passes() {
        let mut r = row();
        r.expires_at = Some(now() + Duration::days(7));
        assert_eq!(evaluate_row(&r, now(), Some(r.product_id)), Ok(()));
        // No expiry at all is also fine.
        assert_eq!(evaluate_row(&row(), now(), None), Ok(()));
    }

    /// expires_in_days = 0 stores an expiry equal to creation time; any
    /// later validation must see it as expired.
    #[test]
    fn test_expiry_at_or_before_now_fails_expired() {
        let mut r = row();
        let created = now();
        r.expires_at = Some(created);
        assert_eq!(
            evaluate_row(&r, created + Duration::seconds(1), None),
            Err(InvalidReason::Expired)
        );

        r.expires_at = Some(created - Duration::days(30));
        assert_eq!(
            evaluate_row(&r, created, None),
            Err(InvalidReason::Expired)
        );
    }

    /// Revocation wins even when the token is also expired.
    #[test]
    fn test_revoked_fails_regardless_of_expiry() {
        let mut r = row();
        r.is_revoked = true;
        assert_eq!(evaluate_row(&r, now(), None), Err(InvalidReason::Revoked));

        r.expires_at = Some(now() - Duration::days(1));
        assert_eq!(evaluate_row(&r, now(), None), Err(InvalidReason::Revoked));
    }

    #[test]
    fn test_product_binding_mismatch_fails() {
        let r = row();
        assert_eq!(
            evaluate_row(&r, now(), Some(Uuid::new_v4())),
            Err(InvalidReason::ProductMismatch)
        );
        // Unbound validation ignores the product.
        assert_eq!(evaluate_row(&r, now(), None), Ok(()));
    }
}

