//! Effective-access resolution for a product page request.
//!
//! Strict first-match priority: a valid `token` query parameter wins
//! outright; otherwise an authenticated merchant of the owning org gets the
//! max tier; otherwise the viewer is public. Nothing in this path returns an
//! error to the caller — every failure falls through to a lower tier.

use uuid::Uuid;

use crate::access::level::AccessLevel;
use crate::access::secret::hash_secret;
use crate::access::tokens::{self, ValidationOutcome};
use crate::models::token::ValidatedToken;
use crate::store::postgres::PgStore;

/// How the effective level was obtained. Carried into logs and the page
/// response so the dashboard can distinguish link traffic from merchants.
#[derive(Debug)]
pub enum AccessVia {
    Token(ValidatedToken),
    Merchant { org_id: Uuid },
    Public,
}

#[derive(Debug)]
pub struct ResolvedAccess {
    pub level: AccessLevel,
    pub via: AccessVia,
}

/// Resolve the effective access level for a request against `product_id`
/// owned by `product_org_id`.
pub async fn resolve_access(
    store: &PgStore,
    product_id: Uuid,
    product_org_id: Uuid,
    token_param: Option<&str>,
    merchant_key: Option<&str>,
) -> ResolvedAccess {
    // Presented token, bound to this product. Lookup errors fail closed,
    // same as an invalid token.
    let token_outcome = match token_param {
        Some(secret) => match tokens::validate_token(store, secret, Some(product_id)).await {
            Ok(outcome) => {
                if let ValidationOutcome::Invalid(reason) = &outcome {
                    tracing::debug!(%product_id, ?reason, "token rejected, falling through");
                }
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(%product_id, "token validation errored: {e}");
                None
            }
        },
        None => None,
    };

    // A valid token decides the request — skip the merchant lookup entirely.
    let merchant_org = if matches!(&token_outcome, Some(ValidationOutcome::Valid(_))) {
        None
    } else {
        match merchant_key {
            Some(key) => store
                .org_for_merchant_key_hash(&hash_secret(key))
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(%product_id, "merchant key lookup errored: {e}");
                    None
                }),
            None => None,
        }
    };

    resolve_from_parts(token_outcome, merchant_org, product_org_id)
}

/// Pure priority rule over already-fetched facts: valid token > merchant of
/// the owning org > public.
fn resolve_from_parts(
    token_outcome: Option<ValidationOutcome>,
    merchant_org: Option<Uuid>,
    product_org_id: Uuid,
) -> ResolvedAccess {
    if let Some(ValidationOutcome::Valid(token)) = token_outcome {
        return ResolvedAccess {
            level: token.access_level,
            via: AccessVia::Token(token),
        };
    }

    match merchant_org {
        Some(org_id) if org_id == product_org_id => ResolvedAccess {
            level: AccessLevel::MAX,
            via: AccessVia::Merchant { org_id },
        },
        _ => ResolvedAccess {
            level: AccessLevel::Public,
            via: AccessVia::Public,
        },
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::tokens::InvalidReason;

    fn token(level: AccessLevel, product_id: Uuid, org_id: Uuid) -> ValidatedToken {
        ValidatedToken {
            token_id: Uuid::new_v4(),
            product_id,
            org_id,
            channel_id: Uuid::new_v4(),
            access_level: level,
        }
    }

    /// A valid token wins outright, even when the caller also holds a
    /// merchant key that would grant the max tier.
    #[test]
    fn test_valid_token_beats_merchant_key() {
        let product_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        let outcome = ValidationOutcome::Valid(token(AccessLevel::AfterClick, product_id, org_id));

        let resolved = resolve_from_parts(Some(outcome), Some(org_id), org_id);
        assert_eq!(resolved.level, AccessLevel::AfterClick);
        assert!(matches!(resolved.via, AccessVia::Token(_)));
    }

    /// An invalid token is not an error — resolution falls through to the
    /// merchant check.
    #[test]
    fn test_invalid_token_falls_through_to_merchant() {
        let org_id = Uuid::new_v4();
        let outcome = ValidationOutcome::Invalid(InvalidReason::Expired);

        let resolved = resolve_from_parts(Some(outcome), Some(org_id), org_id);
        assert_eq!(resolved.level, AccessLevel::MAX);
        assert!(matches!(resolved.via, AccessVia::Merchant { .. }));
    }

    /// A merchant key for a *different* org grants nothing.
    #[test]
    fn test_foreign_merchant_key_resolves_public() {
        let resolved = resolve_from_parts(
            Some(ValidationOutcome::Invalid(InvalidReason::Revoked)),
            Some(Uuid::new_v4()),
            Uuid::new_v4(),
        );
        assert_eq!(resolved.level, AccessLevel::Public);
        assert!(matches!(resolved.via, AccessVia::Public));
    }

    #[test]
    fn test_merchant_key_alone_grants_max() {
        let org_id = Uuid::new_v4();
        let resolved = resolve_from_parts(None, Some(org_id), org_id);
        assert_eq!(resolved.level, AccessLevel::MAX);
        assert!(matches!(resolved.via, AccessVia::Merchant { .. }));
    }

    #[test]
    fn test_nothing_presented_defaults_to_public() {
        let resolved = resolve_from_parts(None, None, Uuid::new_v4());
        assert_eq!(resolved.level, AccessLevel::Public);
        assert!(matches!(resolved.via, AccessVia::Public));
    }
}
