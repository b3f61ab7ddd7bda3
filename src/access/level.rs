//! The three-tier access hierarchy controlling product field visibility.
//!
//! Levels are strictly ordered: `public < after_click < after_rfq`. A caller
//! holding a level can view every field that requires that level or lower —
//! the hierarchy is inclusive, not a lattice.

use serde::{Deserialize, Serialize};

/// Ordinal access tier granted to a viewer of a product page.
///
/// Derived `Ord` follows declaration order, which is the tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Anyone with the product URL. The default when no token is presented.
    Public,
    /// Granted after a buyer follows a tracked share link.
    AfterClick,
    /// Granted after a buyer submits an RFQ (or to merchants of the owning org).
    AfterRfq,
}

impl AccessLevel {
    pub const MAX: AccessLevel = AccessLevel::AfterRfq;

    /// True iff a viewer holding `self` may see a field requiring `required`.
    pub fn can_view(self, required: AccessLevel) -> bool {
        self >= required
    }

    /// Canonical wire/storage string for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::AfterClick => "after_click",
            AccessLevel::AfterRfq => "after_rfq",
        }
    }

    /// Strict parse. Used at write time (link creation, permission maps) so
    /// typos are rejected instead of silently becoming a tier.
    pub fn parse_strict(s: &str) -> Option<AccessLevel> {
        match s {
            "public" => Some(AccessLevel::Public),
            "after_click" => Some(AccessLevel::AfterClick),
            "after_rfq" => Some(AccessLevel::AfterRfq),
            _ => None,
        }
    }

    /// Lenient parse for data read back from storage: anything unrecognized
    /// resolves to `Public`, so a corrupted level can never widen access.
    pub fn parse_or_public(s: &str) -> AccessLevel {
        Self::parse_strict(s).unwrap_or(AccessLevel::Public)
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_tier_hierarchy() {
        assert!(AccessLevel::Public < AccessLevel::AfterClick);
        assert!(AccessLevel::AfterClick < AccessLevel::AfterRfq);
        assert_eq!(AccessLevel::MAX, AccessLevel::AfterRfq);
    }

    /// can_view(a, b) ⟺ ordinal(a) >= ordinal(b), for every pair.
    #[test]
    fn test_can_view_is_inclusive_over_all_pairs() {
        let levels = [
            AccessLevel::Public,
            AccessLevel::AfterClick,
            AccessLevel::AfterRfq,
        ];
        for (i, held) in levels.iter().enumerate() {
            for (j, required) in levels.iter().enumerate() {
                assert_eq!(
                    held.can_view(*required),
                    i >= j,
                    "held={held} required={required}"
                );
            }
        }
    }

    #[test]
    fn test_after_click_cannot_view_after_rfq_fields() {
        assert!(AccessLevel::AfterClick.can_view(AccessLevel::Public));
        assert!(!AccessLevel::AfterClick.can_view(AccessLevel::AfterRfq));
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(
            AccessLevel::parse_strict("after_click"),
            Some(AccessLevel::AfterClick)
        );
        assert_eq!(AccessLevel::parse_strict("AFTER_CLICK"), None);
        assert_eq!(AccessLevel::parse_strict("premium"), None);
        assert_eq!(AccessLevel::parse_strict(""), None);
    }

    #[test]
    fn test_lenient_parse_fails_closed_to_public() {
        assert_eq!(
            AccessLevel::parse_or_public("garbage"),
            AccessLevel::Public
        );
        assert_eq!(
            AccessLevel::parse_or_public("after_rfq"),
            AccessLevel::AfterRfq
        );
    }

    #[test]
    fn test_serde_snake_case_roundtrip() {
        let json = serde_json::to_string(&AccessLevel::AfterClick).unwrap();
        assert_eq!(json, "\"after_click\"");
        let back: AccessLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AccessLevel::AfterClick);
    }
}
