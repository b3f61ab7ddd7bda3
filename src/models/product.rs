//! Product DTOs and the per-product field permission map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::access::level::AccessLevel;

/// Minimum access level required to view each field of a product's
/// `product_data`. Owned by the product; read-only at filtering time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPermissions(HashMap<String, AccessLevel>);

impl FieldPermissions {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, AccessLevel)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    /// Required level for a field; unmapped fields are public.
    pub fn required_for(&self, field: &str) -> AccessLevel {
        self.0.get(field).copied().unwrap_or(AccessLevel::Public)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Write-time validation: every value must be a recognized level string.
    /// Rejecting here keeps the stored map clean so the lenient read path
    /// almost never has to fall back.
    pub fn from_json_strict(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "field_permissions must be a JSON object".to_string())?;
        let mut map = HashMap::with_capacity(obj.len());
        for (field, raw) in obj {
            let s = raw
                .as_str()
                .ok_or_else(|| format!("field '{field}': level must be a string"))?;
            let level = AccessLevel::parse_strict(s).ok_or_else(|| {
                format!("field '{field}': unknown access level '{s}' (expected public, after_click or after_rfq)")
            })?;
            map.insert(field.clone(), level);
        }
        Ok(Self(map))
    }

    /// Read path for maps already in storage: unknown level strings collapse
    /// to `public`, so a corrupted row can only narrow what a viewer sees.
    pub fn from_json_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let map = obj
            .iter()
            .map(|(field, raw)| {
                let level = raw
                    .as_str()
                    .map(AccessLevel::parse_or_public)
                    .unwrap_or(AccessLevel::Public);
                (field.clone(), level)
            })
            .collect();
        Self(map)
    }
}

// ── API DTOs ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub org_id: Uuid,
    pub name: String,
    pub product_data: Value,
    /// Field name → minimum level string; validated strictly on write.
    pub field_permissions: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub product_data: Value,
    pub field_permissions: FieldPermissions,
}

/// The buyer-facing product page: data already filtered for the resolved level.
#[derive(Debug, Serialize)]
pub struct ProductPageResponse {
    pub id: Uuid,
    pub name: String,
    pub access_level: AccessLevel,
    pub product_data: Value,
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_rejects_unknown_level() {
        let err = FieldPermissions::from_json_strict(&json!({"price": "premium"})).unwrap_err();
        assert!(err.contains("price"));
        assert!(err.contains("premium"));
    }

    #[test]
    fn test_strict_rejects_non_string_level() {
        assert!(FieldPermissions::from_json_strict(&json!({"price": 2})).is_err());
        assert!(FieldPermissions::from_json_strict(&json!(["price"])).is_err());
    }

    #[test]
    fn test_strict_accepts_all_three_tiers() {
        let p = FieldPermissions::from_json_strict(&json!({
            "name": "public",
            "price": "after_click",
            "supplier_contact": "after_rfq",
        }))
        .unwrap();
        assert_eq!(p.required_for("name"), AccessLevel::Public);
        assert_eq!(p.required_for("price"), AccessLevel::AfterClick);
        assert_eq!(p.required_for("supplier_contact"), AccessLevel::AfterRfq);
    }

    #[test]
    fn test_lenient_collapses_garbage_to_public() {
        let p = FieldPermissions::from_json_lenient(&json!({
            "price": "afterclick",
            "moq": 3,
        }));
        assert_eq!(p.required_for("price"), AccessLevel::Public);
        assert_eq!(p.required_for("moq"), AccessLevel::Public);
    }

    #[test]
    fn test_unmapped_field_is_public() {
        let p = FieldPermissions::default();
        assert_eq!(p.required_for("anything"), AccessLevel::Public);
    }
}
