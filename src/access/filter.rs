//! Field-level filtering of product data by resolved access level.
//!
//! Locked fields are replaced by a descriptor the dashboard renders as a
//! "locked" affordance: the required tier plus a bounded preview that never
//! contains the full value.

use serde_json::{json, Map, Value};

use crate::access::level::AccessLevel;
use crate::models::product::FieldPermissions;

/// Max characters of a string value exposed in a locked-field preview.
const STRING_PREVIEW_CHARS: usize = 24;

/// Strings shorter than this are masked outright — a prefix of a short
/// value is the value.
const STRING_PREVIEW_MIN_CHARS: usize = 8;

/// Placeholder for values that get no preview at all.
const MASK: &str = "•••";

/// Filter a product's `product_data` object for a viewer at `level`.
///
/// Fields whose required level is at or below `level` pass through unchanged;
/// the rest become locked descriptors. Fields absent from the permission map
/// are treated as `public`. `after_rfq` (the max tier) short-circuits to the
/// identity — nothing can be locked for it.
pub fn filter_fields(data: &Value, perms: &FieldPermissions, level: AccessLevel) -> Value {
    if level == AccessLevel::MAX {
        return data.clone();
    }

    let Some(obj) = data.as_object() else {
        // Non-object payloads have no field boundaries to filter on.
        return data.clone();
    };

    let mut out = Map::with_capacity(obj.len());
    for (key, value) in obj {
        let required = perms.required_for(key);
        if level.can_view(required) {
            out.insert(key.clone(), value.clone());
        } else {
            out.insert(key.clone(), locked_descriptor(value, required));
        }
    }
    Value::Object(out)
}

/// Build the redacted stand-in for a locked field.
fn locked_descriptor(value: &Value, required: AccessLevel) -> Value {
    json!({
        "locked": true,
        "required_access": required.as_str(),
        "preview": preview_of(value),
    })
}

/// Bounded, non-reversible preview of a value:
/// strings → strict prefix, arrays → item count, everything else → mask.
fn preview_of(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let count = s.chars().count();
            if count < STRING_PREVIEW_MIN_CHARS {
                return Value::String(MASK.to_string());
            }
            // At most half the value, capped at N — the full string can
            // never be reconstructed from its preview.
            let take = STRING_PREVIEW_CHARS.min(count / 2);
            let truncated: String = s.chars().take(take).collect();
            Value::String(format!("{truncated}…"))
        }
        Value::Array(items) => json!({ "item_count": items.len() }),
        _ => Value::String(MASK.to_string()),
    }
}

// ── Tests ────────────────────────────────────────────────────
