//! Helpers shared by the provider implementations.

use serde_json::Value;

/// Maximum length of provider response bodies kept in diagnostics.
pub const MAX_DIAGNOSTIC_LENGTH: usize = 2000;

/// The sentinel written over secret values in API responses. A save that
/// carries this sentinel back preserves the stored value.
pub const SECRET_SENTINEL: &str = "***";

/// Truncate a string for diagnostics, snapping to a char boundary.
pub fn truncate_diagnostic(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}

/// Replace the named secret fields of a credential bundle with the
/// [`SECRET_SENTINEL`]. Fields that are absent or empty stay as they
/// are, so the caller can tell "configured" from "not yet entered".
pub fn redact_secrets(config: &Value, secret_fields: &[&str]) -> Value {
    let mut redacted = config.clone();
    if let Some(obj) = redacted.as_object_mut() {
        for field in secret_fields {
            if let Some(v) = obj.get(*field) {
                let blank = v.as_str().map(str::is_empty).unwrap_or(false) || v.is_null();
                if !blank {
                    obj.insert((*field).to_string(), Value::String(SECRET_SENTINEL.into()));
                }
            }
        }
    }
    redacted
}

/// Merge an incoming save over the stored bundle, preserving stored
/// secrets wherever the incoming value is the redaction sentinel or the
/// field is omitted. Secrets are write-mostly: the UI never sees a saved
/// secret again, so round-tripping the sentinel must not destroy it.
pub fn merge_secrets(stored: &Value, incoming: &Value, secret_fields: &[&str]) -> Value {
    let mut merged = incoming.clone();
    let (Some(obj), Some(stored_obj)) = (merged.as_object_mut(), stored.as_object()) else {
        return merged;
    };
    for field in secret_fields {
        let keep_stored = match obj.get(*field) {
            None => true,
            Some(Value::String(s)) if s == SECRET_SENTINEL => true,
            _ => false,
        };
        if keep_stored {
            if let Some(prev) = stored_obj.get(*field) {
                obj.insert((*field).to_string(), prev.clone());
            }
        }
    }
    merged
}
