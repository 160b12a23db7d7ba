use serde_json::Value;

/// Normalize a backend-assigned task identifier to a single canonical
/// string key.
///
/// The backend's document store serializes its native identifier
/// inconsistently: usually a plain string, but sometimes the raw
/// extended-JSON wrapper (`{"$oid": "..."}`) leaks through. Every
/// comparison in the client goes through this function; raw payloads
/// are never compared for equality anywhere else.
///
/// Total and idempotent: a value that is already a resolved string
/// comes back unchanged.
pub fn resolve(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(Value::String(s)) = map.get("$oid").or_else(|| map.get("reference")) {
                return s.clone();
            }
            log::warn!("Unrecognized identifier object shape: {}", raw);
            raw.to_string()
        }
        other => {
            log::warn!("Non-string identifier from backend: {}", other);
            other.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_unchanged() {
        assert_eq!(resolve(&json!("abc123")), "abc123");
    }

    #[test]
    fn nested_reference_extracted() {
        assert_eq!(resolve(&json!({"$oid": "abc123"})), "abc123");
        assert_eq!(resolve(&json!({"reference": "abc123"})), "abc123");
    }

    #[test]
    fn idempotent_once_resolved() {
        let resolved = resolve(&json!({"$oid": "abc123"}));
        assert_eq!(resolve(&Value::String(resolved.clone())), resolved);
    }

    #[test]
    fn fallback_is_total() {
        // Contract violations still produce a stable key, never a panic.
        assert_eq!(resolve(&json!(42)), "42");
        assert_eq!(resolve(&json!(null)), "null");
        let weird = json!({"id": 7});
        assert_eq!(resolve(&weird), weird.to_string());
    }
}
