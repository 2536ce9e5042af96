//! Best-effort text extraction from heterogeneous record fields

use serde_json::Value;

/// Keys checked inside wrapper objects, in preference order. `valeur` is the
/// tagged-field payload key used throughout the marketplace records.
const TEXT_KEYS: &[&str] = &["valeur", "value", "content", "text", "data"];

/// Extract a display string from an arbitrary field value.
///
/// Strings pass through unchanged. Objects are scanned for the known payload
/// keys, unwrapping one level of tagging. Anything else yields an empty
/// string; this function never fails.
#[must_use]
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for key in TEXT_KEYS {
                if let Some(inner) = map.get(*key) {
                    let text = coerce(inner);
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
            String::new()
        }
        _ => String::new(),
    }
}

fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Oui".to_string(),
        Value::Bool(false) => "Non".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => field_text(value),
        Value::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_passes_through() {
        assert_eq!(field_text(&json!("4.0503,9.7679")), "4.0503,9.7679");
    }

    #[test]
    fn test_tagged_field_unwraps_valeur() {
        let tagged = json!({
            "type_donnee": "gps",
            "valeur": "4.0503,9.7679",
            "origine_champs": "service"
        });
        assert_eq!(field_text(&tagged), "4.0503,9.7679");
    }

    #[test]
    fn test_key_preference_order() {
        let value = json!({"value": "secondary", "valeur": "primary"});
        assert_eq!(field_text(&value), "primary");

        let value = json!({"data": "last", "content": "first"});
        assert_eq!(field_text(&value), "first");
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(field_text(&json!({"valeur": true})), "Oui");
        assert_eq!(field_text(&json!({"valeur": false})), "Non");
    }

    #[test]
    fn test_array_joining() {
        let value = json!({"valeur": ["Douala", "Littoral"]});
        assert_eq!(field_text(&value), "Douala,Littoral");
    }

    #[test]
    fn test_nested_wrapper() {
        let value = json!({"valeur": {"text": "Akwa"}});
        assert_eq!(field_text(&value), "Akwa");
    }

    #[test]
    fn test_no_match_yields_empty_string() {
        assert_eq!(field_text(&json!(null)), "");
        assert_eq!(field_text(&json!(42)), "");
        assert_eq!(field_text(&json!({"autre": "x"})), "");
    }
}
