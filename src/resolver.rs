//! Data reference resolution - substitutes `{{analysis_data.*}}` references
//! with concrete values from the analysis payload.
//!
//! Resolution is pure and total: a reference whose path is missing from the
//! payload is returned verbatim so the rendering layer can surface it as a
//! visible error state instead of silently dropping content.

use serde_json::Value;

/// Prefix and suffix of a reference string.
const REF_OPEN: &str = "{{analysis_data.";
const REF_CLOSE: &str = "}}";

/// Extract the dotted path from a reference string, if the string is one.
///
/// Only the exact form `{{analysis_data.<path>}}` qualifies; anything with
/// leading or trailing text around the braces is ordinary data.
fn reference_path(s: &str) -> Option<&str> {
    let inner = s.strip_prefix(REF_OPEN)?.strip_suffix(REF_CLOSE)?;
    if inner.is_empty() {
        return None;
    }
    Some(inner)
}

/// Walk the payload key by key along a dotted path.
///
/// Returns `None` as soon as a segment is missing or the current value is
/// not an object (a missing path is data, not failure).
fn lookup_path<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = payload;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Look up a reference path against either payload shape: an envelope
/// carrying the analysis object under a top-level `analysis_data` key, or
/// the analysis object itself. The envelope wins when both could match.
fn lookup_reference<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    payload
        .get("analysis_data")
        .and_then(|inner| lookup_path(inner, path))
        .or_else(|| lookup_path(payload, path))
}

/// Resolve a single value against the payload.
///
/// - Reference strings resolve to the payload value at their path, or are
///   returned unchanged when the path is absent — never partially
///   substituted, never an error.
/// - Arrays and objects are resolved element-wise, preserving order and
///   keys.
/// - Every other value is returned as-is.
///
/// The payload may be the analysis object itself or an envelope carrying
/// it under a top-level `analysis_data` key; both shapes appear upstream
/// and resolve identically.
///
/// The input is not mutated; a new structure is returned.
///
/// # Example
///
/// ```rust
/// use dashboard_composer::resolver::resolve_value;
/// use serde_json::json;
///
/// let payload = json!({ "summary": { "best": "QQQ" } });
/// let resolved = resolve_value(&json!("{{analysis_data.summary.best}}"), &payload);
/// assert_eq!(resolved, json!("QQQ"));
/// ```
pub fn resolve_value(value: &Value, payload: &Value) -> Value {
    match value {
        Value::String(s) => match reference_path(s) {
            Some(path) => match lookup_reference(payload, path) {
                Some(found) => found.clone(),
                None => value.clone(),
            },
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, payload))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, payload)))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Check whether a resolved value still contains unresolved references.
///
/// Used by the assembler to attach a warning to plan entries whose props
/// kept a literal reference string after resolution.
pub fn unresolved_references(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_unresolved(value, &mut found);
    found
}

fn collect_unresolved(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if reference_path(s).is_some() {
                found.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_unresolved(item, found);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_unresolved(v, found);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "summary": { "best": "QQQ", "worst": "XYZ" },
            "metrics": {
                "returns": [1.2, 3.4, -0.5],
                "sharpe": 1.8
            },
            "flags": { "partial": null }
        })
    }

    #[test]
    fn test_resolve_present_path() {
        let resolved = resolve_value(&json!("{{analysis_data.summary.best}}"), &payload());
        assert_eq!(resolved, json!("QQQ"));
    }

    #[test]
    fn test_resolve_enveloped_payload() {
        let enveloped = json!({ "analysis_data": { "summary": { "best": "QQQ" } } });
        let resolved = resolve_value(&json!("{{analysis_data.summary.best}}"), &enveloped);
        assert_eq!(resolved, json!("QQQ"));
    }

    #[test]
    fn test_envelope_wins_over_root_key() {
        let payload = json!({
            "analysis_data": { "summary": { "best": "QQQ" } },
            "summary": { "best": "SPY" }
        });
        let resolved = resolve_value(&json!("{{analysis_data.summary.best}}"), &payload);
        assert_eq!(resolved, json!("QQQ"));
    }

    #[test]
    fn test_envelope_miss_falls_back_to_root() {
        let payload = json!({
            "analysis_data": { "unrelated": 1 },
            "summary": { "best": "SPY" }
        });
        let resolved = resolve_value(&json!("{{analysis_data.summary.best}}"), &payload);
        assert_eq!(resolved, json!("SPY"));
    }

    #[test]
    fn test_resolve_missing_path_returns_original() {
        let reference = json!("{{analysis_data.summary.missing}}");
        let resolved = resolve_value(&reference, &payload());
        assert_eq!(resolved, reference);
    }

    #[test]
    fn test_resolve_non_string_leaf() {
        let resolved = resolve_value(&json!("{{analysis_data.metrics.sharpe}}"), &payload());
        assert_eq!(resolved, json!(1.8));
    }

    #[test]
    fn test_resolve_array_value() {
        let resolved = resolve_value(&json!("{{analysis_data.metrics.returns}}"), &payload());
        assert_eq!(resolved, json!([1.2, 3.4, -0.5]));
    }

    #[test]
    fn test_resolve_null_leaf() {
        // A path that lands on an explicit null resolves to null
        let resolved = resolve_value(&json!("{{analysis_data.flags.partial}}"), &payload());
        assert_eq!(resolved, Value::Null);
    }

    #[test]
    fn test_path_through_non_object_returns_original() {
        let reference = json!("{{analysis_data.metrics.sharpe.deeper}}");
        let resolved = resolve_value(&reference, &payload());
        assert_eq!(resolved, reference);
    }

    #[test]
    fn test_non_reference_strings_untouched() {
        for s in ["plain text", "{{other.path}}", "prefix {{analysis_data.x}}", "{{analysis_data.}}"] {
            let v = json!(s);
            assert_eq!(resolve_value(&v, &payload()), v);
        }
    }

    #[test]
    fn test_scalars_are_identity() {
        for v in [json!(42), json!(true), json!(2.5), Value::Null] {
            assert_eq!(resolve_value(&v, &payload()), v);
        }
    }

    #[test]
    fn test_nested_structure_resolved_in_place() {
        let props = json!({
            "title": "Performance",
            "stats": [
                { "label": "Best", "value": "{{analysis_data.summary.best}}" },
                { "label": "Sharpe", "value": "{{analysis_data.metrics.sharpe}}" }
            ]
        });
        let resolved = resolve_value(&props, &payload());
        assert_eq!(resolved["stats"][0]["value"], json!("QQQ"));
        assert_eq!(resolved["stats"][1]["value"], json!(1.8));
        assert_eq!(resolved["title"], json!("Performance"));
    }

    #[test]
    fn test_input_not_mutated() {
        let original = json!({ "v": "{{analysis_data.summary.best}}" });
        let snapshot = original.clone();
        let _ = resolve_value(&original, &payload());
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_unresolved_references_collected() {
        let resolved = resolve_value(
            &json!({
                "ok": "{{analysis_data.summary.best}}",
                "bad": "{{analysis_data.summary.gone}}"
            }),
            &payload(),
        );
        let unresolved = unresolved_references(&resolved);
        assert_eq!(unresolved, vec!["{{analysis_data.summary.gone}}".to_string()]);
    }
}
