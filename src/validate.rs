//! Constraint validation - checks a component's resolved props against the
//! limits for its assigned space, and auto-fixes what it can.
//!
//! Runs after reference resolution. Item-count and required-variant
//! mismatches are errors (the content will not fit the slot); text length
//! and column density are warnings (visually degraded, not overflowing).

use serde_json::Value;

use crate::component::Capability;
use crate::spaces::{Limits, SpaceModel, SpaceType};

/// A correction the validator knows how to apply mechanically.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestedFix {
    /// Slice the item collection down to the space's maximum.
    SliceItems { field: String, max_items: usize },
    /// Force the variant the space requires.
    ForceVariant { variant: String },
    /// Truncate a text field to the configured length, ellipsis included.
    TruncateText { field: String, max_len: usize },
}

/// Outcome of validating one component against one space.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub fixes: Vec<SuggestedFix>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate resolved props for a capability placed in a space.
///
/// A missing limits entry for the (space, component) pair is not an
/// error: validation degrades to "no constraints known" with a warning
/// and never blocks assembly.
pub fn validate(
    capability: &Capability,
    space: SpaceType,
    model: &SpaceModel,
    props: &Value,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let component = capability.component_type.name();
    let limits = match model.limits_for(space, component) {
        Some(l) => l,
        None => {
            report.warnings.push(format!(
                "no constraints known for {} in {}",
                component, space
            ));
            return report;
        }
    };

    check_item_count(capability, limits, props, &mut report);
    check_variant(component, limits, props, &mut report);
    check_text_lengths(limits, props, &mut report);
    check_column_count(limits, props, &mut report);

    report
}

/// Apply every suggested fix from `validate` and return the corrected
/// props. Idempotent: fixing already-fixed props is a no-op.
pub fn auto_fix(
    capability: &Capability,
    space: SpaceType,
    model: &SpaceModel,
    props: &Value,
) -> Value {
    let report = validate(capability, space, model, props);
    let mut fixed = props.clone();
    for fix in &report.fixes {
        apply_fix(fix, &mut fixed);
    }
    fixed
}

// ── Item-count check ──────────────────────────────────────────────

fn check_item_count(
    capability: &Capability,
    limits: &Limits,
    props: &Value,
    report: &mut ValidationReport,
) {
    let (field, max_items) = match (capability.item_field, limits.max_items) {
        (Some(f), Some(m)) => (f, m),
        _ => return,
    };

    if let Some(items) = props.get(field).and_then(Value::as_array) {
        if items.len() > max_items {
            report.errors.push(format!(
                "'{}' has {} items but the space allows at most {}",
                field,
                items.len(),
                max_items
            ));
            report.fixes.push(SuggestedFix::SliceItems {
                field: field.to_string(),
                max_items,
            });
        }
    }
}

// ── Variant check ─────────────────────────────────────────────────

fn current_variant(props: &Value) -> &str {
    props
        .get("variant")
        .and_then(Value::as_str)
        .unwrap_or("default")
}

fn check_variant(
    component: &str,
    limits: &Limits,
    props: &Value,
    report: &mut ValidationReport,
) {
    let variant = current_variant(props);

    if let Some(required) = &limits.required_variant {
        if variant != required {
            report.errors.push(format!(
                "{} must use variant '{}' here, found '{}'",
                component, required, variant
            ));
            report.fixes.push(SuggestedFix::ForceVariant {
                variant: required.clone(),
            });
        }
        return;
    }

    // Soft preference only: off-list variants warn, nothing is forced.
    if let Some(allowed) = &limits.allowed_variants {
        if !allowed.iter().any(|a| a == variant) {
            report.warnings.push(format!(
                "variant '{}' is not among the preferred variants for {} ({})",
                variant,
                component,
                allowed.join(", ")
            ));
        }
    }
}

// ── Text-length check ─────────────────────────────────────────────

fn check_text_lengths(limits: &Limits, props: &Value, report: &mut ValidationReport) {
    // Deterministic message order regardless of map iteration
    let mut fields: Vec<(&String, &usize)> = limits.max_text.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, &max_len) in fields {
        if let Some(text) = props.get(field).and_then(Value::as_str) {
            let len = text.chars().count();
            if len > max_len {
                report.warnings.push(format!(
                    "'{}' is {} characters, over the {}-character limit",
                    field, len, max_len
                ));
                report.fixes.push(SuggestedFix::TruncateText {
                    field: field.clone(),
                    max_len,
                });
            }
        }
    }
}

// ── Column-count check ────────────────────────────────────────────

fn check_column_count(limits: &Limits, props: &Value, report: &mut ValidationReport) {
    let max_columns = match limits.max_columns {
        Some(m) => m,
        None => return,
    };

    if let Some(columns) = props.get("columns").and_then(Value::as_array) {
        if columns.len() > max_columns {
            // Visual density only, never auto-fixed
            report.warnings.push(format!(
                "{} columns exceeds the recommended maximum of {}",
                columns.len(),
                max_columns
            ));
        }
    }
}

// ── Fix application ───────────────────────────────────────────────

fn apply_fix(fix: &SuggestedFix, props: &mut Value) {
    match fix {
        SuggestedFix::SliceItems { field, max_items } => {
            if let Some(items) = props.get_mut(field).and_then(Value::as_array_mut) {
                items.truncate(*max_items);
            }
        }
        SuggestedFix::ForceVariant { variant } => {
            if let Some(map) = props.as_object_mut() {
                map.insert("variant".to_string(), Value::String(variant.clone()));
            }
        }
        SuggestedFix::TruncateText { field, max_len } => {
            if let Some(Value::String(text)) = props.get_mut(field) {
                *text = truncate_with_ellipsis(text, *max_len);
            }
        }
    }
}

/// Truncate to `max_len` characters total, the last three being an
/// ellipsis. Character-based so multi-byte text cannot split a codepoint.
fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    let keep = max_len.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Registry;
    use serde_json::json;

    fn capability(name: &str) -> Capability {
        *Registry::new().lookup(name).expect("known component")
    }

    fn stat_props(count: usize) -> Value {
        let stats: Vec<Value> = (0..count)
            .map(|i| json!({ "label": format!("stat {}", i), "value": i }))
            .collect();
        json!({ "title": "Stats", "stats": stats })
    }

    #[test]
    fn test_item_overflow_is_error_with_fix() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = stat_props(6);

        let report = validate(&cap, SpaceType::QuarterWidth, &model, &props);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("6 items")));
        assert!(report.fixes.contains(&SuggestedFix::SliceItems {
            field: "stats".to_string(),
            max_items: 2,
        }));
    }

    #[test]
    fn test_required_variant_mismatch_is_error() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = json!({ "title": "Stats", "stats": [], "variant": "default" });

        let report = validate(&cap, SpaceType::QuarterWidth, &model, &props);
        assert!(!report.is_valid());
        assert!(report.fixes.contains(&SuggestedFix::ForceVariant {
            variant: "compact".to_string(),
        }));
    }

    #[test]
    fn test_allowed_variant_mismatch_is_warning_only() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        // half_width StatGroup allows compact/default; "expanded" is off-list
        let props = json!({ "title": "Stats", "stats": [], "variant": "expanded" });

        let report = validate(&cap, SpaceType::HalfWidth, &model, &props);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("expanded")));
        assert!(!report
            .fixes
            .iter()
            .any(|f| matches!(f, SuggestedFix::ForceVariant { .. })));
    }

    #[test]
    fn test_text_overflow_is_warning_with_truncation_fix() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let long_title = "A very long dashboard panel title that overflows".repeat(2);
        let props = json!({ "title": long_title, "stats": [], "variant": "compact" });

        let report = validate(&cap, SpaceType::QuarterWidth, &model, &props);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("title")));
        assert!(report.fixes.contains(&SuggestedFix::TruncateText {
            field: "title".to_string(),
            max_len: 30,
        }));
    }

    #[test]
    fn test_column_overflow_is_warning_without_fix() {
        let model = SpaceModel::default();
        let cap = capability("ComparisonTable");
        let props = json!({
            "title": "Compare",
            "variant": "condensed",
            "entities": [],
            "columns": ["a", "b", "c", "d", "e"]
        });

        let report = validate(&cap, SpaceType::HalfWidth, &model, &props);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("columns")));
        assert!(report.fixes.is_empty());
    }

    #[test]
    fn test_missing_limits_degrades_to_warning() {
        let model = SpaceModel::default();
        let cap = capability("BarChart");
        let props = json!({ "data": [1, 2, 3] });

        let report = validate(&cap, SpaceType::FullWidth, &model, &props);
        assert!(report.is_valid());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("no constraints known")));
    }

    #[test]
    fn test_clean_props_validate_clean() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = json!({ "title": "Stats", "stats": [{}, {}], "variant": "compact" });

        let report = validate(&cap, SpaceType::QuarterWidth, &model, &props);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
        assert!(report.fixes.is_empty());
    }

    #[test]
    fn test_auto_fix_slices_and_forces_variant() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = stat_props(6);

        let fixed = auto_fix(&cap, SpaceType::QuarterWidth, &model, &props);
        assert_eq!(fixed["stats"].as_array().unwrap().len(), 2);
        assert_eq!(fixed["variant"], json!("compact"));

        let report = validate(&cap, SpaceType::QuarterWidth, &model, &fixed);
        assert!(report.is_valid());
    }

    #[test]
    fn test_auto_fix_truncates_text() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = json!({
            "title": "This title is considerably longer than thirty characters",
            "stats": [],
            "variant": "compact"
        });

        let fixed = auto_fix(&cap, SpaceType::QuarterWidth, &model, &props);
        let title = fixed["title"].as_str().unwrap();
        assert_eq!(title.chars().count(), 30);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_auto_fix_is_idempotent() {
        let model = SpaceModel::default();
        let cap = capability("StatGroup");
        let props = json!({
            "title": "This title is considerably longer than thirty characters",
            "stats": stat_props(6)["stats"],
            "variant": "default"
        });

        let once = auto_fix(&cap, SpaceType::QuarterWidth, &model, &props);
        let twice = auto_fix(&cap, SpaceType::QuarterWidth, &model, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let text = "日本語のかなり長いタイトルでグリッドに収まらないもの";
        let truncated = truncate_with_ellipsis(text, 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.ends_with("..."));
    }
}
