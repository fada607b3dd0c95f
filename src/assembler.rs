//! Render plan assembly - turns a configuration document plus an analysis
//! payload into an ordered list of fully resolved component instances.
//!
//! The pipeline per component spec: resolve references, assign a space
//! type from the layout hint, look up the capability, validate and
//! auto-fix once. Every failure mode is fail-soft: unknown components
//! become placeholder entries, constraint violations are attached to the
//! entry, and a malformed document yields a diagnostic plan instead of an
//! error. One bad spec never short-circuits the rest of the dashboard.

use serde::Serialize;
use serde_json::Value;

use crate::component::{ComponentType, Registry};
use crate::resolver::{resolve_value, unresolved_references};
use crate::spaces::{LayoutHint, SpaceModel, SpaceType};
use crate::validate::{auto_fix, validate};

/// Validation outcome attached to a plan entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub autofix_applied: bool,
}

/// One fully resolved component instance, ready for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub component_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<ComponentType>,
    pub resolved_props: Value,
    pub space_type: SpaceType,
    pub position_index: usize,
    /// Set when the entry stands in for something that could not be
    /// rendered (unknown component, malformed spec).
    pub placeholder: bool,
    pub validation: Validation,
}

/// Ordered output of the assembler. `layout_template` and `priority` are
/// opaque hints passed through for the external layout chooser.
#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan {
    pub entries: Vec<PlanEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl RenderPlan {
    /// Entries that failed validation or stand in as placeholders.
    pub fn problem_entries(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries
            .iter()
            .filter(|e| e.placeholder || !e.validation.errors.is_empty())
    }
}

/// Assemble a render plan from an untrusted configuration document and an
/// analysis payload.
///
/// A document without a `selected_components` array is treated as "zero
/// components selected" and produces a single diagnostic placeholder
/// entry rather than an error.
pub fn assemble(
    doc: &Value,
    payload: &Value,
    registry: &Registry,
    model: &SpaceModel,
) -> RenderPlan {
    let layout_template = doc
        .get("layout_template")
        .and_then(Value::as_str)
        .map(str::to_string);
    let priority = doc
        .get("priority")
        .and_then(Value::as_str)
        .map(str::to_string);

    let selected = match doc.get("selected_components").and_then(Value::as_array) {
        Some(list) => list,
        None => {
            return RenderPlan {
                entries: vec![diagnostic_entry(
                    "configuration document has no selected_components list",
                )],
                layout_template,
                priority,
            };
        }
    };

    let entries = selected
        .iter()
        .enumerate()
        .map(|(index, spec)| assemble_entry(spec, index, payload, registry, model))
        .collect();

    RenderPlan {
        entries,
        layout_template,
        priority,
    }
}

/// Placeholder entry describing a document-level problem.
fn diagnostic_entry(message: &str) -> PlanEntry {
    PlanEntry {
        component_name: String::new(),
        component_type: None,
        resolved_props: Value::Null,
        space_type: SpaceType::FullWidth,
        position_index: 0,
        placeholder: true,
        validation: Validation {
            errors: vec![message.to_string()],
            ..Validation::default()
        },
    }
}

/// Run one component spec through the resolve → space → registry →
/// validate pipeline.
fn assemble_entry(
    spec: &Value,
    index: usize,
    payload: &Value,
    registry: &Registry,
    model: &SpaceModel,
) -> PlanEntry {
    let layout: LayoutHint = spec
        .get("layout")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    let space_type = model.space_type_for(&layout);

    let component_name = match spec.get("component_name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => {
            let mut entry = diagnostic_entry("component spec has no component_name");
            entry.position_index = index;
            entry.space_type = space_type;
            return entry;
        }
    };

    let props = spec.get("props").cloned().unwrap_or_else(|| Value::Object(Default::default()));
    let resolved_props = resolve_value(&props, payload);

    let mut validation = Validation::default();
    for reference in unresolved_references(&resolved_props) {
        validation
            .warnings
            .push(format!("unresolved reference {}", reference));
    }

    let capability = match registry.lookup(&component_name) {
        Some(cap) => *cap,
        None => {
            validation
                .errors
                .push(format!("unknown component '{}'", component_name));
            return PlanEntry {
                component_name,
                component_type: None,
                resolved_props,
                space_type,
                position_index: index,
                placeholder: true,
                validation,
            };
        }
    };

    let report = validate(&capability, space_type, model, &resolved_props);

    let (final_props, final_report, autofix_applied) = if report.is_valid() {
        (resolved_props, report, false)
    } else {
        // One auto-fix pass, then re-validate; whatever remains is
        // attached to the entry, informational for the plan consumer.
        let fixed = auto_fix(&capability, space_type, model, &resolved_props);
        let refreshed = validate(&capability, space_type, model, &fixed);
        (fixed, refreshed, true)
    };

    validation.errors.extend(final_report.errors);
    validation.warnings.extend(final_report.warnings);
    validation.autofix_applied = autofix_applied;

    PlanEntry {
        component_name,
        component_type: Some(capability.component_type),
        resolved_props: final_props,
        space_type,
        position_index: index,
        placeholder: false,
        validation,
    }
}
