//! Dashboard Composer - a configuration-driven composition engine for
//! analysis dashboards.
//!
//! An upstream generator (an LLM formatter or a rules engine) produces a
//! UI configuration document naming display components, their props (a
//! mix of literals and `{{analysis_data.*}}` references), and layout
//! hints. This library resolves the references against an analysis-result
//! payload, dispatches to a closed set of component capabilities,
//! enforces per-slot content constraints with auto-fix, and emits an
//! ordered render plan for a separate rendering layer.
//!
//! # Example
//!
//! ```rust
//! use dashboard_composer::compose;
//! use serde_json::json;
//!
//! let doc = json!({
//!     "selected_components": [{
//!         "component_name": "StatGroup",
//!         "props": { "title": "Summary", "stats": "{{analysis_data.stats}}" },
//!         "layout": { "size": "quarter" }
//!     }]
//! });
//! let payload = json!({ "stats": [{ "label": "Best", "value": "QQQ" }] });
//!
//! let plan = compose(&doc, &payload);
//! assert_eq!(plan.entries.len(), 1);
//! ```

pub mod assembler;
pub mod component;
pub mod feedback;
pub mod resolver;
pub mod spaces;
pub mod validate;

pub use assembler::{assemble, PlanEntry, RenderPlan, Validation};
pub use component::{Capability, ComponentKind, ComponentType, Registry};
pub use feedback::{
    analyze, bulk_fix, Confidence, FeedbackRecord, FeedbackStore, Fix, FixAction, Observation,
    Suggestion,
};
pub use spaces::{LayoutHint, SpaceModel, SpaceModelError, SpaceType};
pub use validate::{auto_fix, validate, SuggestedFix, ValidationReport};

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur outside the fail-soft assembly pipeline:
/// loading the space tables at startup and parsing the JSON inputs.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Error loading the space/limit tables
    #[error("space tables error: {0}")]
    SpaceModel(#[from] SpaceModelError),

    /// Error parsing a JSON input document
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the composition pipeline
#[derive(Debug)]
pub struct ComposeConfig {
    /// Component capability registry
    pub registry: Registry,
    /// Space tables: slot map, suitability, variant profiles, limits
    pub spaces: SpaceModel,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            spaces: SpaceModel::default(),
        }
    }
}

impl ComposeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the space tables
    pub fn with_spaces(mut self, spaces: SpaceModel) -> Self {
        self.spaces = spaces;
        self
    }
}

/// Compose a render plan with the default registry and space tables.
///
/// This is the main entry point for the library. Assembly is fail-soft:
/// malformed documents, unknown components, and constraint violations all
/// surface inside the returned plan instead of as errors.
pub fn compose(doc: &Value, payload: &Value) -> RenderPlan {
    compose_with_config(doc, payload, &ComposeConfig::default())
}

/// Compose a render plan with custom configuration.
pub fn compose_with_config(doc: &Value, payload: &Value, config: &ComposeConfig) -> RenderPlan {
    assemble(doc, payload, &config.registry, &config.spaces)
}

/// Parse two JSON strings and compose a render plan.
///
/// Unlike [`compose`], this can fail: the strings must be valid JSON.
pub fn compose_str(doc: &str, payload: &str) -> Result<RenderPlan, ComposeError> {
    let doc: Value = serde_json::from_str(doc)?;
    let payload: Value = serde_json::from_str(payload)?;
    Ok(compose(&doc, &payload))
}
