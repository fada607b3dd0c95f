//! Layout space model - grid slots, space types, component suitability,
//! and the per-(space, component) constraint tables.
//!
//! The tables load once at startup from a TOML resource. An embedded
//! default document ships with the crate; a custom file can replace the
//! whole set. A malformed table file is the one fatal error in this
//! engine, since the validator cannot function without its tables.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading the space tables
#[derive(Error, Debug)]
pub enum SpaceModelError {
    #[error("Failed to read space tables file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse space tables TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Unknown space type '{name}' in {context}")]
    UnknownSpaceType { name: String, context: String },
}

/// Coarse size class describing how much room a layout slot gives a
/// component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    QuarterWidth,
    HalfWidth,
    TwoThirdsWidth,
    /// The fallback for unknown slots and hints.
    #[default]
    FullWidth,
}

impl SpaceType {
    pub fn name(&self) -> &'static str {
        match self {
            SpaceType::QuarterWidth => "quarter_width",
            SpaceType::HalfWidth => "half_width",
            SpaceType::TwoThirdsWidth => "two_thirds_width",
            SpaceType::FullWidth => "full_width",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "quarter_width" => Some(SpaceType::QuarterWidth),
            "half_width" => Some(SpaceType::HalfWidth),
            "two_thirds_width" => Some(SpaceType::TwoThirdsWidth),
            "full_width" => Some(SpaceType::FullWidth),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout hint attached to a component spec in the configuration document.
///
/// Two shapes appear in the wild: the full form (`size` + `height`) and a
/// minimal form (`span`). An explicit `slot` names a grid slot directly.
/// All fields are optional; anything missing or unrecognized degrades to
/// `full_width`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
}

/// Per-space component suitability lists.
#[derive(Debug, Clone, Default)]
pub struct SpaceProfile {
    /// Component names that work well in this space, in preference order.
    pub suitable: Vec<String>,
    /// Component names that overflow or degrade in this space.
    pub unsuitable: Vec<String>,
}

/// One variant of a component and the spaces where it is preferred.
#[derive(Debug, Clone)]
pub struct VariantProfile {
    pub name: String,
    pub best_spaces: Vec<SpaceType>,
}

/// Content limits for one (space type, component type) pair.
#[derive(Debug, Clone, Default)]
pub struct Limits {
    pub max_items: Option<usize>,
    pub max_columns: Option<usize>,
    pub required_variant: Option<String>,
    pub allowed_variants: Option<Vec<String>>,
    /// Text field name -> maximum length in characters.
    pub max_text: HashMap<String, usize>,
}

// ── TOML document shapes ──────────────────────────────────────────

#[derive(Deserialize)]
struct TomlTables {
    #[serde(default)]
    slots: HashMap<String, String>,
    #[serde(default)]
    spaces: HashMap<String, TomlSpaceProfile>,
    #[serde(default)]
    profiles: HashMap<String, TomlComponentProfile>,
    #[serde(default)]
    limits: HashMap<String, HashMap<String, TomlLimits>>,
}

#[derive(Deserialize)]
struct TomlSpaceProfile {
    #[serde(default)]
    suitable: Vec<String>,
    #[serde(default)]
    unsuitable: Vec<String>,
}

#[derive(Deserialize)]
struct TomlComponentProfile {
    #[serde(default)]
    variants: Vec<TomlVariant>,
}

#[derive(Deserialize)]
struct TomlVariant {
    name: String,
    #[serde(default)]
    best_spaces: Vec<String>,
}

#[derive(Deserialize)]
struct TomlLimits {
    max_items: Option<usize>,
    max_columns: Option<usize>,
    required_variant: Option<String>,
    allowed_variants: Option<Vec<String>>,
    #[serde(default)]
    text: HashMap<String, usize>,
}

/// Default table set. Slot names cover a 12-column dashboard grid; limits
/// tighten as spaces shrink.
const DEFAULT_TABLES: &str = r#"
[slots]
fullWidthTop = "full_width"
fullWidthBottom = "full_width"
twoThirdsWidthMain = "two_thirds_width"
twoThirdsWidthLower = "two_thirds_width"
halfWidthLeft = "half_width"
halfWidthRight = "half_width"
quarterWidthTopLeft = "quarter_width"
quarterWidthTopRight = "quarter_width"
quarterWidthMiddleLeft = "quarter_width"
quarterWidthMiddleRight = "quarter_width"
sidebarUpper = "quarter_width"
sidebarLower = "quarter_width"

[spaces.quarter_width]
suitable = ["StatGroup", "CalloutList", "PieChart", "RankedList"]
unsuitable = ["ComparisonTable", "HeatmapTable", "ExecutiveSummary", "InsightSections", "ScatterChart"]

[spaces.half_width]
suitable = ["BarChart", "PieChart", "StatGroup", "RankedList", "BulletedList", "CalloutList", "LineChart"]
unsuitable = ["HeatmapTable", "InsightSections"]

[spaces.two_thirds_width]
suitable = ["BarChart", "LineChart", "ScatterChart", "ComparisonTable", "RankingTable", "InsightSections"]
unsuitable = []

[spaces.full_width]
suitable = ["ExecutiveSummary", "InsightSections", "ComparisonTable", "HeatmapTable", "LineChart", "SummaryConclusion"]
unsuitable = []

[profiles.StatGroup]
variants = [
  { name = "compact", best_spaces = ["quarter_width", "half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.CalloutList]
variants = [
  { name = "compact", best_spaces = ["quarter_width"] },
  { name = "default", best_spaces = ["half_width", "two_thirds_width", "full_width"] },
]

[profiles.RankedList]
variants = [
  { name = "compact", best_spaces = ["quarter_width", "half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.ComparisonTable]
variants = [
  { name = "condensed", best_spaces = ["half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.RankingTable]
variants = [
  { name = "condensed", best_spaces = ["half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.BarChart]
variants = [
  { name = "compact", best_spaces = ["quarter_width", "half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.LineChart]
variants = [
  { name = "sparkline", best_spaces = ["quarter_width"] },
  { name = "compact", best_spaces = ["half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.PieChart]
variants = [
  { name = "compact", best_spaces = ["quarter_width", "half_width"] },
  { name = "default", best_spaces = ["two_thirds_width", "full_width"] },
]

[profiles.ExecutiveSummary]
variants = [
  { name = "brief", best_spaces = ["half_width", "two_thirds_width"] },
  { name = "default", best_spaces = ["full_width"] },
]

[limits.quarter_width.StatGroup]
max_items = 2
required_variant = "compact"
[limits.quarter_width.StatGroup.text]
title = 30

[limits.quarter_width.CalloutList]
max_items = 2
required_variant = "compact"
[limits.quarter_width.CalloutList.text]
title = 30
content = 80

[limits.quarter_width.RankedList]
max_items = 3
required_variant = "compact"
[limits.quarter_width.RankedList.text]
title = 30

[limits.quarter_width.PieChart]
max_items = 4
[limits.quarter_width.PieChart.text]
title = 30

[limits.quarter_width.BarChart]
max_items = 4
required_variant = "compact"
[limits.quarter_width.BarChart.text]
title = 30

[limits.quarter_width.LineChart]
max_items = 20
required_variant = "sparkline"
[limits.quarter_width.LineChart.text]
title = 30

[limits.half_width.StatGroup]
max_items = 4
allowed_variants = ["compact", "default"]
[limits.half_width.StatGroup.text]
title = 50

[limits.half_width.CalloutList]
max_items = 4
[limits.half_width.CalloutList.text]
title = 50
content = 160

[limits.half_width.RankedList]
max_items = 5
[limits.half_width.RankedList.text]
title = 50

[limits.half_width.BulletedList]
max_items = 6
[limits.half_width.BulletedList.text]
title = 50
content = 160

[limits.half_width.ComparisonTable]
max_items = 4
max_columns = 3
required_variant = "condensed"
[limits.half_width.ComparisonTable.text]
title = 50

[limits.half_width.BarChart]
max_items = 8
allowed_variants = ["compact", "default"]
[limits.half_width.BarChart.text]
title = 50

[limits.half_width.PieChart]
max_items = 6
[limits.half_width.PieChart.text]
title = 50

[limits.half_width.ExecutiveSummary]
max_items = 3
required_variant = "brief"
[limits.half_width.ExecutiveSummary.text]
title = 50
content = 240

[limits.two_thirds_width.ComparisonTable]
max_items = 6
max_columns = 5
[limits.two_thirds_width.ComparisonTable.text]
title = 70

[limits.two_thirds_width.RankingTable]
max_items = 8
max_columns = 5
[limits.two_thirds_width.RankingTable.text]
title = 70

[limits.two_thirds_width.InsightSections]
max_items = 3
[limits.two_thirds_width.InsightSections.text]
title = 70
content = 400

[limits.full_width.ComparisonTable]
max_items = 10
max_columns = 8
[limits.full_width.ComparisonTable.text]
title = 90

[limits.full_width.HeatmapTable]
max_items = 12
max_columns = 10
[limits.full_width.HeatmapTable.text]
title = 90

[limits.full_width.InsightSections]
max_items = 5
[limits.full_width.InsightSections.text]
title = 90
content = 600

[limits.full_width.ExecutiveSummary]
max_items = 5
[limits.full_width.ExecutiveSummary.text]
title = 90
content = 600

[limits.full_width.SummaryConclusion]
[limits.full_width.SummaryConclusion.text]
title = 90
content = 800
"#;

/// The loaded space model: slot map, suitability lists, variant profiles,
/// and constraint limits.
#[derive(Debug, Clone)]
pub struct SpaceModel {
    slots: HashMap<String, SpaceType>,
    spaces: HashMap<SpaceType, SpaceProfile>,
    profiles: HashMap<String, Vec<VariantProfile>>,
    limits: HashMap<(SpaceType, String), Limits>,
}

impl SpaceModel {
    /// Load space tables from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SpaceModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load space tables from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SpaceModelError> {
        let parsed: TomlTables = toml::from_str(content)?;

        let parse_space = |name: &str, context: &str| {
            SpaceType::from_name(name).ok_or_else(|| SpaceModelError::UnknownSpaceType {
                name: name.to_string(),
                context: context.to_string(),
            })
        };

        let mut slots = HashMap::new();
        for (slot, space_name) in &parsed.slots {
            let space = parse_space(space_name, &format!("slot '{}'", slot))?;
            slots.insert(slot.clone(), space);
        }

        let mut spaces = HashMap::new();
        for (space_name, profile) in &parsed.spaces {
            let space = parse_space(space_name, "[spaces] table")?;
            spaces.insert(
                space,
                SpaceProfile {
                    suitable: profile.suitable.clone(),
                    unsuitable: profile.unsuitable.clone(),
                },
            );
        }

        let mut profiles = HashMap::new();
        for (component, profile) in &parsed.profiles {
            let mut variants = Vec::new();
            for v in &profile.variants {
                let mut best_spaces = Vec::new();
                for s in &v.best_spaces {
                    best_spaces.push(parse_space(
                        s,
                        &format!("variant '{}' of profile '{}'", v.name, component),
                    )?);
                }
                variants.push(VariantProfile {
                    name: v.name.clone(),
                    best_spaces,
                });
            }
            profiles.insert(component.clone(), variants);
        }

        let mut limits = HashMap::new();
        for (space_name, per_component) in &parsed.limits {
            let space = parse_space(space_name, "[limits] table")?;
            for (component, entry) in per_component {
                limits.insert(
                    (space, component.clone()),
                    Limits {
                        max_items: entry.max_items,
                        max_columns: entry.max_columns,
                        required_variant: entry.required_variant.clone(),
                        allowed_variants: entry.allowed_variants.clone(),
                        max_text: entry.text.clone(),
                    },
                );
            }
        }

        Ok(SpaceModel {
            slots,
            spaces,
            profiles,
            limits,
        })
    }

    /// Space type for a named grid slot, falling back to `full_width` for
    /// unknown slot names.
    pub fn space_type_for_slot(&self, slot: &str) -> SpaceType {
        self.slots
            .get(slot)
            .copied()
            .unwrap_or(SpaceType::FullWidth)
    }

    /// Space type for a layout hint from the configuration document.
    ///
    /// Precedence: explicit slot name, then `size`, then `span`. Anything
    /// missing or unrecognized is `full_width`.
    pub fn space_type_for(&self, hint: &LayoutHint) -> SpaceType {
        if let Some(slot) = &hint.slot {
            return self.space_type_for_slot(slot);
        }
        if let Some(size) = &hint.size {
            return match size.as_str() {
                "quarter" => SpaceType::QuarterWidth,
                // A third of the grid is nearer a quarter than a half;
                // round down so content constraints stay safe.
                "third" => SpaceType::QuarterWidth,
                "half" => SpaceType::HalfWidth,
                "two_thirds" => SpaceType::TwoThirdsWidth,
                _ => SpaceType::FullWidth,
            };
        }
        if let Some(span) = &hint.span {
            return match span.as_str() {
                "normal" => SpaceType::HalfWidth,
                _ => SpaceType::FullWidth,
            };
        }
        SpaceType::FullWidth
    }

    /// Limits for a (space type, component name) pair, if any are
    /// configured. Absence means "no constraints known", not an error.
    pub fn limits_for(&self, space: SpaceType, component: &str) -> Option<&Limits> {
        self.limits.get(&(space, component.to_string()))
    }

    /// Suitability profile for a space type.
    pub fn space_profile(&self, space: SpaceType) -> Option<&SpaceProfile> {
        self.spaces.get(&space)
    }

    /// Whether a component is on the space's deny-list.
    pub fn is_unsuitable(&self, component: &str, space: SpaceType) -> bool {
        self.spaces
            .get(&space)
            .map(|p| p.unsuitable.iter().any(|c| c == component))
            .unwrap_or(false)
    }

    /// First entry of the space's allow-list: the preferred replacement
    /// when a component does not fit its space.
    pub fn preferred_component(&self, space: SpaceType) -> Option<&str> {
        self.spaces
            .get(&space)
            .and_then(|p| p.suitable.first())
            .map(|s| s.as_str())
    }

    /// Best variant of a component for a space: the first variant in
    /// declaration order whose `best_spaces` contains the target, else
    /// `"default"`. Declaration order is the tie-break, deliberately.
    pub fn best_variant(&self, component: &str, space: SpaceType) -> &str {
        self.profiles
            .get(component)
            .and_then(|variants| {
                variants
                    .iter()
                    .find(|v| v.best_spaces.contains(&space))
                    .map(|v| v.name.as_str())
            })
            .unwrap_or("default")
    }

    /// Variant profiles declared for a component.
    pub fn variant_profiles(&self, component: &str) -> Option<&[VariantProfile]> {
        self.profiles.get(component).map(|v| v.as_slice())
    }
}

impl Default for SpaceModel {
    fn default() -> Self {
        Self::from_str(DEFAULT_TABLES).expect("Default space tables should be valid TOML")
    }
}
