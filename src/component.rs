//! Component capability registry - maps component-type names from the
//! configuration document to renderable capabilities.
//!
//! The set of components is closed: a fixed enum of known types with a
//! single dispatch point. Unknown names return `None` from lookup and the
//! assembler turns that into a placeholder plan entry, so one unrecognized
//! component never aborts the rest of the dashboard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Broad rendering category of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Chart,
    List,
    Table,
    Card,
}

/// Every component type the engine knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    BarChart,
    LineChart,
    PieChart,
    ScatterChart,
    RankedList,
    BulletedList,
    CalloutList,
    ComparisonTable,
    RankingTable,
    HeatmapTable,
    StatGroup,
    ExecutiveSummary,
    InsightSections,
    SummaryConclusion,
}

impl ComponentType {
    /// All known component types, in registry declaration order.
    pub const ALL: [ComponentType; 14] = [
        ComponentType::BarChart,
        ComponentType::LineChart,
        ComponentType::PieChart,
        ComponentType::ScatterChart,
        ComponentType::RankedList,
        ComponentType::BulletedList,
        ComponentType::CalloutList,
        ComponentType::ComparisonTable,
        ComponentType::RankingTable,
        ComponentType::HeatmapTable,
        ComponentType::StatGroup,
        ComponentType::ExecutiveSummary,
        ComponentType::InsightSections,
        ComponentType::SummaryConclusion,
    ];

    /// The registry key for this component type, as it appears in
    /// configuration documents.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentType::BarChart => "BarChart",
            ComponentType::LineChart => "LineChart",
            ComponentType::PieChart => "PieChart",
            ComponentType::ScatterChart => "ScatterChart",
            ComponentType::RankedList => "RankedList",
            ComponentType::BulletedList => "BulletedList",
            ComponentType::CalloutList => "CalloutList",
            ComponentType::ComparisonTable => "ComparisonTable",
            ComponentType::RankingTable => "RankingTable",
            ComponentType::HeatmapTable => "HeatmapTable",
            ComponentType::StatGroup => "StatGroup",
            ComponentType::ExecutiveSummary => "ExecutiveSummary",
            ComponentType::InsightSections => "InsightSections",
            ComponentType::SummaryConclusion => "SummaryConclusion",
        }
    }

    /// Rendering category of the component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentType::BarChart
            | ComponentType::LineChart
            | ComponentType::PieChart
            | ComponentType::ScatterChart => ComponentKind::Chart,
            ComponentType::RankedList
            | ComponentType::BulletedList
            | ComponentType::CalloutList => ComponentKind::List,
            ComponentType::ComparisonTable
            | ComponentType::RankingTable
            | ComponentType::HeatmapTable => ComponentKind::Table,
            ComponentType::StatGroup
            | ComponentType::ExecutiveSummary
            | ComponentType::InsightSections
            | ComponentType::SummaryConclusion => ComponentKind::Card,
        }
    }

    /// Name of the props field holding this component's item collection,
    /// if it has one. This is the field the item-count constraint applies
    /// to and the field `auto_fix` slices on overflow.
    pub fn item_field(&self) -> Option<&'static str> {
        match self {
            ComponentType::BarChart
            | ComponentType::LineChart
            | ComponentType::PieChart
            | ComponentType::ScatterChart => Some("data"),
            ComponentType::RankedList
            | ComponentType::BulletedList
            | ComponentType::CalloutList => Some("items"),
            ComponentType::ComparisonTable => Some("entities"),
            ComponentType::RankingTable | ComponentType::HeatmapTable => Some("rows"),
            ComponentType::StatGroup => Some("stats"),
            ComponentType::ExecutiveSummary => Some("highlights"),
            ComponentType::InsightSections => Some("sections"),
            ComponentType::SummaryConclusion => None,
        }
    }
}

/// The renderable capability behind one registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub component_type: ComponentType,
    pub kind: ComponentKind,
    /// Item-collection field, when the component has one.
    pub item_field: Option<&'static str>,
}

impl Capability {
    fn of(component_type: ComponentType) -> Self {
        Self {
            component_type,
            kind: component_type.kind(),
            item_field: component_type.item_field(),
        }
    }
}

/// Registry of display-component capabilities, keyed by component name.
#[derive(Debug)]
pub struct Registry {
    capabilities: HashMap<&'static str, Capability>,
}

impl Registry {
    /// Build the registry with every known component type.
    pub fn new() -> Self {
        let capabilities = ComponentType::ALL
            .iter()
            .map(|&ct| (ct.name(), Capability::of(ct)))
            .collect();
        Self { capabilities }
    }

    /// Look up a capability by component name. Returns `None` for
    /// unrecognized names; the caller decides how to degrade.
    pub fn lookup(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }

    /// Check if a component name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// All registered component names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.capabilities.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
