//! Feedback store and fix recommendation.
//!
//! Observers (human or automated) record placement and quality problems
//! against a (component, layout, space) key. The store keeps one record
//! per key via upsert, computes aggregate statistics, and the recommender
//! mines unfixed records for ranked remediation suggestions. Suggestions
//! describe configuration-document edits; nothing is applied
//! automatically.

pub mod recommend;
pub mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::component::ComponentType;
use crate::spaces::SpaceType;

pub use recommend::{analyze, bulk_fix, Confidence, Fix, FixAction, Suggestion};
pub use store::{FeedbackStore, InMemoryRepository};

/// Issue categories an observer can flag on a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueFlags {
    pub overflow: bool,
    pub poor_design: bool,
    pub wrong_variant: bool,
    pub misplaced_component: bool,
    pub responsive: bool,
    pub other: bool,
}

/// A stored feedback record, keyed by component + layout + space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub component_name: String,
    pub component_type: Option<ComponentType>,
    pub layout_name: String,
    pub space_name: String,
    pub space_type: SpaceType,
    pub timestamp: DateTime<Utc>,
    pub fixed: bool,
    pub has_overflow: bool,
    /// 1 (unusable) to 5 (excellent); `None` when unrated.
    pub quality_rating: Option<u8>,
    pub notes: String,
    pub issues: IssueFlags,
}

impl FeedbackRecord {
    /// Upsert identity: same component in the same slot of the same
    /// layout refers to the same observation.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.component_name, &self.layout_name, &self.space_name)
    }
}

/// Partial input for `add_record`; the store fills in id, timestamp, and
/// the `fixed` flag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Observation {
    pub component_name: String,
    #[serde(default)]
    pub component_type: Option<ComponentType>,
    pub layout_name: String,
    pub space_name: String,
    pub space_type: SpaceType,
    #[serde(default)]
    pub has_overflow: bool,
    #[serde(default)]
    pub quality_rating: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub issues: IssueFlags,
}

/// Counts per issue category across the store.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IssueCounts {
    pub overflow: usize,
    pub poor_design: usize,
    pub wrong_variant: usize,
    pub misplaced_component: usize,
    pub responsive: usize,
    pub other: usize,
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedbackStats {
    pub total: usize,
    pub fixed: usize,
    pub unfixed: usize,
    pub with_overflow: usize,
    /// Index i counts ratings of i + 1.
    pub quality_histogram: [usize; 5],
    pub issue_counts: IssueCounts,
    pub by_layout: BTreeMap<String, usize>,
    pub by_component: BTreeMap<String, usize>,
    pub by_space: BTreeMap<String, usize>,
}

/// On-demand snapshot document for external tooling.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackExport {
    pub exported_at: DateTime<Utc>,
    pub records: Vec<FeedbackRecord>,
    pub stats: FeedbackStats,
    pub summary: String,
}

/// Abstract persistence seam for feedback records.
///
/// Implementations must serialize writes (single-writer discipline) and
/// hand out consistent snapshots on read; `InMemoryRepository` is the
/// reference implementation, and a file- or KV-backed one can be plugged
/// in without touching the recommender.
pub trait FeedbackRepository: Send + Sync {
    /// Consistent snapshot of all records, in insertion order.
    fn all(&self) -> Vec<FeedbackRecord>;
    fn get(&self, id: &str) -> Option<FeedbackRecord>;
    fn find_by_key(&self, component: &str, layout: &str, space: &str) -> Option<FeedbackRecord>;
    fn insert(&self, record: FeedbackRecord);
    /// Insert the record, or replace the existing record with the same
    /// (component, layout, space) key, keeping that record's id. The
    /// find-and-write must happen under a single writer hold so racing
    /// upserts on one key cannot both insert. Returns the record as
    /// stored.
    fn upsert(&self, record: FeedbackRecord) -> FeedbackRecord;
    /// Replace the record with the same id. Returns false if absent.
    fn update(&self, record: FeedbackRecord) -> bool;
    fn remove(&self, id: &str) -> bool;
}
