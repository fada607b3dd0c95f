//! Feedback store - upsert log of placement observations plus aggregate
//! statistics and the on-demand export document.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::{
    FeedbackExport, FeedbackRecord, FeedbackRepository, FeedbackStats, Observation,
};

/// Reference repository: a `Mutex`-guarded vector. Writes are serialized
/// by the lock; reads clone out a snapshot so callers never observe a
/// live-mutating collection.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: Mutex<Vec<FeedbackRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FeedbackRecord>> {
        // A poisoned lock only means another observer panicked mid-write;
        // the record list itself is still usable.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeedbackRepository for InMemoryRepository {
    fn all(&self) -> Vec<FeedbackRecord> {
        self.lock().clone()
    }

    fn get(&self, id: &str) -> Option<FeedbackRecord> {
        self.lock().iter().find(|r| r.id == id).cloned()
    }

    fn find_by_key(&self, component: &str, layout: &str, space: &str) -> Option<FeedbackRecord> {
        self.lock()
            .iter()
            .find(|r| r.key() == (component, layout, space))
            .cloned()
    }

    fn insert(&self, record: FeedbackRecord) {
        self.lock().push(record);
    }

    fn upsert(&self, record: FeedbackRecord) -> FeedbackRecord {
        // One guard across find and write: concurrent upserts on the
        // same key serialize here instead of both inserting.
        let mut records = self.lock();
        match records.iter_mut().find(|r| r.key() == record.key()) {
            Some(slot) => {
                let mut merged = record;
                merged.id = slot.id.clone();
                *slot = merged.clone();
                merged
            }
            None => {
                records.push(record.clone());
                record
            }
        }
    }

    fn update(&self, record: FeedbackRecord) -> bool {
        let mut records = self.lock();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() < before
    }
}

/// The feedback store: upsert, explicit state changes, stats, export.
pub struct FeedbackStore {
    repo: Box<dyn FeedbackRepository>,
}

impl FeedbackStore {
    /// Store backed by the in-memory reference repository.
    pub fn in_memory() -> Self {
        Self::with_repository(Box::new(InMemoryRepository::new()))
    }

    /// Store backed by a caller-supplied repository.
    pub fn with_repository(repo: Box<dyn FeedbackRepository>) -> Self {
        Self { repo }
    }

    /// Record an observation, upserting on the (component, layout, space)
    /// key: an existing record keeps its id but takes the new field
    /// values, with `timestamp` refreshed and `fixed` reset. The
    /// find-and-write is one atomic repository operation, so concurrent
    /// observers of the same key leave exactly one record. Returns the
    /// stored record.
    pub fn add_record(&self, obs: Observation) -> FeedbackRecord {
        let now = Utc::now();
        let quality_rating = obs.quality_rating.filter(|r| (1..=5).contains(r));

        let record = FeedbackRecord {
            // Provisional id; the repository keeps the existing one on a
            // key match.
            id: format!(
                "{}-{}-{}-{}",
                obs.layout_name,
                obs.space_name,
                obs.component_name,
                now.timestamp_millis()
            ),
            component_name: obs.component_name,
            component_type: obs.component_type,
            layout_name: obs.layout_name,
            space_name: obs.space_name,
            space_type: obs.space_type,
            timestamp: now,
            fixed: false,
            has_overflow: obs.has_overflow,
            quality_rating,
            notes: obs.notes.unwrap_or_default(),
            issues: obs.issues,
        };

        self.repo.upsert(record)
    }

    /// Mark a record as fixed. Returns false if the id is unknown.
    pub fn mark_fixed(&self, id: &str) -> bool {
        match self.repo.get(id) {
            Some(mut record) => {
                record.fixed = true;
                self.repo.update(record)
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.repo.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<FeedbackRecord> {
        self.repo.get(id)
    }

    /// Snapshot of all records, insertion order.
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.repo.all()
    }

    /// Snapshot of records still awaiting a fix.
    pub fn unfixed(&self) -> Vec<FeedbackRecord> {
        self.repo.all().into_iter().filter(|r| !r.fixed).collect()
    }

    /// Aggregate counts over the current snapshot.
    pub fn stats(&self) -> FeedbackStats {
        let records = self.repo.all();
        let mut stats = FeedbackStats {
            total: records.len(),
            ..FeedbackStats::default()
        };

        for record in &records {
            if record.fixed {
                stats.fixed += 1;
            } else {
                stats.unfixed += 1;
            }
            if record.has_overflow {
                stats.with_overflow += 1;
            }
            // Ingest clamps ratings, but records arriving through a
            // plugged-in repository may carry anything
            if let Some(rating) = record.quality_rating {
                if (1..=5).contains(&rating) {
                    stats.quality_histogram[(rating - 1) as usize] += 1;
                }
            }

            let issues = &record.issues;
            if issues.overflow {
                stats.issue_counts.overflow += 1;
            }
            if issues.poor_design {
                stats.issue_counts.poor_design += 1;
            }
            if issues.wrong_variant {
                stats.issue_counts.wrong_variant += 1;
            }
            if issues.misplaced_component {
                stats.issue_counts.misplaced_component += 1;
            }
            if issues.responsive {
                stats.issue_counts.responsive += 1;
            }
            if issues.other {
                stats.issue_counts.other += 1;
            }

            *stats.by_layout.entry(record.layout_name.clone()).or_default() += 1;
            *stats
                .by_component
                .entry(record.component_name.clone())
                .or_default() += 1;
            *stats
                .by_space
                .entry(record.space_type.name().to_string())
                .or_default() += 1;
        }

        stats
    }

    /// On-demand snapshot document: records, stats, and a human-readable
    /// summary of the top issue types and most problematic layouts.
    pub fn export(&self) -> FeedbackExport {
        let records = self.repo.all();
        let stats = self.stats();
        let summary = summarize(&stats);
        FeedbackExport {
            exported_at: Utc::now(),
            records,
            stats,
            summary,
        }
    }
}

fn summarize(stats: &FeedbackStats) -> String {
    if stats.total == 0 {
        return "No feedback recorded.".to_string();
    }

    let mut issue_counts = vec![
        ("overflow", stats.issue_counts.overflow),
        ("poor design", stats.issue_counts.poor_design),
        ("wrong variant", stats.issue_counts.wrong_variant),
        ("misplaced component", stats.issue_counts.misplaced_component),
        ("responsive", stats.issue_counts.responsive),
        ("other", stats.issue_counts.other),
    ];
    issue_counts.retain(|(_, count)| *count > 0);
    issue_counts.sort_by(|a, b| b.1.cmp(&a.1));

    let top_issues = if issue_counts.is_empty() {
        "none flagged".to_string()
    } else {
        issue_counts
            .iter()
            .take(3)
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut layouts: Vec<(&String, &usize)> = stats.by_layout.iter().collect();
    layouts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let worst_layouts = layouts
        .iter()
        .take(3)
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} record(s), {} unfixed. Top issues: {}. Most reported layouts: {}.",
        stats.total, stats.unfixed, top_issues, worst_layouts
    )
}
