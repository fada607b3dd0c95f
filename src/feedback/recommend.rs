//! Fix recommendation - mines feedback records for ranked remediation
//! suggestions.
//!
//! Rules run in a fixed order (unsuitable space, better variant, low
//! quality, explicit issue flags, overflow fallback) and the result is
//! stable-sorted by confidence, so the first suggestion is always the
//! highest-confidence, earliest-rule one. The ordering is deliberate and
//! pinned by tests; `bulk_fix` depends on it.

use serde::Serialize;

use super::FeedbackRecord;
use crate::spaces::SpaceModel;

/// How certain a suggestion is to correct the observed issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn rank(&self) -> u8 {
        match self {
            Confidence::High => 0,
            Confidence::Medium => 1,
            Confidence::Low => 2,
        }
    }
}

/// A configuration-document edit the recommender proposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FixAction {
    /// Swap the component for one suited to the space.
    ReplaceComponent { with: String },
    /// Keep the component, switch to the variant that fits.
    ChangeVariant { to: String },
    /// Drop the component from the layout.
    RemoveComponent,
    /// No mechanical fix known; the slot needs rethinking.
    Redesign,
}

/// One ranked remediation suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub action: FixAction,
    pub confidence: Confidence,
    pub reason: String,
}

/// A fix descriptor produced by `bulk_fix`: the record it addresses and
/// its best suggestion. Applying it (and marking the record fixed) is the
/// caller's explicit action.
#[derive(Debug, Clone, Serialize)]
pub struct Fix {
    pub record_id: String,
    pub component_name: String,
    pub layout_name: String,
    pub space_name: String,
    pub suggestion: Suggestion,
}

/// Analyze one record against the space model. Suggestions come back in
/// descending confidence; a single record can surface several.
pub fn analyze(record: &FeedbackRecord, model: &SpaceModel) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let component = record.component_name.as_str();
    let space = record.space_type;

    // Rule 1: the component is on the space's deny-list.
    if model.is_unsuitable(component, space) {
        if let Some(replacement) = model.preferred_component(space) {
            suggestions.push(Suggestion {
                action: FixAction::ReplaceComponent {
                    with: replacement.to_string(),
                },
                confidence: Confidence::High,
                reason: format!("{} is unsuitable for {} spaces", component, space),
            });
        }
    }

    // Rule 2: a better variant exists for this space.
    let best_variant = model.best_variant(component, space);
    if best_variant != "default" {
        suggestions.push(Suggestion {
            action: FixAction::ChangeVariant {
                to: best_variant.to_string(),
            },
            confidence: Confidence::High,
            reason: format!(
                "variant '{}' is preferred for {} in {} spaces",
                best_variant, component, space
            ),
        });
    }

    // Rule 3: the observer rated the result poor.
    if matches!(record.quality_rating, Some(rating) if rating <= 2) {
        suggestions.push(Suggestion {
            action: FixAction::Redesign,
            confidence: Confidence::Medium,
            reason: format!(
                "quality rated {}/5",
                record.quality_rating.unwrap_or_default()
            ),
        });
    }

    // Rule 4: explicit issue flags, one suggestion per flag. Exact
    // duplicates of earlier rules are skipped.
    if record.issues.wrong_variant {
        let action = FixAction::ChangeVariant {
            to: best_variant.to_string(),
        };
        if !suggestions.iter().any(|s| s.action == action) {
            suggestions.push(Suggestion {
                action,
                confidence: Confidence::High,
                reason: "observer flagged the wrong variant".to_string(),
            });
        }
    }
    if record.issues.misplaced_component {
        let action = match model.preferred_component(space) {
            Some(replacement) => FixAction::ReplaceComponent {
                with: replacement.to_string(),
            },
            None => FixAction::Redesign,
        };
        if !suggestions.iter().any(|s| s.action == action) {
            suggestions.push(Suggestion {
                action,
                confidence: Confidence::Medium,
                reason: "observer flagged the component as misplaced".to_string(),
            });
        }
    }
    if record.issues.responsive {
        suggestions.push(Suggestion {
            action: FixAction::Redesign,
            confidence: Confidence::Medium,
            reason: "layout breaks at small widths".to_string(),
        });
    }

    // Fallback: overflow with no better idea means the slot is simply
    // carrying too much.
    if record.has_overflow && suggestions.is_empty() {
        suggestions.push(Suggestion {
            action: FixAction::RemoveComponent,
            confidence: Confidence::Low,
            reason: "content overflows and no suited alternative is configured".to_string(),
        });
    }

    // Stable sort preserves rule order within a confidence level.
    suggestions.sort_by_key(|s| s.confidence.rank());
    suggestions
}

/// Produce one fix descriptor per unfixed record: its highest-confidence
/// suggestion. Records are not mutated; marking them fixed is a separate,
/// explicit caller action.
pub fn bulk_fix(records: &[FeedbackRecord], model: &SpaceModel) -> Vec<Fix> {
    records
        .iter()
        .filter(|r| !r.fixed)
        .filter_map(|record| {
            analyze(record, model).into_iter().next().map(|suggestion| Fix {
                record_id: record.id.clone(),
                component_name: record.component_name.clone(),
                layout_name: record.layout_name.clone(),
                space_name: record.space_name.clone(),
                suggestion,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::IssueFlags;
    use crate::spaces::SpaceType;
    use chrono::Utc;

    fn record(component: &str, space: SpaceType) -> FeedbackRecord {
        FeedbackRecord {
            id: format!("analyst-slot-{}-0", component),
            component_name: component.to_string(),
            component_type: None,
            layout_name: "analyst".to_string(),
            space_name: "slot".to_string(),
            space_type: space,
            timestamp: Utc::now(),
            fixed: false,
            has_overflow: false,
            quality_rating: None,
            notes: String::new(),
            issues: IssueFlags::default(),
        }
    }

    #[test]
    fn test_unsuitable_component_gets_replacement() {
        let model = SpaceModel::default();
        let rec = record("ComparisonTable", SpaceType::QuarterWidth);

        let suggestions = analyze(&rec, &model);
        assert!(matches!(
            &suggestions[0].action,
            FixAction::ReplaceComponent { with } if with == "StatGroup"
        ));
        assert_eq!(suggestions[0].confidence, Confidence::High);
    }

    #[test]
    fn test_non_default_best_variant_suggested() {
        let model = SpaceModel::default();
        let rec = record("StatGroup", SpaceType::QuarterWidth);

        let suggestions = analyze(&rec, &model);
        assert!(suggestions.iter().any(|s| matches!(
            &s.action,
            FixAction::ChangeVariant { to } if to == "compact"
        )));
    }

    #[test]
    fn test_low_quality_suggests_redesign() {
        let model = SpaceModel::default();
        let mut rec = record("SummaryConclusion", SpaceType::FullWidth);
        rec.quality_rating = Some(2);

        let suggestions = analyze(&rec, &model);
        assert!(suggestions
            .iter()
            .any(|s| s.action == FixAction::Redesign && s.confidence == Confidence::Medium));
    }

    #[test]
    fn test_quality_three_is_not_flagged() {
        let model = SpaceModel::default();
        let mut rec = record("SummaryConclusion", SpaceType::FullWidth);
        rec.quality_rating = Some(3);

        let suggestions = analyze(&rec, &model);
        assert!(suggestions.iter().all(|s| s.action != FixAction::Redesign));
    }

    #[test]
    fn test_issue_flags_each_surface_a_suggestion() {
        let model = SpaceModel::default();
        let mut rec = record("ComparisonTable", SpaceType::QuarterWidth);
        rec.issues = IssueFlags {
            wrong_variant: true,
            misplaced_component: true,
            responsive: true,
            ..IssueFlags::default()
        };

        let suggestions = analyze(&rec, &model);
        // Replace (rule 1) + variant (wrong_variant flag; rule 2 was
        // default so no duplicate) + redesign (responsive). The misplaced
        // flag duplicates rule 1's replacement and is skipped.
        assert!(suggestions
            .iter()
            .any(|s| matches!(s.action, FixAction::ReplaceComponent { .. })));
        assert!(suggestions
            .iter()
            .any(|s| matches!(s.action, FixAction::ChangeVariant { .. })));
        assert!(suggestions.iter().any(|s| s.action == FixAction::Redesign));
    }

    #[test]
    fn test_duplicate_flag_action_collapses_to_one_suggestion() {
        let model = SpaceModel::default();
        let mut rec = record("ComparisonTable", SpaceType::QuarterWidth);
        // The misplaced flag proposes the same replacement the deny-list
        // rule already emitted; one actionable edit, one suggestion.
        rec.issues.misplaced_component = true;

        let suggestions = analyze(&rec, &model);
        let replacements = suggestions
            .iter()
            .filter(|s| matches!(s.action, FixAction::ReplaceComponent { .. }))
            .count();
        assert_eq!(replacements, 1);
    }

    #[test]
    fn test_suggestions_sorted_by_confidence() {
        let model = SpaceModel::default();
        let mut rec = record("ComparisonTable", SpaceType::QuarterWidth);
        rec.quality_rating = Some(1);
        rec.issues.responsive = true;

        let suggestions = analyze(&rec, &model);
        let ranks: Vec<u8> = suggestions.iter().map(|s| s.confidence.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
        assert_eq!(suggestions[0].confidence, Confidence::High);
    }

    #[test]
    fn test_overflow_fallback_suggests_removal() {
        let model = SpaceModel::default();
        let mut rec = record("SummaryConclusion", SpaceType::FullWidth);
        rec.has_overflow = true;

        let suggestions = analyze(&rec, &model);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].action, FixAction::RemoveComponent);
        assert_eq!(suggestions[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_clean_record_yields_no_suggestions() {
        let model = SpaceModel::default();
        let rec = record("SummaryConclusion", SpaceType::FullWidth);
        assert!(analyze(&rec, &model).is_empty());
    }

    #[test]
    fn test_bulk_fix_skips_fixed_records() {
        let model = SpaceModel::default();
        let mut open = record("ComparisonTable", SpaceType::QuarterWidth);
        open.id = "open".to_string();
        let mut closed = record("StatGroup", SpaceType::QuarterWidth);
        closed.id = "closed".to_string();
        closed.fixed = true;

        let fixes = bulk_fix(&[open, closed], &model);
        assert_eq!(fixes.len(), 1);
        assert_eq!(fixes[0].record_id, "open");
    }

    #[test]
    fn test_bulk_fix_takes_highest_confidence_suggestion() {
        let model = SpaceModel::default();
        let mut rec = record("ComparisonTable", SpaceType::QuarterWidth);
        rec.quality_rating = Some(1);

        let fixes = bulk_fix(&[rec], &model);
        // Rule 1 (high) outranks the quality redesign (medium)
        assert!(matches!(
            &fixes[0].suggestion.action,
            FixAction::ReplaceComponent { .. }
        ));
    }

    #[test]
    fn test_bulk_fix_does_not_mutate_records() {
        let model = SpaceModel::default();
        let rec = record("ComparisonTable", SpaceType::QuarterWidth);
        let records = vec![rec];
        let _ = bulk_fix(&records, &model);
        assert!(!records[0].fixed);
    }
}
