//! Per-rule suppression insight within one segment.
//!
//! A single-slot walk models the game's one-step Skip lookahead: an
//! active Skip arms a pending suppression that consumes exactly the next
//! rule. The walk also classifies every non-Skip rule as guaranteed,
//! reachable, or unreachable.

use serde::{Deserialize, Serialize};

use crate::paths::ConditionRequirement;
use crate::rules::{Rule, RuleKind};
use crate::segment::Segment;

/// Link from a suppressed rule back to the Skip that consumed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedBy {
    pub source_display_index: usize,
    /// True when the Skip's condition is vacuous — the suppression
    /// cannot be avoided and the suppressed rule's own condition is
    /// irrelevant.
    pub always: bool,
}

/// Link from an active Skip to the rule immediately following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressesNext {
    pub target_display_index: usize,
    pub always: bool,
}

/// Derived annotations for one rule within a segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInsight {
    /// 1-based human-facing index (source position + 1).
    pub display_index: usize,
    pub kind: RuleKind,
    pub condition: String,
    pub action: String,
    /// True iff the condition text is "None".
    pub always_true: bool,
    pub suppressed_by: Option<SuppressedBy>,
    /// Set only on an active (non-suppressed) Skip with a following rule.
    pub suppresses_next: Option<SuppressesNext>,
    /// Primary precondition path. Filled by the pipeline for non-Skip
    /// rules; empty list means the action fires unconditionally.
    pub requirements: Option<Vec<ConditionRequirement>>,
    /// Alternate precondition paths, primary excluded.
    pub requirement_paths: Option<Vec<Vec<ConditionRequirement>>>,
}

impl RuleInsight {
    fn from_rule(rule: &Rule) -> Self {
        Self {
            display_index: rule.display_index(),
            kind: rule.kind(),
            condition: rule.condition.clone(),
            action: rule.action.clone(),
            always_true: rule.is_always_true(),
            suppressed_by: None,
            suppresses_next: None,
            requirements: None,
            requirement_paths: None,
        }
    }
}

/// Reachability class of a non-Skip rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reachability {
    /// Fires unconditionally: never suppressed, vacuous condition.
    Guaranteed,
    /// Fires under some non-trivial assignment.
    Reachable,
    /// Always consumed by an unconditional Skip — can never fire.
    Unreachable,
}

/// Aggregate insight over one segment. The three partitions are
/// disjoint and together cover every non-Skip rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentInsight {
    pub insights: Vec<RuleInsight>,
    /// Display indices of actions that always fire.
    pub guaranteed: Vec<usize>,
    pub reachable: Vec<usize>,
    /// Display indices of actions permanently consumed by an
    /// unconditional Skip.
    pub unreachable: Vec<usize>,
    pub terminated: bool,
}

/// Classify one non-Skip rule from its walk annotations.
pub fn classify(insight: &RuleInsight) -> Reachability {
    match insight.suppressed_by {
        Some(mark) if mark.always => Reachability::Unreachable,
        Some(_) => Reachability::Reachable,
        None if insight.always_true => Reachability::Guaranteed,
        None => Reachability::Reachable,
    }
}

/// Walk one segment top-to-bottom with a single pending-suppression slot.
///
/// A suppressed rule clears the slot without re-arming it, so two Skips
/// in a row chain correctly: the second, being suppressed, cannot itself
/// suppress anything further. A Skip at the very end of a segment
/// suppresses nothing — that is a defined outcome, not an error.
pub fn build_segment_insight(segment: &Segment) -> SegmentInsight {
    let mut insights: Vec<RuleInsight> = Vec::with_capacity(segment.rules.len());
    let mut pending: Option<SuppressedBy> = None;

    for (i, rule) in segment.rules.iter().enumerate() {
        let mut insight = RuleInsight::from_rule(rule);
        if let Some(mark) = pending.take() {
            insight.suppressed_by = Some(mark);
        } else if insight.kind == RuleKind::Skip {
            let always = insight.always_true;
            if let Some(next) = segment.rules.get(i + 1) {
                insight.suppresses_next = Some(SuppressesNext {
                    target_display_index: next.display_index(),
                    always,
                });
            }
            pending = Some(SuppressedBy {
                source_display_index: insight.display_index,
                always,
            });
        }
        insights.push(insight);
    }

    let mut guaranteed = Vec::new();
    let mut reachable = Vec::new();
    let mut unreachable = Vec::new();
    for insight in &insights {
        if insight.kind != RuleKind::Action {
            continue;
        }
        match classify(insight) {
            Reachability::Guaranteed => guaranteed.push(insight.display_index),
            Reachability::Reachable => reachable.push(insight.display_index),
            Reachability::Unreachable => unreachable.push(insight.display_index),
        }
    }

    SegmentInsight {
        insights,
        guaranteed,
        reachable,
        unreachable,
        terminated: segment.terminated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(entries: &[(&str, &str)]) -> Segment {
        let rules: Vec<Rule> = entries
            .iter()
            .enumerate()
            .map(|(i, (c, a))| Rule::new(i, c, a))
            .collect();
        let terminated = rules
            .last()
            .map(|r| r.kind() == RuleKind::Action)
            .unwrap_or(false);
        Segment { rules, terminated }
    }

    #[test]
    fn test_unconditional_skip_suppresses_next() {
        let si = build_segment_insight(&segment(&[
            ("None", "Skip next rule"),
            ("None", "Fire weapon"),
        ]));
        let skip = &si.insights[0];
        assert_eq!(skip.suppresses_next.unwrap().target_display_index, 2);
        assert!(skip.suppresses_next.unwrap().always);
        let fire = &si.insights[1];
        assert_eq!(fire.suppressed_by.unwrap().source_display_index, 1);
        assert!(fire.suppressed_by.unwrap().always);
        assert_eq!(si.unreachable, [2]);
        assert!(si.guaranteed.is_empty());
    }

    #[test]
    fn test_conditional_skip_leaves_action_reachable() {
        let si = build_segment_insight(&segment(&[
            ("EnemyVisible", "Skip next rule"),
            ("None", "Retreat"),
        ]));
        let retreat = &si.insights[1];
        let mark = retreat.suppressed_by.unwrap();
        assert!(!mark.always);
        assert_eq!(si.reachable, [2]);
        assert!(si.unreachable.is_empty());
    }

    #[test]
    fn test_skip_chain_disarms_suppressed_skip() {
        // Scenario: [(None, Skip), (HpBelow50, Skip), (None, Fire)].
        // Rule 1 suppresses rule 2; rule 2 never fires as a Skip, so
        // rule 3 keeps no suppression and is guaranteed.
        let si = build_segment_insight(&segment(&[
            ("None", "Skip next rule"),
            ("HpBelow50", "Skip next rule"),
            ("None", "Fire weapon"),
        ]));
        let second_skip = &si.insights[1];
        assert!(second_skip.suppressed_by.unwrap().always);
        assert!(second_skip.suppresses_next.is_none());
        let fire = &si.insights[2];
        assert!(fire.suppressed_by.is_none());
        assert_eq!(si.guaranteed, [3]);
    }

    #[test]
    fn test_trailing_skip_suppresses_nothing() {
        let si = build_segment_insight(&segment(&[
            ("None", "Fire weapon"),
            ("None", "Skip next rule"),
        ]));
        // Segment split happens upstream; here the Skip simply has no
        // follower within the slice it was given.
        let si2 = build_segment_insight(&Segment {
            rules: vec![Rule::new(0, "None", "Skip next rule")],
            terminated: false,
        });
        assert!(si2.insights[0].suppresses_next.is_none());
        assert!(si.insights[0].suppressed_by.is_none());
    }

    #[test]
    fn test_skip_only_segment_has_empty_partitions() {
        let si = build_segment_insight(&segment(&[
            ("None", "Skip next rule"),
            ("HullBreach", "Skip next rule"),
        ]));
        assert!(si.guaranteed.is_empty());
        assert!(si.reachable.is_empty());
        assert!(si.unreachable.is_empty());
        assert_eq!(si.insights.len(), 2);
    }

    #[test]
    fn test_suppressed_by_references_earlier_skip() {
        let si = build_segment_insight(&segment(&[
            ("LowAmmo", "Skip next rule"),
            ("None", "Reload launcher"),
        ]));
        for insight in &si.insights {
            if let Some(mark) = insight.suppressed_by {
                assert!(mark.source_display_index < insight.display_index);
                let source = si
                    .insights
                    .iter()
                    .find(|r| r.display_index == mark.source_display_index)
                    .unwrap();
                assert_eq!(
                    source.suppresses_next.unwrap().target_display_index,
                    insight.display_index
                );
            }
        }
    }
}
