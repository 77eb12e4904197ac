//! Full analysis pipeline over one exported crew script.
//!
//! normalize → bucketize → segment → suppression insight → requirement
//! paths → primary selection. Pure: the same input always produces the
//! same report, nothing is retained across calls, and the caller keeps
//! ownership of the raw records.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnalysisError;
use crate::insight::{self, SegmentInsight};
use crate::paths;
use crate::rules::{self, Rule, RuleKind};
use crate::segment;
use crate::selector;
use crate::subsystem::{self, Subsystem};

/// All segment insights for one subsystem bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketInsight {
    pub subsystem: Subsystem,
    pub segments: Vec<SegmentInsight>,
}

/// The full analysis of one crew script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub buckets: Vec<BucketInsight>,
}

/// Analyze a raw JSON export. The only failure is a non-sequence input;
/// malformed records inside a sequence degrade per [`rules::normalize`].
pub fn analyze(raw: &Value) -> Result<AnalysisReport, AnalysisError> {
    Ok(analyze_rules(rules::normalize(raw)?))
}

/// Analyze an already-normalized rule sequence.
pub fn analyze_rules(rules: Vec<Rule>) -> AnalysisReport {
    let buckets = subsystem::bucketize(rules);
    debug!("analyzing {} subsystem bucket(s)", buckets.len());

    let mut report = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let segments = segment::segment_rules(bucket.rules);
        let mut insights = Vec::with_capacity(segments.len());
        for seg in &segments {
            let mut seg_insight = insight::build_segment_insight(seg);
            attach_requirements(&mut seg_insight);
            insights.push(seg_insight);
        }
        debug!(
            "bucket {}: {} segment(s)",
            bucket.subsystem.as_str(),
            insights.len()
        );
        report.push(BucketInsight {
            subsystem: bucket.subsystem,
            segments: insights,
        });
    }
    AnalysisReport { buckets: report }
}

/// Enumerate and select requirement paths for every non-Skip rule in one
/// segment, attaching the primary to `requirements` and the rest to
/// `requirement_paths`.
fn attach_requirements(seg: &mut SegmentInsight) {
    let targets: Vec<usize> = seg
        .insights
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind == RuleKind::Action)
        .map(|(i, _)| i)
        .collect();

    for target in targets {
        let found = paths::enumerate_paths(&seg.insights, target);
        let selection = selector::select_primary(found, &seg.insights);
        let insight = &mut seg.insights[target];
        insight.requirements = selection.primary;
        insight.requirement_paths = if selection.alternates.is_empty() {
            None
        } else {
            Some(selection.alternates)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_script() -> Value {
        json!([
            {"index": 0, "condition": "None", "action": "Set power to maximum", "phase": "power"},
            {"index": 1, "condition": "EnemyVisible", "action": "Skip next rule", "phase": "target"},
            {"index": 2, "condition": "None", "action": "Continue current job", "phase": "target"},
            {"index": 3, "condition": "None", "action": "Target nearest enemy", "phase": "target"},
            {"index": 4, "condition": "LowAmmo", "action": "Reload launcher", "phase": "ammo"},
        ])
    }

    #[test]
    fn test_rejects_non_sequence() {
        assert!(analyze(&json!("not a script")).is_err());
        assert!(analyze(&json!([])).is_ok());
    }

    #[test]
    fn test_buckets_are_independent() {
        let report = analyze(&sample_script()).unwrap();
        let tags: Vec<Subsystem> = report.buckets.iter().map(|b| b.subsystem).collect();
        assert_eq!(tags, [Subsystem::Power, Subsystem::Target, Subsystem::Ammo]);
        // The power action sits alone in its bucket — the target-bucket
        // Skip cannot touch it.
        let power = &report.buckets[0].segments[0];
        assert_eq!(power.guaranteed.len(), 1);
        assert!(power.insights[0].suppressed_by.is_none());
    }

    #[test]
    fn test_requirements_attached_to_actions() {
        let report = analyze(&sample_script()).unwrap();
        let target_bucket = &report.buckets[1];
        // Segment 1: [Skip(EnemyVisible), Continue current job].
        let continue_job = &target_bucket.segments[0].insights[1];
        let primary = continue_job.requirements.as_ref().unwrap();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].condition, "EnemyVisible");
        assert!(!primary[0].expects);
        // Skips carry no requirements of their own.
        assert!(target_bucket.segments[0].insights[0].requirements.is_none());
    }

    #[test]
    fn test_display_indices_survive_bucketing() {
        let report = analyze(&sample_script()).unwrap();
        let ammo = &report.buckets[2].segments[0].insights[0];
        assert_eq!(ammo.display_index, 5);
        let primary = ammo.requirements.as_ref().unwrap();
        assert_eq!(primary[0].source_display_index, 5);
        assert_eq!(primary[0].condition, "LowAmmo");
        assert!(primary[0].expects);
    }

    #[test]
    fn test_idempotent() {
        let raw = sample_script();
        let a = serde_json::to_string(&analyze(&raw).unwrap()).unwrap();
        let b = serde_json::to_string(&analyze(&raw).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_skip_only_script_has_no_action_partitions() {
        let report = analyze(&json!([
            {"condition": "None", "action": "Skip next rule", "phase": "power"},
            {"condition": "HullBreach", "action": "Skip next rule", "phase": "power"},
        ]))
        .unwrap();
        let seg = &report.buckets[0].segments[0];
        assert!(!seg.terminated);
        assert!(seg.guaranteed.is_empty());
        assert!(seg.reachable.is_empty());
        assert!(seg.unreachable.is_empty());
    }

    #[test]
    fn test_alternate_paths_reported() {
        let report = analyze(&json!([
            {"condition": "HullBreach", "action": "Skip next rule", "phase": "power"},
            {"condition": "LowAmmo", "action": "Skip next rule", "phase": "power"},
            {"condition": "None", "action": "Set power to maximum"},
        ]))
        .unwrap();
        let fire = &report.buckets[0].segments[0].insights[2];
        assert!(fire.requirements.is_some());
        let alternates = fire.requirement_paths.as_ref().unwrap();
        assert_eq!(alternates.len(), 1);
    }
}
