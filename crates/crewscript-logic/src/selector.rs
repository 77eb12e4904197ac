//! Primary path selection among deduplicated requirement paths.
//!
//! When several assignments reach the same action, one is promoted as the
//! representative explanation and the rest kept as alternates. Paths
//! needing fewer Skip activations and more explicit Skip negations read
//! as better explanations of why the action fires, so they score first.

use crate::insight::RuleInsight;
use crate::paths::ConditionRequirement;
use crate::rules::RuleKind;

/// One primary path plus the demoted rest, in stable order.
#[derive(Debug, Clone, Default)]
pub struct PathSelection {
    pub primary: Option<Vec<ConditionRequirement>>,
    pub alternates: Vec<Vec<ConditionRequirement>>,
}

/// Tie-break score: (Skip-true count ascending, Skip-false count
/// descending, path length ascending). Lexicographic minimum wins.
fn score(path: &[ConditionRequirement], insights: &[RuleInsight]) -> (usize, i64, usize) {
    let mut skip_true = 0usize;
    let mut skip_false = 0usize;
    for req in path {
        let is_skip = insights
            .iter()
            .find(|r| r.display_index == req.source_display_index)
            .map(|r| r.kind == RuleKind::Skip)
            .unwrap_or(false);
        if is_skip {
            if req.expects {
                skip_true += 1;
            } else {
                skip_false += 1;
            }
        }
    }
    (skip_true, -(skip_false as i64), path.len())
}

/// Choose the primary path. The first path with the best score wins;
/// everything else — tied or worse — is demoted to alternates without
/// reordering.
pub fn select_primary(
    paths: Vec<Vec<ConditionRequirement>>,
    insights: &[RuleInsight],
) -> PathSelection {
    if paths.is_empty() {
        return PathSelection::default();
    }

    let best = paths
        .iter()
        .enumerate()
        .min_by_key(|(i, path)| (score(path, insights), *i))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut primary = None;
    let mut alternates = Vec::with_capacity(paths.len() - 1);
    for (i, path) in paths.into_iter().enumerate() {
        if i == best {
            primary = Some(path);
        } else {
            alternates.push(path);
        }
    }

    PathSelection {
        primary,
        alternates,
    }
}
