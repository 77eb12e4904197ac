//! Requirement path enumeration — bounded depth-first search over the
//! boolean outcomes of preceding rules' conditions.
//!
//! For a target action inside one segment, every internally-consistent
//! assignment of true/false to earlier conditions under which the target
//! is the rule that ends up firing becomes one requirement path. The
//! search carries a request-scoped memo of visited `(index, suppression,
//! assignment)` states, so long Skip chains over repeated condition text
//! cannot blow up exponentially.

use std::collections::{BTreeMap, HashSet};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::insight::RuleInsight;
use crate::rules::RuleKind;

/// "The rule at `source_display_index` must evaluate its condition to
/// `expects` for this path to hold."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRequirement {
    pub condition: String,
    pub expects: bool,
    pub source_display_index: usize,
}

/// Assignment of condition text → (expected outcome, display index of
/// the rule that introduced the constraint).
type Assignment = BTreeMap<String, (bool, usize)>;

/// Canonical signature: sorted `condition|expects` pairs. Two paths that
/// differ only in source ordering share a signature.
fn signature(assignment: &Assignment) -> String {
    // BTreeMap iteration is already sorted by condition text.
    let mut sig = String::new();
    for (condition, (expects, _)) in assignment {
        sig.push_str(condition);
        sig.push(if *expects { '+' } else { '-' });
        sig.push(';');
    }
    sig
}

/// Add a constraint, or return `None` on contradiction — the same
/// condition cannot be required both true and false on one path. A
/// repeated identical constraint keeps its original source.
fn constrain(assignment: &Assignment, insight: &RuleInsight, expects: bool) -> Option<Assignment> {
    let key = insight.condition.trim().to_string();
    if let Some(&(existing, _)) = assignment.get(&key) {
        if existing != expects {
            return None;
        }
        return Some(assignment.clone());
    }
    let mut extended = assignment.clone();
    extended.insert(key, (expects, insight.display_index));
    Some(extended)
}

struct Search<'a> {
    insights: &'a [RuleInsight],
    target: usize,
    visited: HashSet<(usize, bool, String)>,
    found: Vec<Assignment>,
}

impl Search<'_> {
    fn dfs(&mut self, index: usize, must_skip: bool, assignment: &Assignment) {
        if index >= self.insights.len() {
            return;
        }
        if !self
            .visited
            .insert((index, must_skip, signature(assignment)))
        {
            return;
        }

        let insight = &self.insights[index];

        if must_skip {
            // The previous rule was an active Skip consuming this one.
            if index == self.target {
                // The target itself got suppressed — dead branch.
                return;
            }
            self.dfs(index + 1, false, assignment);
            return;
        }

        match insight.kind {
            RuleKind::Skip => {
                if insight.always_true {
                    // Vacuous Skip always fires; no constraint, no false branch.
                    self.dfs(index + 1, true, assignment);
                } else {
                    if let Some(with_true) = constrain(assignment, insight, true) {
                        self.dfs(index + 1, true, &with_true);
                    }
                    if let Some(with_false) = constrain(assignment, insight, false) {
                        self.dfs(index + 1, false, &with_false);
                    }
                }
            }
            RuleKind::Action => {
                if index == self.target {
                    if insight.always_true {
                        trace!("path to rule {} recorded", insight.display_index);
                        self.found.push(assignment.clone());
                    } else {
                        if let Some(with_true) = constrain(assignment, insight, true) {
                            trace!("path to rule {} recorded", insight.display_index);
                            self.found.push(with_true);
                        }
                        if let Some(with_false) = constrain(assignment, insight, false) {
                            self.dfs(index + 1, false, &with_false);
                        }
                    }
                } else {
                    // A different action firing first ends the evaluation
                    // pass; only the branch where its condition fails can
                    // continue toward the target.
                    if insight.always_true {
                        return;
                    }
                    if let Some(with_false) = constrain(assignment, insight, false) {
                        self.dfs(index + 1, false, &with_false);
                    }
                }
            }
        }
    }
}

/// Index just after the nearest terminating action strictly before
/// `target`, or 0. Constraints introduced before that point are not
/// locally meaningful and get trimmed.
fn local_start(insights: &[RuleInsight], target: usize) -> usize {
    insights[..target]
        .iter()
        .rposition(|r| r.kind == RuleKind::Action)
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn to_path(assignment: Assignment, min_display_index: usize) -> Vec<ConditionRequirement> {
    let mut path: Vec<ConditionRequirement> = assignment
        .into_iter()
        .filter(|(_, (_, source))| *source >= min_display_index)
        .map(|(condition, (expects, source_display_index))| ConditionRequirement {
            condition,
            expects,
            source_display_index,
        })
        .collect();
    path.sort_by_key(|req| req.source_display_index);
    path
}

fn path_signature(path: &[ConditionRequirement]) -> String {
    let mut pairs: Vec<(&str, bool)> = path
        .iter()
        .map(|req| (req.condition.as_str(), req.expects))
        .collect();
    pairs.sort();
    let mut sig = String::new();
    for (condition, expects) in pairs {
        sig.push_str(condition);
        sig.push(if expects { '+' } else { '-' });
        sig.push(';');
    }
    sig
}

/// Enumerate every requirement path under which the rule at `target`
/// (a non-Skip rule, 0-based within `insights`) is the one that fires.
///
/// Returns deduplicated paths, each ordered by source display index. An
/// empty path means the target fires with no preconditions at all; an
/// empty result means it can never fire.
pub fn enumerate_paths(
    insights: &[RuleInsight],
    target: usize,
) -> Vec<Vec<ConditionRequirement>> {
    let Some(target_insight) = insights.get(target) else {
        return Vec::new();
    };
    if target_insight.kind != RuleKind::Action {
        return Vec::new();
    }

    let mut search = Search {
        insights,
        target,
        visited: HashSet::new(),
        found: Vec::new(),
    };
    search.dfs(0, false, &Assignment::new());

    let start = local_start(insights, target);
    let min_display_index = insights[start].display_index;

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for assignment in search.found {
        let path = to_path(assignment, min_display_index);
        if seen.insert(path_signature(&path)) {
            paths.push(path);
        }
    }
    paths
}
