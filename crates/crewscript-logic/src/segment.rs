//! Segmentation — splits one bucket's ordered rules at each terminating
//! action.
//!
//! Every action's firing condition is only meaningful relative to the
//! rules since the previous action fired, so each segment runs from just
//! after one terminating (non-Skip) action up to and including the next.
//! This keeps precondition computation local and bounded instead of
//! spanning the whole bucket.

use serde::{Deserialize, Serialize};

use crate::rules::{Rule, RuleKind};

/// A run of rules ending at (and including) one terminating action. The
/// final segment of a bucket may be open: trailing Skips with no action
/// to terminate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub rules: Vec<Rule>,
    /// False only for a trailing Skip-only suffix.
    pub terminated: bool,
}

/// Forward scan: accumulate rules, close a segment at each non-Skip
/// action. Concatenating the output reconstructs the input exactly — no
/// rule is dropped, duplicated, or reordered.
pub fn segment_rules(rules: Vec<Rule>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut buffer: Vec<Rule> = Vec::new();
    for rule in rules {
        let kind = rule.kind();
        buffer.push(rule);
        if kind == RuleKind::Action {
            segments.push(Segment {
                rules: std::mem::take(&mut buffer),
                terminated: true,
            });
        }
    }
    if !buffer.is_empty() {
        segments.push(Segment {
            rules: buffer,
            terminated: false,
        });
    }
    segments
}
