//! Subsystem inference — routes each rule into the independent bucket the
//! game evaluates it under.
//!
//! Rules in different subsystems are evaluated independently by the game,
//! so analysis must never cross bucket boundaries: without bucketing, an
//! ammo-subsystem Skip could appear to suppress a power-subsystem action
//! that it can never actually touch.

use serde::{Deserialize, Serialize};

use crate::rules::Rule;

/// An independently-evaluated category of crew rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    /// Special power activation.
    Special,
    /// Target selection and job continuation.
    Target,
    /// Item handling and ammunition.
    Ammo,
    /// System power levels.
    Power,
    /// No keyword match and no usable hint.
    Unknown,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subsystem::Special => "special",
            Subsystem::Target => "target",
            Subsystem::Ammo => "ammo",
            Subsystem::Power => "power",
            Subsystem::Unknown => "unknown",
        }
    }

    /// Parse an explicit phase tag from the export. Unrecognized tags
    /// land in the unknown bucket rather than minting a new one.
    pub fn from_hint(hint: &str) -> Option<Subsystem> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "special" => Some(Subsystem::Special),
            "target" | "targeting" => Some(Subsystem::Target),
            "ammo" | "item" | "items" => Some(Subsystem::Ammo),
            "power" => Some(Subsystem::Power),
            _ => None,
        }
    }

    pub fn all() -> &'static [Subsystem] {
        &[
            Subsystem::Special,
            Subsystem::Target,
            Subsystem::Ammo,
            Subsystem::Power,
            Subsystem::Unknown,
        ]
    }
}

/// Ordered keyword predicates over action text. First match wins, so
/// "special power" routes to Special before the power predicate sees it.
fn infer_from_action(action: &str) -> Option<Subsystem> {
    let text = action.to_ascii_lowercase();
    if text.contains("special power") || text.contains("use special") {
        Some(Subsystem::Special)
    } else if text.contains("target") || text.contains("continue current job") {
        Some(Subsystem::Target)
    } else if text.contains("item") || text.contains("ammo") || text.contains("reload") {
        Some(Subsystem::Ammo)
    } else if text.contains("power") {
        Some(Subsystem::Power)
    } else {
        None
    }
}

/// Infer one rule's subsystem: action keywords first, then the explicit
/// hint, then unknown.
pub fn subsystem_of(rule: &Rule) -> Subsystem {
    infer_from_action(&rule.action)
        .or_else(|| rule.subsystem_hint.as_deref().and_then(Subsystem::from_hint))
        .unwrap_or(Subsystem::Unknown)
}

/// One subsystem's ordered slice of the full rule sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub subsystem: Subsystem,
    pub rules: Vec<Rule>,
}

/// Partition a rule sequence by inferred subsystem. Buckets appear in
/// first-appearance order; rule order inside each bucket is preserved.
/// The partition is exhaustive and disjoint — every rule lands in
/// exactly one bucket.
pub fn bucketize(rules: Vec<Rule>) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for rule in rules {
        let tag = subsystem_of(&rule);
        match buckets.iter_mut().find(|b| b.subsystem == tag) {
            Some(bucket) => bucket.rules.push(rule),
            None => buckets.push(Bucket {
                subsystem: tag,
                rules: vec![rule],
            }),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(position: usize, action: &str) -> Rule {
        Rule::new(position, "None", action)
    }

    fn rule_with_hint(position: usize, action: &str, hint: &str) -> Rule {
        let mut r = Rule::new(position, "None", action);
        r.subsystem_hint = Some(hint.to_string());
        r
    }

    #[test]
    fn test_special_power_beats_power() {
        // "special power" contains "power"; predicate order decides.
        assert_eq!(
            subsystem_of(&rule(0, "Use special power")),
            Subsystem::Special
        );
        assert_eq!(
            subsystem_of(&rule(0, "Set power to maximum")),
            Subsystem::Power
        );
    }

    #[test]
    fn test_target_keywords() {
        assert_eq!(
            subsystem_of(&rule(0, "Target nearest enemy")),
            Subsystem::Target
        );
        assert_eq!(
            subsystem_of(&rule(0, "Continue current job")),
            Subsystem::Target
        );
    }

    #[test]
    fn test_ammo_keywords() {
        assert_eq!(subsystem_of(&rule(0, "Fetch item from storage")), Subsystem::Ammo);
        assert_eq!(subsystem_of(&rule(0, "Reload launcher")), Subsystem::Ammo);
    }

    #[test]
    fn test_hint_fallback() {
        assert_eq!(
            subsystem_of(&rule_with_hint(0, "Skip next rule", "power")),
            Subsystem::Power
        );
        assert_eq!(
            subsystem_of(&rule_with_hint(0, "Skip next rule", "Targeting")),
            Subsystem::Target
        );
        // Unrecognized hint falls through to unknown.
        assert_eq!(
            subsystem_of(&rule_with_hint(0, "Skip next rule", "morale")),
            Subsystem::Unknown
        );
        assert_eq!(subsystem_of(&rule(0, "Skip next rule")), Subsystem::Unknown);
    }

    #[test]
    fn test_bucketize_partitions_exhaustively() {
        let rules = vec![
            rule(0, "Set power to maximum"),
            rule_with_hint(1, "Skip next rule", "power"),
            rule(2, "Target nearest enemy"),
            rule(3, "Set power to half"),
        ];
        let buckets = bucketize(rules);
        assert_eq!(buckets.len(), 2);
        // First-appearance order.
        assert_eq!(buckets[0].subsystem, Subsystem::Power);
        assert_eq!(buckets[1].subsystem, Subsystem::Target);
        // Original order preserved inside a bucket.
        let positions: Vec<usize> = buckets[0].rules.iter().map(|r| r.position).collect();
        assert_eq!(positions, [0, 1, 3]);
        let total: usize = buckets.iter().map(|b| b.rules.len()).sum();
        assert_eq!(total, 4);
    }
}
