//! CrewScript Headless Analysis Harness
//!
//! Validates the pure analysis engine against a bundled sample crew
//! script. Runs entirely in-process — no UI, no file import, no game.
//!
//! Usage:
//!   cargo run -p crewscript-simtest
//!   cargo run -p crewscript-simtest -- --verbose

use crewscript_logic::analysis::{analyze, AnalysisReport};
use crewscript_logic::insight::RuleInsight;
use crewscript_logic::rules::{self, RuleKind};
use crewscript_logic::segment;
use crewscript_logic::subsystem::{self, Subsystem};

// ── Sample script (a realistic four-subsystem crew export) ──────────────
const SAMPLE_JSON: &str = include_str!("../../../data/sample_rules.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== CrewScript Analysis Harness ===\n");

    let raw: serde_json::Value = match serde_json::from_str(SAMPLE_JSON) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("sample script is not valid JSON: {e}");
            std::process::exit(1);
        }
    };

    let report = match analyze(&raw) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("analysis failed: {e}");
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Normalization of the raw export
    results.extend(validate_normalization(&raw));

    // 2. Subsystem bucketing
    results.extend(validate_bucketing(&raw, &report));

    // 3. Segmentation reconstruction
    results.extend(validate_segmentation(&raw));

    // 4. Suppression insight
    results.extend(validate_suppression(&report));

    // 5. Requirement paths
    results.extend(validate_requirements(&report));

    // 6. Determinism
    results.extend(validate_determinism(&raw, &report));

    if verbose {
        print_summaries(&report);
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn all_insights(report: &AnalysisReport) -> impl Iterator<Item = &RuleInsight> {
    report
        .buckets
        .iter()
        .flat_map(|b| b.segments.iter())
        .flat_map(|s| s.insights.iter())
}

fn insight_by_display(report: &AnalysisReport, display_index: usize) -> Option<&RuleInsight> {
    all_insights(report).find(|r| r.display_index == display_index)
}

// ── 1. Normalization ────────────────────────────────────────────────────

fn validate_normalization(raw: &serde_json::Value) -> Vec<TestResult> {
    println!("--- Normalization ---");
    let mut results = Vec::new();

    let rules = match rules::normalize(raw) {
        Ok(r) => r,
        Err(e) => {
            results.push(check("normalize", false, format!("error: {e}")));
            return results;
        }
    };

    results.push(check(
        "normalize_count",
        rules.len() == 12,
        format!("{} rules normalized", rules.len()),
    ));

    let positions_sequential = rules.iter().enumerate().all(|(i, r)| r.position == i);
    results.push(check(
        "normalize_positions",
        positions_sequential,
        "positions are sequential from 0".into(),
    ));

    let no_empty_conditions = rules.iter().all(|r| !r.condition.is_empty());
    results.push(check(
        "normalize_conditions",
        no_empty_conditions,
        "every rule has condition text (missing → \"None\")".into(),
    ));

    results
}

// ── 2. Subsystem bucketing ──────────────────────────────────────────────

fn validate_bucketing(raw: &serde_json::Value, report: &AnalysisReport) -> Vec<TestResult> {
    println!("--- Subsystem Bucketing ---");
    let mut results = Vec::new();

    let tags: Vec<Subsystem> = report.buckets.iter().map(|b| b.subsystem).collect();
    results.push(check(
        "buckets_present",
        tags == [
            Subsystem::Power,
            Subsystem::Target,
            Subsystem::Ammo,
            Subsystem::Special,
        ],
        format!(
            "buckets in first-appearance order: {:?}",
            tags.iter().map(|t| t.as_str()).collect::<Vec<_>>()
        ),
    ));

    let rules = rules::normalize(raw).unwrap_or_default();
    let total_rules = rules.len();
    let bucketed: usize = subsystem::bucketize(rules).iter().map(|b| b.rules.len()).sum();
    results.push(check(
        "buckets_exhaustive",
        bucketed == total_rules,
        format!("{bucketed}/{total_rules} rules bucketed"),
    ));

    // Every inferable tag routes at least one sample rule somewhere, so
    // each bucket must carry a known closed-enum tag.
    let known_tags = report
        .buckets
        .iter()
        .all(|b| Subsystem::all().contains(&b.subsystem));
    results.push(check(
        "buckets_known_tags",
        known_tags,
        format!(
            "all bucket tags drawn from the {} known subsystems",
            Subsystem::all().len()
        ),
    ));

    results
}

// ── 3. Segmentation ─────────────────────────────────────────────────────

fn validate_segmentation(raw: &serde_json::Value) -> Vec<TestResult> {
    println!("--- Segmentation ---");
    let mut results = Vec::new();

    let rules = rules::normalize(raw).unwrap_or_default();
    let mut reconstruction_ok = true;
    let mut open_segments = 0usize;
    for bucket in subsystem::bucketize(rules) {
        let original = bucket.rules.clone();
        let segments = segment::segment_rules(bucket.rules);
        open_segments += segments.iter().filter(|s| !s.terminated).count();
        let rebuilt: Vec<_> = segments.into_iter().flat_map(|s| s.rules).collect();
        if rebuilt != original {
            reconstruction_ok = false;
        }
    }

    results.push(check(
        "segments_reconstruct",
        reconstruction_ok,
        "concatenated segments reproduce each bucket exactly".into(),
    ));
    results.push(check(
        "segments_open_trailing",
        open_segments == 1,
        format!("{open_segments} open segment (the trailing special Skip)"),
    ));

    results
}

// ── 4. Suppression insight ──────────────────────────────────────────────

fn validate_suppression(report: &AnalysisReport) -> Vec<TestResult> {
    println!("--- Suppression Insight ---");
    let mut results = Vec::new();

    // Every suppressed_by must point back at an earlier Skip whose
    // suppresses_next is exactly this rule.
    let mut links_consistent = true;
    for bucket in &report.buckets {
        for seg in &bucket.segments {
            for insight in &seg.insights {
                if let Some(mark) = insight.suppressed_by {
                    let source = seg
                        .insights
                        .iter()
                        .find(|r| r.display_index == mark.source_display_index);
                    let ok = source.is_some_and(|s| {
                        s.kind == RuleKind::Skip
                            && s.display_index < insight.display_index
                            && s.suppresses_next
                                .is_some_and(|n| n.target_display_index == insight.display_index)
                    });
                    if !ok {
                        links_consistent = false;
                    }
                }
            }
        }
    }
    results.push(check(
        "suppression_links_consistent",
        links_consistent,
        "suppressed_by and suppresses_next agree pairwise".into(),
    ));

    // Rule 7 ("Fetch item from storage") sits behind a vacuous Skip that
    // consumes the conditional one — guaranteed.
    let fetch = insight_by_display(report, 7);
    results.push(check(
        "skip_chain_guarantees_fetch",
        fetch.is_some_and(|r| r.suppressed_by.is_none() && r.always_true),
        "vacuous Skip disarms the conditional Skip behind it".into(),
    ));

    // Rule 12, the trailing special-phase Skip, suppresses nothing.
    let trailing = insight_by_display(report, 12);
    results.push(check(
        "trailing_skip_harmless",
        trailing.is_some_and(|r| r.suppresses_next.is_none()),
        "trailing Skip reports no suppression target".into(),
    ));

    // Partitions are disjoint and cover every action.
    let mut partitions_ok = true;
    for bucket in &report.buckets {
        for seg in &bucket.segments {
            let actions = seg
                .insights
                .iter()
                .filter(|r| r.kind == RuleKind::Action)
                .count();
            let partitioned = seg.guaranteed.len() + seg.reachable.len() + seg.unreachable.len();
            if actions != partitioned {
                partitions_ok = false;
            }
        }
    }
    results.push(check(
        "partitions_cover_actions",
        partitions_ok,
        "guaranteed/reachable/unreachable partition every action".into(),
    ));

    results
}

// ── 5. Requirement paths ────────────────────────────────────────────────

fn validate_requirements(report: &AnalysisReport) -> Vec<TestResult> {
    println!("--- Requirement Paths ---");
    let mut results = Vec::new();

    // "Continue current job" fires only when the targeting Skip stands
    // down.
    let continue_job = insight_by_display(report, 3);
    let continue_ok = continue_job
        .and_then(|r| r.requirements.as_ref())
        .is_some_and(|path| {
            path.len() == 1
                && path[0].condition == "EnemyInRange"
                && !path[0].expects
                && path[0].source_display_index == 2
        });
    results.push(check(
        "requirement_negates_skip",
        continue_ok,
        "IF EnemyInRange=false THEN Continue current job".into(),
    ));

    // "Set power to half" has two doors: HullBreach fires the first
    // Skip, or both Skips stand down. Primary is the all-negation path.
    let power_half = insight_by_display(report, 10);
    let primary_ok = power_half
        .and_then(|r| r.requirements.as_ref())
        .is_some_and(|path| path.len() == 2 && path.iter().all(|req| !req.expects));
    let alternate_ok = power_half
        .and_then(|r| r.requirement_paths.as_ref())
        .is_some_and(|alts| alts.len() == 1 && alts[0].len() == 1 && alts[0][0].expects);
    results.push(check(
        "primary_prefers_negations",
        primary_ok,
        "primary path negates both power Skips".into(),
    ));
    results.push(check(
        "alternate_path_retained",
        alternate_ok,
        "HullBreach activation kept as alternate".into(),
    ));

    // An action's own non-vacuous condition appears as a true requirement.
    let special = insight_by_display(report, 11);
    let own_condition_ok = special
        .and_then(|r| r.requirements.as_ref())
        .is_some_and(|path| {
            path.len() == 1 && path[0].condition == "EnemyShieldsUp" && path[0].expects
        });
    results.push(check(
        "own_condition_required",
        own_condition_ok,
        "IF EnemyShieldsUp=true THEN Use special power".into(),
    ));

    results
}

// ── 6. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(raw: &serde_json::Value, report: &AnalysisReport) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    let rerun = analyze(raw).ok();
    let identical = rerun.as_ref().is_some_and(|second| {
        serde_json::to_string(second).ok() == serde_json::to_string(report).ok()
    });
    results.push(check(
        "analysis_idempotent",
        identical,
        "two runs over the same script serialize identically".into(),
    ));

    results
}

// ── Verbose rendering ───────────────────────────────────────────────────

/// Print "IF … AND … THEN …" summaries the way the presentation layer
/// would render them.
fn print_summaries(report: &AnalysisReport) {
    println!("\n--- Rule Summaries ---");
    for bucket in &report.buckets {
        println!("[{}]", bucket.subsystem.as_str());
        for seg in &bucket.segments {
            for insight in &seg.insights {
                if insight.kind != RuleKind::Action {
                    continue;
                }
                match insight.requirements.as_deref() {
                    None => println!("  #{} {} — never fires", insight.display_index, insight.action),
                    Some([]) => println!("  #{} ALWAYS {}", insight.display_index, insight.action),
                    Some(path) => {
                        let clauses: Vec<String> = path
                            .iter()
                            .map(|req| {
                                format!(
                                    "{}={} (rule {})",
                                    req.condition, req.expects, req.source_display_index
                                )
                            })
                            .collect();
                        println!(
                            "  #{} IF {} THEN {}",
                            insight.display_index,
                            clauses.join(" AND "),
                            insight.action
                        );
                    }
                }
            }
        }
    }
}
