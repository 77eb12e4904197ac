//! Pure static analysis for crew AI rule scripts.
//!
//! This crate contains all analysis logic independent of any UI, file
//! import, or game runtime. Functions take plain data and return results,
//! making them unit-testable and portable across a web front end, native
//! CLI tools, and any future host.
//!
//! The input is a flat, ordered list of `condition → action` rules as the
//! game evaluates them for one crew member. Without executing anything,
//! the engine determines which rules can actually fire and, for each
//! firing action, the minimal boolean condition-assignments under which
//! it is the one that fires.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analysis`] | Pipeline composition and the top-level report types |
//! | [`error`] | The caller-contract error for non-sequence input |
//! | [`insight`] | Single-slot suppression walk, reachability partitions |
//! | [`paths`] | DFS enumeration of requirement paths with memoization |
//! | [`rules`] | Rule model, Skip classification, record normalization |
//! | [`segment`] | Splitting a bucket at each terminating action |
//! | [`selector`] | Primary/alternate choice among requirement paths |
//! | [`subsystem`] | Keyword-based bucketing into independent subsystems |

pub mod analysis;
pub mod error;
pub mod insight;
pub mod paths;
pub mod rules;
pub mod segment;
pub mod selector;
pub mod subsystem;

pub use analysis::{analyze, analyze_rules, AnalysisReport, BucketInsight};
pub use error::AnalysisError;
