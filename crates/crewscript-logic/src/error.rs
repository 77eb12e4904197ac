//! Analysis errors.
//!
//! The engine degrades malformed records instead of failing (missing
//! conditions become "None", missing actions become empty text). The one
//! hard error is a caller handing in something that is not a sequence of
//! records at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The raw input was not a sequence of rule records.
    #[error("expected a sequence of rule records, found {found}")]
    InvalidInput { found: String },
}
