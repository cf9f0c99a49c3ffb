//! Domain types for Overseer certification.

pub mod error;
pub mod evaluation;
pub mod rubric;

pub use error::{OverseerError, Result};
pub use evaluation::EvaluationResult;
pub use rubric::RubricEntry;
