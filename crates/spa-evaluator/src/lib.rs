//! Query evaluation over the PKB: clause scheduling, per-clause table
//! construction, the natural-join accumulator, and result projection.

pub mod evaluator;
pub mod preprocessor;

pub use evaluator::evaluate;
pub use preprocessor::{group_clauses, ClauseGroups};
