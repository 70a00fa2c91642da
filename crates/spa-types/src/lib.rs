//! Core data types shared across the SPA: the entity interner with its
//! dense integer references, and the relational [`Table`] the knowledge
//! base and evaluator are built on.

pub mod intern;
pub mod table;

pub use intern::{IntRef, Interner};
pub use table::{Row, Table};
