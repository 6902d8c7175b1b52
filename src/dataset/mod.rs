//! Dataset assembly: topology instances plus background noise, merged into
//! one timestamp-ordered record sequence.

pub mod assembler;
pub mod types;

pub use assembler::{assemble, assemble_with_pool};
pub use types::{Dataset, TransactionRecord};
