//! One module per type family, grouping the rewrite rules named in §4.5.

pub mod assign;
pub mod booleans;
pub mod functions;
pub mod records;
pub mod scalars;
pub mod sequences;
pub mod sets;
pub mod tuples;
