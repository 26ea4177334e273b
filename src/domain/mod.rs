// Domain model for statstree: flat stats in, call graph out.

pub mod callgraph;
pub mod error;
pub mod stats;
