// Main library entry point for statstree.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::callgraph::{build_call_tree, CallGraph, CallTree, FuncNode, NodeId, RootPolicy, RootSelection};
pub use domain::stats::{CallerStats, StatsEntry, StatsMap};
