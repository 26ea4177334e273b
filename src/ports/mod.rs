use crate::domain::callgraph::CallTree;
use crate::domain::error::StatsError;
use crate::domain::stats::StatsMap;

/// Where flat profiling stats come from.
pub trait StatsSource {
    fn load(&self) -> Result<StatsMap, StatsError>;
}

pub trait CallTreeBuilder {
    fn build_call_tree<'s>(&self, stats: &'s StatsMap) -> CallTree<'s>;
}
