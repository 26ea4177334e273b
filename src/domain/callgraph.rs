//! Call graph structures built from flat profiling stats.
//!
//! Nodes live in an arena owned by [`CallGraph`]; parent/child relations are
//! stored as [`NodeId`] indices into that arena, so cycles (mutual recursion)
//! need no shared ownership.

use indexmap::IndexMap;
use log::{debug, info, trace};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::stats::{CallerStats, StatsMap};

/// Index of a node inside one [`CallGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A function in the call graph.
#[derive(Debug)]
pub struct FuncNode<'s> {
    pub key: &'s str,
    pub calls: u64,
    pub recursive: u64,
    pub local: f64,
    pub cumulative: f64,
    /// Caller attribution, borrowed from the input stats.
    pub callers: &'s IndexMap<String, CallerStats>,
    /// Functions this node calls, in weaving order.
    pub children: Vec<NodeId>,
    /// Functions calling this node, in weaving order.
    pub parents: Vec<NodeId>,
}

/// The graph itself. Built once per stats map; never updated in place.
#[derive(Debug)]
pub struct CallGraph<'s> {
    nodes: Vec<FuncNode<'s>>,
    lookup: HashMap<&'s str, NodeId>,
    dangling_callers: usize,
}

impl<'s> CallGraph<'s> {
    /// Materialize one node per stats entry, then weave parent/child edges
    /// from each node's callers.
    pub fn build(stats: &'s StatsMap) -> Self {
        let mut graph = Self::materialize(stats);
        graph.weave();
        debug!(
            "Built call graph: {} functions, {} edges, {} dangling callers",
            graph.len(),
            graph.edge_count(),
            graph.dangling_callers
        );
        graph
    }

    fn materialize(stats: &'s StatsMap) -> Self {
        let mut nodes = Vec::with_capacity(stats.len());
        let mut lookup = HashMap::with_capacity(stats.len());

        for (key, entry) in stats {
            lookup.insert(key.as_str(), NodeId(nodes.len()));
            nodes.push(FuncNode {
                key: key.as_str(),
                calls: entry.calls,
                recursive: entry.recursive,
                local: entry.local,
                cumulative: entry.cumulative,
                callers: &entry.callers,
                children: Vec::new(),
                parents: Vec::new(),
            });
        }

        CallGraph {
            nodes,
            lookup,
            dangling_callers: 0,
        }
    }

    fn weave(&mut self) {
        for idx in 0..self.nodes.len() {
            let child = NodeId(idx);
            let callers = self.nodes[idx].callers;

            for caller in callers.keys() {
                match self.lookup.get(caller.as_str()) {
                    Some(&parent) => {
                        self.nodes[idx].parents.push(parent);
                        self.nodes[parent.0].children.push(child);
                    }
                    None => {
                        // Caller was filtered out upstream.
                        trace!("Skipping unknown caller {} of {}", caller, self.nodes[idx].key);
                        self.dangling_callers += 1;
                    }
                }
            }
        }
    }

    /// Pick the node that best represents the top of the call chain.
    ///
    /// A candidate has no parents and is named as a caller by at least one
    /// materialized node. Once weaving is done that second condition is
    /// exactly "has children". `policy` breaks ties between candidates.
    pub fn select_root(&self, policy: RootPolicy) -> RootSelection {
        let mut chosen: Option<NodeId> = None;

        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.parents.is_empty() || node.children.is_empty() {
                continue;
            }
            chosen = match (policy, chosen) {
                (RootPolicy::MaxCumulative, Some(best))
                    if node.cumulative <= self.nodes[best.0].cumulative =>
                {
                    Some(best)
                }
                _ => Some(NodeId(idx)),
            };
        }

        match chosen {
            Some(root) => {
                info!("Selected root {} ({:?})", self.nodes[root.0].key, policy);
                RootSelection::Found(root)
            }
            None => {
                debug!("No root candidate among {} functions", self.len());
                RootSelection::NotFound
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Caller references that named a function missing from the stats.
    pub fn dangling_callers(&self) -> usize {
        self.dangling_callers
    }

    /// Panics if `id` came from another graph with more nodes.
    pub fn node(&self, id: NodeId) -> &FuncNode<'s> {
        &self.nodes[id.0]
    }

    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.lookup.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&FuncNode<'s>> {
        self.id_of(key).map(|id| self.node(id))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &FuncNode<'s>> + '_ {
        self.node(id).children.iter().map(|&c| self.node(c))
    }

    pub fn parents(&self, id: NodeId) -> impl Iterator<Item = &FuncNode<'s>> + '_ {
        self.node(id).parents.iter().map(|&p| self.node(p))
    }

    /// Nodes in input order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FuncNode<'s>)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

/// How to choose between several parentless nodes that call something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
    /// Greatest cumulative time; ties go to the earliest node in input order.
    #[default]
    MaxCumulative,
    /// Last qualifying node in input order.
    LastMatch,
}

impl RootPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RootPolicy::MaxCumulative => "max-cumulative",
            RootPolicy::LastMatch => "last-match",
        }
    }
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RootPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "max-cumulative" | "cumulative" => Ok(RootPolicy::MaxCumulative),
            "last-match" | "last" => Ok(RootPolicy::LastMatch),
            other => Err(format!(
                "unknown root policy '{}' (expected max-cumulative or last-match)",
                other
            )),
        }
    }
}

/// Outcome of root selection. `NotFound` is an expected result, not a fault.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSelection {
    Found(NodeId),
    NotFound,
}

impl RootSelection {
    pub fn found(self) -> Option<NodeId> {
        match self {
            RootSelection::Found(id) => Some(id),
            RootSelection::NotFound => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, RootSelection::Found(_))
    }
}

/// A freshly built graph together with its chosen root.
#[derive(Debug)]
pub struct CallTree<'s> {
    pub graph: CallGraph<'s>,
    pub root: RootSelection,
}

impl<'s> CallTree<'s> {
    pub fn root_node(&self) -> Option<&FuncNode<'s>> {
        self.root.found().map(|id| self.graph.node(id))
    }
}

/// Turn flat stats into a call graph and choose its root.
pub fn build_call_tree(stats: &StatsMap, policy: RootPolicy) -> CallTree<'_> {
    let graph = CallGraph::build(stats);
    let root = graph.select_root(policy);
    CallTree { graph, root }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::StatsEntry;

    fn caller() -> CallerStats {
        CallerStats::Timed(1, 1, 0.1, 0.1)
    }

    fn keys<'a>(graph: &'a CallGraph<'_>, ids: &[NodeId]) -> Vec<&'a str> {
        ids.iter().map(|&id| graph.node(id).key).collect()
    }

    #[test]
    fn test_weave_links_both_directions() {
        let mut stats = StatsMap::new();
        stats.insert("main".into(), StatsEntry::new(1, 1, 0.1, 3.0));
        stats.insert(
            "foo".into(),
            StatsEntry::new(2, 2, 0.5, 2.0).with_caller("main", caller()),
        );
        stats.insert(
            "bar".into(),
            StatsEntry::new(1, 1, 0.2, 0.2)
                .with_caller("main", caller())
                .with_caller("foo", caller()),
        );

        let graph = CallGraph::build(&stats);
        let main = graph.id_of("main").unwrap();
        let bar = graph.id_of("bar").unwrap();

        assert_eq!(keys(&graph, &graph.node(main).children), ["foo", "bar"]);
        assert_eq!(keys(&graph, &graph.node(bar).parents), ["main", "foo"]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.dangling_callers(), 0);
    }

    #[test]
    fn test_self_recursion_is_not_a_root() {
        let mut stats = StatsMap::new();
        stats.insert(
            "fact".into(),
            StatsEntry::new(5, 1, 0.1, 0.1).with_caller("fact", caller()),
        );

        let tree = build_call_tree(&stats, RootPolicy::default());
        let fact = tree.graph.get("fact").unwrap();
        assert_eq!(fact.children.len(), 1);
        assert_eq!(fact.parents.len(), 1);
        assert_eq!(tree.root, RootSelection::NotFound);
    }

    #[test]
    fn test_root_policies_disagree_on_order() {
        // Two disjoint chains: big -> x, small -> y
        let mut stats = StatsMap::new();
        stats.insert("big".into(), StatsEntry::new(1, 1, 0.0, 9.0));
        stats.insert("x".into(), StatsEntry::new(1, 1, 0.0, 1.0).with_caller("big", caller()));
        stats.insert("small".into(), StatsEntry::new(1, 1, 0.0, 2.0));
        stats.insert("y".into(), StatsEntry::new(1, 1, 0.0, 1.0).with_caller("small", caller()));

        let by_time = build_call_tree(&stats, RootPolicy::MaxCumulative);
        assert_eq!(by_time.root_node().map(|n| n.key), Some("big"));

        let by_order = build_call_tree(&stats, RootPolicy::LastMatch);
        assert_eq!(by_order.root_node().map(|n| n.key), Some("small"));
    }

    #[test]
    fn test_max_cumulative_tie_keeps_first() {
        let mut stats = StatsMap::new();
        stats.insert("first".into(), StatsEntry::new(1, 1, 0.0, 4.0));
        stats.insert("second".into(), StatsEntry::new(1, 1, 0.0, 4.0));
        stats.insert(
            "leaf".into(),
            StatsEntry::new(2, 2, 0.0, 1.0)
                .with_caller("first", caller())
                .with_caller("second", caller()),
        );

        let tree = build_call_tree(&stats, RootPolicy::MaxCumulative);
        assert_eq!(tree.root_node().map(|n| n.key), Some("first"));
    }

    #[test]
    fn test_root_policy_from_str() {
        assert_eq!("max-cumulative".parse::<RootPolicy>(), Ok(RootPolicy::MaxCumulative));
        assert_eq!("LAST_MATCH".parse::<RootPolicy>(), Ok(RootPolicy::LastMatch));
        assert!("random".parse::<RootPolicy>().is_err());
        assert_eq!(RootPolicy::LastMatch.to_string(), "last-match");
    }
}
