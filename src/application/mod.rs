// Application use cases for statstree.

use crate::domain::callgraph::{CallGraph, NodeId};
use crate::domain::stats::display_label;
use crate::ports::{CallTreeBuilder, StatsSource};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;

pub struct AnalyzeUsecase<'a> {
    pub source: &'a dyn StatsSource,
    pub builder: &'a dyn CallTreeBuilder,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(&self) -> Result<TreeReport> {
        let stats = self.source.load().context("Failed to load profile stats")?;
        let tree = self.builder.build_call_tree(&stats);

        let root = tree.root.found().map(|id| RootSummary {
            key: tree.graph.node(id).key.to_string(),
            label: display_label(tree.graph.node(id).key),
            cumulative: tree.graph.node(id).cumulative,
            reachable: reachable_from(&tree.graph, id),
        });

        Ok(TreeReport {
            functions: tree.graph.len(),
            edges: tree.graph.edge_count(),
            dangling_callers: tree.graph.dangling_callers(),
            root,
        })
    }
}

/// Number of distinct functions reachable from `start` through `children`,
/// including `start` itself. Safe on cyclic graphs.
pub fn reachable_from(graph: &CallGraph<'_>, start: NodeId) -> usize {
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if visited.insert(id) {
            stack.extend(graph.node(id).children.iter().copied());
        }
    }
    visited.len()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootSummary {
    pub key: String,
    pub label: String,
    pub cumulative: f64,
    pub reachable: usize,
}

/// Plain summary of one build, for the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeReport {
    pub functions: usize,
    pub edges: usize,
    pub dangling_callers: usize,
    pub root: Option<RootSummary>,
}

impl fmt::Display for TreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "functions:        {}", self.functions)?;
        writeln!(f, "call edges:       {}", self.edges)?;
        writeln!(f, "dangling callers: {}", self.dangling_callers)?;
        match &self.root {
            Some(root) => {
                writeln!(f, "root:             {}", root.label)?;
                writeln!(f, "root cumulative:  {:.6}", root.cumulative)?;
                write!(f, "reachable:        {} of {}", root.reachable, self.functions)
            }
            None => write!(f, "root:             (none found)"),
        }
    }
}
