//! Graph assembler
//!
//! Turns aggregated edges into a petgraph graph whose nodes carry display
//! metadata, and renders it as node-link JSON or DOT.

use crate::Result;
use crate::data_source::StudentId;
use crate::pathway::aggregate::AggregatedEdge;
use crate::pathway::metadata::{MetadataTable, StateMetadata};
use crate::pathway::token::NodeKey;
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

/// A state at a time bucket, with its display attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayNode {
    pub key: NodeKey,
    pub metadata: StateMetadata,
}

impl PathwayNode {
    /// The node id, e.g. `enr4year-2`
    pub fn name(&self) -> String {
        self.key.to_string()
    }

    /// Bucket as text, the way the node-link output carries it
    pub fn time(&self) -> String {
        self.key.bucket.to_string()
    }
}

/// Students moving between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayEdge {
    pub count: usize,
    pub ids: Vec<StudentId>,

    /// True when the source was empty and is drawn as `norecordfound`
    pub missing_source: bool,
}

/// Directed, time-sliced graph of cohort pathways.
///
/// Nodes are states at a bucket; edges carry the number of students that
/// made each move and who they were. Only nodes touched by an edge exist.
pub struct PathwayGraph {
    /// The underlying graph structure.
    pub graph: StableGraph<PathwayNode, PathwayEdge>,

    /// Node key to graph index, one entry per node
    pub node_index: HashMap<NodeKey, NodeIndex>,
}

impl Default for PathwayGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PathwayGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build the graph from aggregated edges
    ///
    /// Fails with `UnknownState` on the first node whose state has no entry
    /// in `table`. An empty source is attached to `norecordfound` at the
    /// edge's bucket, on its own edge next to any observed one.
    pub fn assemble(edges: &[AggregatedEdge], table: &MetadataTable) -> Result<Self> {
        let mut graph = Self::new();

        for edge in edges {
            let (source, missing_source) = match &edge.source {
                Some(key) => (key.clone(), false),
                None => (NodeKey::no_record(edge.time), true),
            };
            let from = graph.ensure_node(source, table)?;
            let to = graph.ensure_node(edge.target.clone(), table)?;

            let existing = graph
                .graph
                .edges_directed(from, Direction::Outgoing)
                .find(|e| e.target() == to && e.weight().missing_source == missing_source)
                .map(|e| e.id());
            if let Some(existing) = existing.and_then(|idx| graph.graph.edge_weight_mut(idx)) {
                for id in &edge.ids {
                    if !existing.ids.contains(id) {
                        existing.ids.push(id.clone());
                    }
                }
                existing.count = existing.ids.len();
                continue;
            }

            graph.graph.add_edge(
                from,
                to,
                PathwayEdge {
                    count: edge.count(),
                    ids: edge.ids.clone(),
                    missing_source,
                },
            );
        }

        tracing::info!(
            "Assembled pathway graph: {} nodes, {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        Ok(graph)
    }

    fn ensure_node(&mut self, key: NodeKey, table: &MetadataTable) -> Result<NodeIndex> {
        if let Some(&idx) = self.node_index.get(&key) {
            return Ok(idx);
        }
        let metadata = table.resolve(&key)?.clone();
        let idx = self.graph.add_node(PathwayNode {
            key: key.clone(),
            metadata,
        });
        self.node_index.insert(key, idx);
        Ok(idx)
    }

    /// Get a node by its key
    pub fn node(&self, key: &NodeKey) -> Option<&PathwayNode> {
        self.node_index
            .get(key)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Get the edge between two nodes, preferring the observed one
    pub fn edge(&self, source: &NodeKey, target: &NodeKey) -> Option<&PathwayEdge> {
        self.edges_between(source, target)
            .into_iter()
            .min_by_key(|edge| edge.missing_source)
    }

    /// Every edge between two nodes; at most one observed and one with a
    /// missing source
    pub fn edges_between(&self, source: &NodeKey, target: &NodeKey) -> Vec<&PathwayEdge> {
        let (Some(&from), Some(&to)) = (self.node_index.get(source), self.node_index.get(target))
        else {
            return Vec::new();
        };
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|edge| edge.target() == to)
            .map(|edge| edge.weight())
            .collect()
    }

    /// True when some pair of nodes is joined by more than one edge
    pub fn has_parallel_edges(&self) -> bool {
        let mut seen = HashSet::new();
        self.graph
            .edge_indices()
            .filter_map(|idx: EdgeIndex| self.graph.edge_endpoints(idx))
            .any(|endpoints| !seen.insert(endpoints))
    }

    /// Outgoing edges of a node with their targets
    pub fn outgoing_edges(&self, key: &NodeKey) -> Vec<(&PathwayNode, &PathwayEdge)> {
        let Some(&idx) = self.node_index.get(key) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| {
                self.graph
                    .node_weight(edge.target())
                    .map(|node| (node, edge.weight()))
            })
            .collect()
    }

    /// Get all nodes
    pub fn nodes(&self) -> Vec<&PathwayNode> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// Get all edges
    pub fn edges(&self) -> Vec<&PathwayEdge> {
        self.graph
            .edge_indices()
            .filter_map(|idx| self.graph.edge_weight(idx))
            .collect()
    }

    /// Nodes ordered by bucket, then sort order, then key
    pub fn sorted_nodes(&self) -> Vec<&PathwayNode> {
        let mut nodes = self.nodes();
        nodes.sort_by(|a, b| {
            a.key
                .bucket
                .cmp(&b.key.bucket)
                .then(a.metadata.sort_order.cmp(&b.metadata.sort_order))
                .then_with(|| a.key.cmp(&b.key))
        });
        nodes
    }

    /// Edges with their endpoints, ordered like their source nodes
    pub fn sorted_edges(&self) -> Vec<(&PathwayNode, &PathwayNode, &PathwayEdge)> {
        let rank: HashMap<&NodeKey, usize> = self
            .sorted_nodes()
            .into_iter()
            .enumerate()
            .map(|(i, node)| (&node.key, i))
            .collect();

        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|idx| {
                let (from, to) = self.graph.edge_endpoints(idx)?;
                Some((
                    self.graph.node_weight(from)?,
                    self.graph.node_weight(to)?,
                    self.graph.edge_weight(idx)?,
                ))
            })
            .collect();
        edges.sort_by_key(|(source, target, _)| (rank[&source.key], rank[&target.key]));
        edges
    }

    /// Node-link JSON value (`directed`, `nodes`, `links`)
    ///
    /// Parallel edges only occur when a missing-source edge shares its
    /// endpoints with an observed one; the graph is then flagged as a
    /// multigraph and each link carries a `key`.
    pub fn to_node_link(&self) -> Value {
        let multigraph = self.has_parallel_edges();
        let nodes: Vec<Value> = self
            .sorted_nodes()
            .into_iter()
            .map(|node| {
                json!({
                    "id": node.name(),
                    "name": node.name(),
                    "time": node.time(),
                    "long_name": node.metadata.long_name,
                    "sort_order": node.metadata.sort_order,
                    "color": node.metadata.color,
                })
            })
            .collect();

        let links: Vec<Value> = self
            .sorted_edges()
            .into_iter()
            .map(|(source, target, edge)| {
                let mut link = json!({
                    "source": source.name(),
                    "target": target.name(),
                    "count": edge.count,
                    "ids": edge.ids,
                });
                if multigraph {
                    link["key"] = json!(usize::from(edge.missing_source));
                }
                link
            })
            .collect();

        json!({
            "directed": true,
            "multigraph": multigraph,
            "graph": {},
            "nodes": nodes,
            "links": links,
        })
    }

    /// Export to DOT format for Graphviz, one rank per bucket
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph PathwayGraph {\n".to_string();
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=filled];\n\n");

        let mut by_bucket: Vec<(u32, Vec<&PathwayNode>)> = Vec::new();
        for node in self.sorted_nodes() {
            if by_bucket.last().map(|(bucket, _)| *bucket) != Some(node.key.bucket) {
                by_bucket.push((node.key.bucket, Vec::new()));
            }
            if let Some((_, nodes)) = by_bucket.last_mut() {
                nodes.push(node);
            }
        }

        for (bucket, nodes) in &by_bucket {
            dot.push_str(&format!("  subgraph bucket_{} {{\n    rank=same;\n", bucket));
            for node in nodes {
                dot.push_str(&format!(
                    "    \"{}\" [label=\"{}\\n{}\", fillcolor=\"{}\"];\n",
                    escape(&node.name()),
                    escape(&node.metadata.long_name),
                    node.key.bucket,
                    node.metadata.color
                ));
            }
            dot.push_str("  }\n");
        }

        dot.push('\n');

        for (source, target, edge) in self.sorted_edges() {
            let style = if edge.missing_source { ", style=dashed" } else { "" };
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\", penwidth={:.1}{}];\n",
                escape(&source.name()),
                escape(&target.name()),
                edge.count,
                1.0 + (edge.count as f64).ln(),
                style
            ));
        }

        dot.push_str("}\n");
        dot
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        let edges = self.edges();
        let students: HashSet<&StudentId> = edges.iter().flat_map(|e| e.ids.iter()).collect();

        GraphStats {
            total_nodes: self.graph.node_count(),
            total_edges: self.graph.edge_count(),
            students: students.len(),
            max_bucket: self.nodes().iter().map(|n| n.key.bucket).max().unwrap_or(0),
            missing_source_edges: edges.iter().filter(|e| e.missing_source).count(),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub students: usize,
    pub max_bucket: u32,
    pub missing_source_edges: usize,
}
