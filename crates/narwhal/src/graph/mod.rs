use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weight given to links whose weight is zero, negative or not finite.
///
/// Positive weights, however small, are kept as supplied.
pub const MIN_EDGE_WEIGHT: f64 = 1e-9;

const DEFAULT_NODE_VALUE: f64 = 1.0;
const DEFAULT_LINK_WEIGHT: f64 = 1.0;

/// A node as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Carried through untouched; no algorithm reads it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Rendering-size hint. Never used for positions.
    #[serde(default = "default_node_value")]
    pub value: f64,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            weight: None,
            value: DEFAULT_NODE_VALUE,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }
}

fn default_node_value() -> f64 {
    DEFAULT_NODE_VALUE
}

/// An undirected link between two node ids, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
        }
    }

    pub fn weighted(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: Some(weight),
        }
    }
}

/// A validated edge between two dense node indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Whether this edge pulls its endpoints together in the force-directed layouts.
    pub fn attracts(&self) -> bool {
        !self.is_self_loop() && self.weight > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Validated, index-addressed undirected graph.
///
/// Node order is declaration order; the position of a node in that order is its dense index and
/// the only handle the layout algorithms use.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    id_to_idx: FxHashMap<String, usize>,
    adjacency: OnceLock<Vec<Vec<(usize, f64)>>>,
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            id_to_idx: self.id_to_idx.clone(),
            adjacency: OnceLock::new(),
        }
    }
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self> {
        let mut id_to_idx: FxHashMap<String, usize> = FxHashMap::default();
        id_to_idx.reserve(nodes.len());

        let mut nodes = nodes;
        for (idx, n) in nodes.iter_mut().enumerate() {
            if id_to_idx.insert(n.id.clone(), idx).is_some() {
                return Err(Error::DuplicateNode { id: n.id.clone() });
            }
            if !n.value.is_finite() {
                n.value = DEFAULT_NODE_VALUE;
            } else if n.value < 0.0 {
                n.value = 0.0;
            }
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(links.len());
        for (link_index, l) in links.iter().enumerate() {
            let resolve = |id: &str| {
                id_to_idx
                    .get(id)
                    .copied()
                    .ok_or_else(|| Error::UnknownNodeReference {
                        link_index,
                        node_id: id.to_string(),
                    })
            };
            let source = resolve(&l.source)?;
            let target = resolve(&l.target)?;

            let raw = l.weight.unwrap_or(DEFAULT_LINK_WEIGHT);
            let weight = if raw.is_finite() && raw > 0.0 {
                raw
            } else {
                tracing::warn!(
                    link_index,
                    source = %l.source,
                    target = %l.target,
                    weight = raw,
                    "clamping invalid link weight"
                );
                MIN_EDGE_WEIGHT
            };
            edges.push(Edge {
                source,
                target,
                weight,
            });
        }

        Ok(Self {
            nodes,
            edges,
            id_to_idx,
            adjacency: OnceLock::new(),
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    /// Neighbor lists `(neighbor, weight)` per node, built on first use.
    ///
    /// Every edge appears in both endpoint lists; a self-loop appears twice in its own list.
    pub fn adjacency(&self) -> &[Vec<(usize, f64)>] {
        self.adjacency.get_or_init(|| {
            let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.nodes.len()];
            for e in &self.edges {
                adj[e.source].push((e.target, e.weight));
                adj[e.target].push((e.source, e.weight));
            }
            adj
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Graph, Link, MIN_EDGE_WEIGHT, Node};
    use crate::error::Error;

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::new(*id)).collect()
    }

    #[test]
    fn build_assigns_indices_in_declaration_order() {
        let g = Graph::build(nodes(&["c", "a", "b"]), vec![Link::new("a", "b")]).unwrap();
        assert_eq!(g.index_of("c"), Some(0));
        assert_eq!(g.index_of("a"), Some(1));
        assert_eq!(g.index_of("b"), Some(2));
        assert_eq!(g.edges()[0].source, 1);
        assert_eq!(g.edges()[0].target, 2);
    }

    #[test]
    fn build_rejects_duplicate_ids() {
        let err = Graph::build(nodes(&["a", "b", "a"]), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateNode { ref id } if id == "a"));
    }

    #[test]
    fn build_rejects_unknown_endpoint() {
        let err = Graph::build(
            nodes(&["a", "b"]),
            vec![Link::new("a", "b"), Link::new("b", "zzz")],
        )
        .unwrap_err();
        match err {
            Error::UnknownNodeReference {
                link_index,
                node_id,
            } => {
                assert_eq!(link_index, 1);
                assert_eq!(node_id, "zzz");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_weights_are_clamped_and_tiny_ones_kept() {
        let g = Graph::build(
            nodes(&["a", "b", "c"]),
            vec![
                Link::weighted("a", "b", 0.0),
                Link::weighted("b", "c", -3.0),
                Link::weighted("a", "c", f64::NAN),
                Link::new("c", "a"),
                Link::weighted("a", "b", 1e-10),
            ],
        )
        .unwrap();
        let w: Vec<f64> = g.edges().iter().map(|e| e.weight).collect();
        assert_eq!(
            w,
            vec![MIN_EDGE_WEIGHT, MIN_EDGE_WEIGHT, MIN_EDGE_WEIGHT, 1.0, 1e-10]
        );
        assert!(g.edges().iter().all(|e| e.attracts()));
    }

    #[test]
    fn node_values_are_sanitized() {
        let g = Graph::build(
            vec![
                Node::new("a").with_value(-2.0),
                Node::new("b").with_value(f64::INFINITY),
                Node::new("c").with_value(4.0),
            ],
            Vec::new(),
        )
        .unwrap();
        let v: Vec<f64> = g.nodes().iter().map(|n| n.value).collect();
        assert_eq!(v, vec![0.0, 1.0, 4.0]);
    }

    #[test]
    fn adjacency_is_symmetric_and_keeps_parallel_edges() {
        let g = Graph::build(
            nodes(&["a", "b", "c"]),
            vec![
                Link::weighted("a", "b", 2.0),
                Link::weighted("b", "a", 3.0),
                Link::new("c", "c"),
            ],
        )
        .unwrap();
        let adj = g.adjacency();
        assert_eq!(adj[0], vec![(1, 2.0), (1, 3.0)]);
        assert_eq!(adj[1], vec![(0, 2.0), (0, 3.0)]);
        assert_eq!(adj[2], vec![(2, 1.0), (2, 1.0)]);
    }
}
