use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::algo::AlgorithmKind;
use crate::graph::Point;

/// Final coordinates of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Redundant with the map key, so it is left out of the serialized form.
    #[serde(skip_serializing, default)]
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetadata {
    /// The algorithm that actually ran, after fallback.
    pub algorithm: AlgorithmKind,
    pub num_nodes: usize,
    pub num_edges: usize,
    /// Wall-clock time of the algorithm call alone.
    pub execution_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Keyed by node id, in node declaration order.
    pub positions: IndexMap<String, Position>,
    pub metadata: LayoutMetadata,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
