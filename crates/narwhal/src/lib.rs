#![forbid(unsafe_code)]

//! Headless 2D layout for weighted, undirected graphs.
//!
//! `narwhal` computes node coordinates with one of five strategies (circle, grid,
//! Fruchterman-Reingold, Kamada-Kawai and a multilevel force-directed layout) and reports them
//! keyed by node id together with run metadata. It never renders anything and keeps no state
//! between calls.

pub mod algo;
pub mod error;
pub mod graph;
pub mod options;
pub mod result;
pub mod wire;

use std::time::Instant;

use indexmap::IndexMap;

pub use algo::{
    Algorithm, AlgorithmKind, CircleOptions, Cooling, DrlOptions, DrlPreset,
    FruchtermanReingoldOptions, GridOptions, KamadaKawaiOptions,
};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, Link, Node, Point};
pub use options::LayoutOptions;
pub use result::{LayoutMetadata, LayoutResult, Position};

/// Lays out a validated graph.
///
/// Never fails: unknown algorithms have already fallen back to the multilevel layout while the
/// options were resolved, and every algorithm handles empty and single-node graphs.
pub fn layout(graph: &Graph, options: &LayoutOptions) -> LayoutResult {
    let algorithm = options.algorithm();
    let kind = algorithm.kind();
    tracing::debug!(
        algorithm = %kind,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "layout started"
    );

    let started = Instant::now();
    let points = algorithm.run(graph);
    let elapsed = started.elapsed().as_secs_f64();

    let positions: IndexMap<String, Position> = graph
        .nodes()
        .iter()
        .zip(points)
        .map(|(node, p)| {
            (
                node.id.clone(),
                Position {
                    id: node.id.clone(),
                    x: p.x,
                    y: p.y,
                },
            )
        })
        .collect();

    tracing::info!(
        algorithm = %kind,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        seconds = elapsed,
        "layout finished"
    );

    LayoutResult {
        positions,
        metadata: LayoutMetadata {
            algorithm: kind,
            num_nodes: graph.node_count(),
            num_edges: graph.edge_count(),
            execution_time_seconds: elapsed,
        },
    }
}

/// Validates `nodes` and `links`, then lays them out.
pub fn generate(nodes: Vec<Node>, links: Vec<Link>, options: &LayoutOptions) -> Result<LayoutResult> {
    let graph = Graph::build(nodes, links)?;
    Ok(layout(&graph, options))
}
