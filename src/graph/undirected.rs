// src/graph/undirected.rs

use anyhow::Result;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::error::BlockingError;

/// Undirected graph over the vertices `0..n`, fixed at construction.
///
/// Adding an edge that already exists is a no-op, so repeated adds never
/// change the components computed over the graph.
#[derive(Debug, Clone)]
pub struct UndirectedGraph {
    graph: UnGraph<(), ()>,
}

impl UndirectedGraph {
    pub fn new(vertices: usize) -> Self {
        let mut graph = UnGraph::with_capacity(vertices, vertices);
        for _ in 0..vertices {
            graph.add_node(());
        }
        Self { graph }
    }

    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        let a = self.vertex(u)?;
        let b = self.vertex(v)?;
        self.graph.update_edge(a, b, ());
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges as `(u, v)` vertex pairs in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    pub fn neighbors(&self, u: usize) -> Vec<usize> {
        if u >= self.vertex_count() {
            return Vec::new();
        }
        self.graph
            .neighbors(NodeIndex::new(u))
            .map(|n| n.index())
            .collect()
    }

    fn vertex(&self, id: usize) -> Result<NodeIndex> {
        if id < self.graph.node_count() {
            Ok(NodeIndex::new(id))
        } else {
            Err(BlockingError::VertexOutOfRange {
                vertex: id,
                vertices: self.graph.node_count(),
            }
            .into())
        }
    }
}
