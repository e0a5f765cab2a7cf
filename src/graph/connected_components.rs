// src/graph/connected_components.rs

use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

use crate::graph::undirected::UndirectedGraph;

/// Connected components of an `UndirectedGraph`, computed once with union-find.
///
/// Component ids are dense (`0..count`) and assigned in ascending order of the
/// smallest vertex of each component. They are only meaningful within this
/// result; membership and sizes depend on the edge set alone.
#[derive(Debug, Clone)]
pub struct ConnectedComponents {
    ids: Vec<usize>,
    sizes: Vec<usize>,
}

impl ConnectedComponents {
    pub fn new(graph: &UndirectedGraph) -> Self {
        let vertices = graph.vertex_count();
        let mut union_find = UnionFind::<usize>::new(vertices);
        for (u, v) in graph.edges() {
            union_find.union(u, v);
        }

        let roots = union_find.into_labeling();
        let mut root_to_id: HashMap<usize, usize> = HashMap::new();
        let mut ids = Vec::with_capacity(vertices);
        let mut sizes: Vec<usize> = Vec::new();
        for root in roots {
            let next_id = root_to_id.len();
            let id = *root_to_id.entry(root).or_insert(next_id);
            if id == sizes.len() {
                sizes.push(0);
            }
            sizes[id] += 1;
            ids.push(id);
        }

        Self { ids, sizes }
    }

    /// Number of components, isolated vertices included.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Component id of `vertex`.
    ///
    /// Panics if `vertex` is not a vertex of the graph the components were computed on.
    pub fn id(&self, vertex: usize) -> usize {
        self.ids[vertex]
    }

    /// Size of the component containing `vertex`.
    pub fn size(&self, vertex: usize) -> usize {
        self.sizes[self.ids[vertex]]
    }

    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    /// Vertices grouped by component id.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut components = vec![Vec::new(); self.count()];
        for (vertex, &id) in self.ids.iter().enumerate() {
            components[id].push(vertex);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_and_sizes() {
        let mut graph = UndirectedGraph::new(6);
        graph.add_edge(0, 2).unwrap();
        graph.add_edge(2, 4).unwrap();
        graph.add_edge(3, 5).unwrap();

        let cc = ConnectedComponents::new(&graph);
        assert_eq!(cc.count(), 3);
        assert_eq!(cc.id(0), cc.id(4));
        assert_eq!(cc.id(3), cc.id(5));
        assert_ne!(cc.id(0), cc.id(1));
        assert_eq!(cc.size(2), 3);
        assert_eq!(cc.size(1), 1);
        assert_eq!(cc.size(5), 2);
        assert_eq!(cc.components(), vec![vec![0, 2, 4], vec![1], vec![3, 5]]);
    }

    #[test]
    fn test_membership_independent_of_edge_order() {
        let edges = [(0, 1), (4, 5), (1, 2), (5, 6), (2, 0)];

        let mut forward = UndirectedGraph::new(7);
        for &(u, v) in edges.iter() {
            forward.add_edge(u, v).unwrap();
        }
        let mut backward = UndirectedGraph::new(7);
        for &(u, v) in edges.iter().rev() {
            backward.add_edge(v, u).unwrap();
        }

        let a = ConnectedComponents::new(&forward);
        let b = ConnectedComponents::new(&backward);
        assert_eq!(a.count(), b.count());
        for u in 0..7 {
            assert_eq!(a.size(u), b.size(u));
            for v in 0..7 {
                assert_eq!(a.id(u) == a.id(v), b.id(u) == b.id(v));
            }
        }
    }

    #[test]
    fn test_empty_graph() {
        let cc = ConnectedComponents::new(&UndirectedGraph::new(0));
        assert_eq!(cc.count(), 0);
        assert!(cc.components().is_empty());
    }
}
