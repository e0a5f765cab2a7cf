//! Connected components checked against a breadth-first search.

use blocking_lib::graph::{ConnectedComponents, UndirectedGraph};
use proptest::prelude::*;
use std::collections::VecDeque;

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..25).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..40)
            .prop_map(|edges| edges.into_iter().filter(|(u, v)| u != v).collect::<Vec<_>>());
        (Just(n), edges)
    })
}

/// Component label per vertex by BFS over an adjacency list.
fn bfs_labels(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut adjacency = vec![Vec::new(); n];
    for &(u, v) in edges {
        adjacency[u].push(v);
        adjacency[v].push(u);
    }
    let mut labels = vec![usize::MAX; n];
    let mut next_label = 0;
    for start in 0..n {
        if labels[start] != usize::MAX {
            continue;
        }
        labels[start] = next_label;
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for &v in &adjacency[u] {
                if labels[v] == usize::MAX {
                    labels[v] = next_label;
                    queue.push_back(v);
                }
            }
        }
        next_label += 1;
    }
    labels
}

proptest! {
    #[test]
    fn components_match_reachability((n, edges) in graph_strategy()) {
        let mut graph = UndirectedGraph::new(n);
        for &(u, v) in &edges {
            graph.add_edge(u, v).unwrap();
        }
        let components = ConnectedComponents::new(&graph);
        let labels = bfs_labels(n, &edges);

        prop_assert_eq!(components.count(), labels.iter().max().map_or(0, |&m| m + 1));
        for u in 0..n {
            let expected_size = labels.iter().filter(|&&l| l == labels[u]).count();
            prop_assert_eq!(components.size(u), expected_size);
            for v in 0..n {
                prop_assert_eq!(components.id(u) == components.id(v), labels[u] == labels[v]);
            }
        }
    }

    /// Adding every edge twice, reversed, changes nothing.
    #[test]
    fn duplicate_edges_are_harmless((n, edges) in graph_strategy()) {
        let mut once = UndirectedGraph::new(n);
        let mut twice = UndirectedGraph::new(n);
        for &(u, v) in &edges {
            once.add_edge(u, v).unwrap();
            twice.add_edge(u, v).unwrap();
            twice.add_edge(v, u).unwrap();
        }
        prop_assert_eq!(once.edge_count(), twice.edge_count());

        let a = ConnectedComponents::new(&once);
        let b = ConnectedComponents::new(&twice);
        prop_assert_eq!(a.components(), b.components());
    }
}
