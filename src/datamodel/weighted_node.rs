// src/datamodel/weighted_node.rs

use std::collections::HashMap;
use std::fmt;

/// One vertex of a block co-occurrence graph: its aggregate edge weight, its
/// degree and the weight of every incident edge keyed by neighbour id.
///
/// Built fresh per pruning pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedNode {
    position: usize,
    weight: f64,
    degree: usize,
    neighbor_weights: HashMap<usize, f64>,
}

impl WeightedNode {
    pub fn new(
        position: usize,
        weight: f64,
        degree: usize,
        neighbor_weights: HashMap<usize, f64>,
    ) -> Self {
        Self {
            position,
            weight,
            degree,
            neighbor_weights,
        }
    }

    /// Derive weight and degree from the neighbour map.
    pub fn from_neighbors(position: usize, neighbor_weights: HashMap<usize, f64>) -> Self {
        // fold from +0.0: an empty f64 sum is -0.0
        let weight = neighbor_weights.values().fold(0.0, |acc, w| acc + w);
        let degree = neighbor_weights.len();
        Self::new(position, weight, degree, neighbor_weights)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn neighbor_weights(&self) -> &HashMap<usize, f64> {
        &self.neighbor_weights
    }

    pub fn neighbor_weight(&self, neighbor: usize) -> Option<f64> {
        self.neighbor_weights.get(&neighbor).copied()
    }

    /// Mean incident edge weight, 0 for an isolated node.
    pub fn average_weight(&self) -> f64 {
        if self.degree == 0 {
            0.0
        } else {
            self.weight / self.degree as f64
        }
    }

    /// The `k` heaviest neighbours; equal weights prefer the smaller id.
    pub fn top_neighbors(&self, k: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = self
            .neighbor_weights
            .iter()
            .map(|(&id, &weight)| (id, weight))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.into_iter().take(k).map(|(id, _)| id).collect()
    }
}

impl fmt::Display for WeightedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos : {}, weight : {}, noOfAdj : {}",
            self.position, self.weight, self.degree
        )
    }
}
