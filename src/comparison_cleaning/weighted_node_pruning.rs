// src/comparison_cleaning/weighted_node_pruning.rs - Keeps the edges at or above each node's average weight

use anyhow::Result;
use std::collections::HashSet;

use crate::comparison_cleaning::node_pruning::prune_nodes;
use crate::comparison_cleaning::weighting::SchemeSearch;
use crate::comparison_cleaning::{ComparisonCleaning, WeightingScheme};
use crate::datamodel::{BlockCollection, EntityBlockIndex, WeightedNode};
use crate::tuning::{ParameterDescription, Tunable, TuningOutcome};
use crate::utils::logging::StageLogger;

// Equal weights must not fall below their own mean through rounding
const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct WeightedNodePruning {
    scheme: WeightingScheme,
    reciprocal: bool,
    search: SchemeSearch,
}

impl WeightedNodePruning {
    pub fn new(scheme: WeightingScheme, reciprocal: bool) -> Self {
        Self {
            scheme,
            reciprocal,
            search: SchemeSearch::new(None),
        }
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.search = SchemeSearch::new(seed);
        }
        self
    }

    pub fn weighting_scheme(&self) -> WeightingScheme {
        self.scheme
    }
}

fn above_average(node: &WeightedNode) -> HashSet<usize> {
    let threshold = node.average_weight();
    let slack = WEIGHT_TOLERANCE * threshold.abs().max(1.0);
    node.neighbor_weights()
        .iter()
        .filter(|&(_, &weight)| weight + slack >= threshold)
        .map(|(&neighbor, _)| neighbor)
        .collect()
}

impl ComparisonCleaning for WeightedNodePruning {
    fn refine_blocks(
        &self,
        blocks: &BlockCollection,
        index: &EntityBlockIndex,
    ) -> Result<BlockCollection> {
        let logger = StageLogger::new(self.method_name());
        logger.log_start(&self.method_configuration());
        prune_nodes(
            blocks,
            index,
            self.scheme,
            self.reciprocal,
            &logger,
            above_average,
        )
    }
}

impl Tunable for WeightedNodePruning {
    fn method_name(&self) -> &'static str {
        if self.reciprocal {
            "Reciprocal Weighted Node Pruning"
        } else {
            "Weighted Node Pruning"
        }
    }

    fn method_info(&self) -> String {
        let retention = if self.reciprocal {
            "both adjacent entities"
        } else {
            "either adjacent entity"
        };
        format!(
            "{}: a node-centric pruning method; it retains the comparisons whose weight is at least the average edge weight of {}.",
            self.method_name(),
            retention
        )
    }

    fn method_configuration(&self) -> String {
        format!("Weighting Scheme={}", self.scheme)
    }

    fn parameter_descriptions(&self) -> Vec<ParameterDescription> {
        vec![SchemeSearch::description()]
    }

    fn number_of_grid_configurations(&self) -> usize {
        self.search.number_of_configurations()
    }

    fn set_next_random_configuration(&mut self) -> Result<TuningOutcome> {
        self.scheme = self.search.next_random_scheme();
        Ok(TuningOutcome::Applied)
    }

    fn set_numbered_grid_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        self.scheme = self.search.grid_scheme(self.method_name(), iteration)?;
        Ok(TuningOutcome::Applied)
    }

    fn set_numbered_random_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        self.scheme = self.search.numbered_random_scheme(iteration);
        Ok(TuningOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{DecomposedBlock, UnilateralBlock};
    use std::collections::HashMap;

    fn blocks() -> BlockCollection {
        BlockCollection::Unilateral(vec![
            UnilateralBlock::new(vec![0, 1]),
            UnilateralBlock::new(vec![0, 1]),
            UnilateralBlock::new(vec![0, 2]),
            UnilateralBlock::new(vec![2, 3]),
        ])
    }

    #[test]
    fn test_equal_weights_survive_their_average() {
        let node = WeightedNode::from_neighbors(0, HashMap::from([(1, 0.1), (2, 0.1), (3, 0.1)]));
        assert_eq!(above_average(&node).len(), 3);

        let node = WeightedNode::from_neighbors(0, HashMap::from([(1, 3.0), (2, 1.0)]));
        assert_eq!(above_average(&node), HashSet::from([1]));
    }

    #[test]
    fn test_either_endpoint_retention() {
        // CBS: 0-1 = 2, 0-2 = 1, 2-3 = 1; averages: 0 -> 1.5, 1 -> 2, 2 -> 1, 3 -> 1
        let refined = WeightedNodePruning::new(WeightingScheme::Cbs, false)
            .refine(&blocks())
            .unwrap();
        assert_eq!(
            refined,
            BlockCollection::Decomposed {
                clean_clean: false,
                blocks: vec![
                    DecomposedBlock::new(1, vec![0]),
                    DecomposedBlock::new(2, vec![0]),
                    DecomposedBlock::new(3, vec![2]),
                ],
            }
        );
    }

    #[test]
    fn test_reciprocal_drops_one_sided_edges() {
        let refined = WeightedNodePruning::new(WeightingScheme::Cbs, true)
            .refine(&blocks())
            .unwrap();
        let pairs: Vec<(usize, usize)> = refined.distinct_comparisons().into_iter().collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_random_configurations_are_reproducible() {
        let mut a = WeightedNodePruning::new(WeightingScheme::Arcs, false).with_random_seed(Some(3));
        let mut b = WeightedNodePruning::new(WeightingScheme::Arcs, false).with_random_seed(Some(3));
        for _ in 0..5 {
            a.set_next_random_configuration().unwrap();
            b.set_next_random_configuration().unwrap();
            assert_eq!(a.weighting_scheme(), b.weighting_scheme());
        }
        a.set_numbered_random_configuration(9).unwrap();
        b.set_numbered_random_configuration(9).unwrap();
        assert_eq!(a.weighting_scheme(), b.weighting_scheme());
    }
}
