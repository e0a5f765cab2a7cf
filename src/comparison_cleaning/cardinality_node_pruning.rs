// src/comparison_cleaning/cardinality_node_pruning.rs - Keeps the top-K neighbours of every entity

use anyhow::Result;
use std::collections::HashSet;

use crate::comparison_cleaning::node_pruning::prune_nodes;
use crate::comparison_cleaning::weighting::SchemeSearch;
use crate::comparison_cleaning::{ComparisonCleaning, WeightingScheme};
use crate::datamodel::{BlockCollection, EntityBlockIndex};
use crate::tuning::{ParameterDescription, Tunable, TuningOutcome};
use crate::utils::logging::StageLogger;

/// Cardinality Node Pruning: every node keeps its `K` heaviest edges, where
/// `K = max(1, ⌊block assignments / entities⌋)`.
#[derive(Debug, Clone)]
pub struct CardinalityNodePruning {
    scheme: WeightingScheme,
    reciprocal: bool,
    search: SchemeSearch,
}

impl CardinalityNodePruning {
    pub fn new(scheme: WeightingScheme, reciprocal: bool) -> Self {
        Self {
            scheme,
            reciprocal,
            search: SchemeSearch::new(None),
        }
    }

    /// Fix the stream used by `set_next_random_configuration`.
    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.search = SchemeSearch::new(seed);
        }
        self
    }

    pub fn weighting_scheme(&self) -> WeightingScheme {
        self.scheme
    }

    /// Neighbours kept per node for the given blocks.
    pub fn cardinality_threshold(blocks: &BlockCollection, index: &EntityBlockIndex) -> usize {
        let entities = index.no_of_entities();
        if entities == 0 {
            return 1;
        }
        (blocks.block_assignments() / entities).max(1)
    }
}

impl ComparisonCleaning for CardinalityNodePruning {
    fn refine_blocks(
        &self,
        blocks: &BlockCollection,
        index: &EntityBlockIndex,
    ) -> Result<BlockCollection> {
        let logger = StageLogger::new(self.method_name());
        let k = Self::cardinality_threshold(blocks, index);
        logger.log_start(&format!("{}, K={}", self.method_configuration(), k));
        prune_nodes(blocks, index, self.scheme, self.reciprocal, &logger, |node| {
            node.top_neighbors(k).into_iter().collect::<HashSet<usize>>()
        })
    }
}

impl Tunable for CardinalityNodePruning {
    fn method_name(&self) -> &'static str {
        if self.reciprocal {
            "Reciprocal Cardinality Node Pruning"
        } else {
            "Cardinality Node Pruning"
        }
    }

    fn method_info(&self) -> String {
        let retention = if self.reciprocal {
            "it retains the comparisons that are among the top-K weighted ones of both adjacent entities"
        } else {
            "it retains the comparisons that are among the top-K weighted ones of either adjacent entity"
        };
        format!("{}: a node-centric pruning method; {}.", self.method_name(), retention)
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
