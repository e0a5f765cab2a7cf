// src/comparison_cleaning/mod.rs - Meta-blocking strategies that prune the comparisons implied by a block collection
//! Every strategy consumes blocks plus the entity-block index built for them
//! and emits a `BlockCollection::Decomposed` in which each output block pairs
//! one driving entity with its retained neighbours. The driving entity is the
//! dataset-1 entity in Clean-Clean ER and the larger id in Dirty ER, so every
//! surviving pair is emitted exactly once.

pub mod cardinality_node_pruning;
pub mod comparison_propagation;
mod node_pruning;
pub mod weighted_node_pruning;
pub mod weighting;

pub use cardinality_node_pruning::CardinalityNodePruning;
pub use comparison_propagation::ComparisonPropagation;
pub use weighted_node_pruning::WeightedNodePruning;
pub use weighting::{build_weighted_node, WeightingScheme};

use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::datamodel::{BlockCollection, DatasetSide, DecomposedBlock, EntityBlockIndex};
use crate::error::BlockingError;
use crate::tuning::Tunable;

pub trait ComparisonCleaning: Tunable {
    /// Prune `blocks`; `index` must have been built for exactly these blocks.
    fn refine_blocks(
        &self,
        blocks: &BlockCollection,
        index: &EntityBlockIndex,
    ) -> Result<BlockCollection>;

    /// Build the entity index and prune in one step.
    fn refine(&self, blocks: &BlockCollection) -> Result<BlockCollection> {
        let index = EntityBlockIndex::from_blocks(blocks);
        self.refine_blocks(blocks, &index)
    }
}

/// The cleaning strategies the driver can instantiate by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningMethod {
    ComparisonPropagation,
    CardinalityNodePruning,
    ReciprocalCardinalityNodePruning,
    WeightedNodePruning,
    ReciprocalWeightedNodePruning,
}

impl CleaningMethod {
    pub const ALL: [CleaningMethod; 5] = [
        CleaningMethod::ComparisonPropagation,
        CleaningMethod::CardinalityNodePruning,
        CleaningMethod::ReciprocalCardinalityNodePruning,
        CleaningMethod::WeightedNodePruning,
        CleaningMethod::ReciprocalWeightedNodePruning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CleaningMethod::ComparisonPropagation => "comparison-propagation",
            CleaningMethod::CardinalityNodePruning => "cardinality-node-pruning",
            CleaningMethod::ReciprocalCardinalityNodePruning => "reciprocal-cardinality-node-pruning",
            CleaningMethod::WeightedNodePruning => "weighted-node-pruning",
            CleaningMethod::ReciprocalWeightedNodePruning => "reciprocal-weighted-node-pruning",
        }
    }
}

impl fmt::Display for CleaningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleaningMethod {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "comparison-propagation" | "cp" => Ok(CleaningMethod::ComparisonPropagation),
            "cardinality-node-pruning" | "cnp" => Ok(CleaningMethod::CardinalityNodePruning),
            "reciprocal-cardinality-node-pruning" | "rcnp" => {
                Ok(CleaningMethod::ReciprocalCardinalityNodePruning)
            }
            "weighted-node-pruning" | "wnp" => Ok(CleaningMethod::WeightedNodePruning),
            "reciprocal-weighted-node-pruning" | "rwnp" => {
                Ok(CleaningMethod::ReciprocalWeightedNodePruning)
            }
            _ => Err(BlockingError::InvalidParameter(format!(
                "unknown comparison cleaning method '{}'",
                s
            ))),
        }
    }
}

/// Instantiate a strategy. `scheme` is ignored by parameter-free methods and
/// `seed` fixes the random-search stream of tunable ones.
pub fn create_cleaning_method(
    method: CleaningMethod,
    scheme: WeightingScheme,
    seed: Option<u64>,
) -> Box<dyn ComparisonCleaning> {
    match method {
        CleaningMethod::ComparisonPropagation => Box::new(ComparisonPropagation::new()),
        CleaningMethod::CardinalityNodePruning => {
            Box::new(CardinalityNodePruning::new(scheme, false).with_random_seed(seed))
        }
        CleaningMethod::ReciprocalCardinalityNodePruning => {
            Box::new(CardinalityNodePruning::new(scheme, true).with_random_seed(seed))
        }
        CleaningMethod::WeightedNodePruning => {
            Box::new(WeightedNodePruning::new(scheme, false).with_random_seed(seed))
        }
        CleaningMethod::ReciprocalWeightedNodePruning => {
            Box::new(WeightedNodePruning::new(scheme, true).with_random_seed(seed))
        }
    }
}

/// Number of entities that drive output blocks: dataset 1 in Clean-Clean ER,
/// every entity in Dirty ER.
pub(crate) fn driving_entities(index: &EntityBlockIndex) -> usize {
    if index.is_clean_clean() {
        index.dataset_limit()
    } else {
        index.no_of_entities()
    }
}

/// Entities sharing at least one block with `entity`, ids local to their side.
pub(crate) fn co_occurring_entities(
    blocks: &BlockCollection,
    index: &EntityBlockIndex,
    entity: usize,
    side: DatasetSide,
) -> Result<HashSet<usize>> {
    let mut neighbors = HashSet::new();
    for &block_id in index.entity_blocks(entity, side) {
        let co_occurring = blocks.co_occurring(block_id, entity, side).ok_or(
            BlockingError::BlockOutOfRange {
                block_id,
                total: blocks.len(),
            },
        )?;
        neighbors.extend(co_occurring);
    }
    Ok(neighbors)
}

/// Star block with neighbours in ascending order.
pub(crate) fn decomposed_block(entity: usize, neighbors: HashSet<usize>) -> DecomposedBlock {
    let mut neighbors: Vec<usize> = neighbors.into_iter().collect();
    neighbors.sort_unstable();
    DecomposedBlock::new(entity, neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_parse() {
        for method in CleaningMethod::ALL {
            assert_eq!(method.as_str().parse::<CleaningMethod>(), Ok(method));
        }
        assert_eq!(
            "RWNP".parse::<CleaningMethod>(),
            Ok(CleaningMethod::ReciprocalWeightedNodePruning)
        );
        assert_eq!(
            "Comparison_Propagation".parse::<CleaningMethod>(),
            Ok(CleaningMethod::ComparisonPropagation)
        );
        assert!("edge-pruning".parse::<CleaningMethod>().is_err());
    }

    #[test]
    fn test_factory_reports_method_names() {
        let names: Vec<&str> = CleaningMethod::ALL
            .iter()
            .map(|&m| create_cleaning_method(m, WeightingScheme::Arcs, Some(7)).method_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "Comparison Propagation",
                "Cardinality Node Pruning",
                "Reciprocal Cardinality Node Pruning",
                "Weighted Node Pruning",
                "Reciprocal Weighted Node Pruning",
            ]
        );
    }
}
