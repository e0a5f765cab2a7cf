// src/comparison_cleaning/comparison_propagation.rs - Removes repeated comparisons, keeps every distinct pair

use anyhow::Result;
use std::collections::HashSet;

use crate::comparison_cleaning::{
    co_occurring_entities, decomposed_block, driving_entities, ComparisonCleaning,
};
use crate::datamodel::{BlockCollection, DatasetSide, EntityBlockIndex};
use crate::tuning::{inapplicable_search, ParameterDescription, Tunable, TuningOutcome};
use crate::utils::logging::StageLogger;

const METHOD_NAME: &str = "Comparison Propagation";

/// Emits every distinct co-occurring pair exactly once. Parameter-free.
#[derive(Debug, Clone, Default)]
pub struct ComparisonPropagation;

impl ComparisonPropagation {
    pub fn new() -> Self {
        Self
    }
}

impl ComparisonCleaning for ComparisonPropagation {
    fn refine_blocks(
        &self,
        blocks: &BlockCollection,
        index: &EntityBlockIndex,
    ) -> Result<BlockCollection> {
        index.validate_against(blocks)?;
        let logger = StageLogger::new(METHOD_NAME);
        let clean_clean = blocks.is_clean_clean();
        logger.log_blocks_in(blocks.len(), blocks.total_comparisons(), clean_clean);

        let mut new_blocks = Vec::new();
        for entity in 0..driving_entities(index) {
            let neighbors = co_occurring_entities(blocks, index, entity, DatasetSide::First)?;
            // Dirty ER: the pair {i, j} belongs to the larger id
            let retained: HashSet<usize> = if clean_clean {
                neighbors
            } else {
                neighbors.into_iter().filter(|&j| j < entity).collect()
            };
            if !retained.is_empty() {
                new_blocks.push(decomposed_block(entity, retained));
            }
        }

        let refined = BlockCollection::Decomposed {
            clean_clean,
            blocks: new_blocks,
        };
        logger.log_completion(
            refined.len(),
            blocks.total_comparisons(),
            refined.total_comparisons(),
        );
        Ok(refined)
    }
}

impl Tunable for ComparisonPropagation {
    fn method_name(&self) -> &'static str {
        METHOD_NAME
    }

    fn method_info(&self) -> String {
        format!(
            "{}: it eliminates all redundant comparisons from a set of overlapping blocks.",
            METHOD_NAME
        )
    }

    fn method_configuration(&self) -> String {
        crate::tuning::PARAMETER_FREE.to_string()
    }

    fn parameter_descriptions(&self) -> Vec<ParameterDescription> {
        Vec::new()
    }

    fn number_of_grid_configurations(&self) -> usize {
        1
    }

    fn set_next_random_configuration(&mut self) -> Result<TuningOutcome> {
        Ok(inapplicable_search(METHOD_NAME, "Random"))
    }

    fn set_numbered_grid_configuration(&mut self, _iteration: usize) -> Result<TuningOutcome> {
        Ok(inapplicable_search(METHOD_NAME, "Grid"))
    }

    fn set_numbered_random_configuration(&mut self, _iteration: usize) -> Result<TuningOutcome> {
        Ok(inapplicable_search(METHOD_NAME, "Random"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{BilateralBlock, DecomposedBlock, UnilateralBlock};
    use crate::error::BlockingError;

    fn decomposed(refined: &BlockCollection) -> &[DecomposedBlock] {
        match refined {
            BlockCollection::Decomposed { blocks, .. } => blocks,
            other => panic!("expected decomposed blocks, got {:?}", other),
        }
    }

    #[test]
    fn test_dirty_pairs_attach_to_larger_id() {
        let blocks = BlockCollection::Unilateral(vec![
            UnilateralBlock::new(vec![1, 2, 3]),
            UnilateralBlock::new(vec![2, 3, 4]),
        ]);
        let refined = ComparisonPropagation::new().refine(&blocks).unwrap();
        let out = decomposed(&refined);

        // entities 0 and 1 have nothing smaller to pair with
        assert_eq!(
            out,
            &[
                DecomposedBlock::new(2, vec![1]),
                DecomposedBlock::new(3, vec![1, 2]),
                DecomposedBlock::new(4, vec![2, 3]),
            ]
        );
        assert_eq!(refined.distinct_comparisons(), blocks.distinct_comparisons());
        assert_eq!(refined.total_comparisons(), 5.0);
    }

    #[test]
    fn test_clean_clean_neighbours_are_merged() {
        let blocks = BlockCollection::Bilateral(vec![
            BilateralBlock::new(vec![0], vec![5, 6]),
            BilateralBlock::new(vec![0], vec![6, 7]),
        ]);
        let refined = ComparisonPropagation::new().refine(&blocks).unwrap();
        assert!(refined.is_clean_clean());
        assert_eq!(decomposed(&refined), &[DecomposedBlock::new(0, vec![5, 6, 7])]);
    }

    #[test]
    fn test_stale_index_fails_fast() {
        let blocks = BlockCollection::Unilateral(vec![UnilateralBlock::new(vec![0, 1])]);
        let stale = EntityBlockIndex::from_parts(vec![vec![0], vec![0, 3]], None, 1);
        let err = ComparisonPropagation::new()
            .refine_blocks(&blocks, &stale)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<BlockingError>(),
            Some(&BlockingError::BlockOutOfRange {
                block_id: 3,
                total: 1
            })
        );
    }

    #[test]
    fn test_tuning_is_unsupported() {
        let mut method = ComparisonPropagation::new();
        assert_eq!(
            method.set_numbered_grid_configuration(0).unwrap(),
            TuningOutcome::Unsupported
        );
        assert_eq!(
            method.set_next_random_configuration().unwrap(),
            TuningOutcome::Unsupported
        );
        assert_eq!(
            method.set_numbered_random_configuration(3).unwrap(),
            TuningOutcome::Unsupported
        );
        assert_eq!(method.number_of_grid_configurations(), 1);
        assert_eq!(
            method.method_parameters(),
            "Comparison Propagation is a Parameter-free method."
        );
        assert_eq!(method.parameter_configuration(), serde_json::json!([]));
    }
}
