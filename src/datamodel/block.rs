// src/datamodel/block.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which input dataset an entity (or attribute) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetSide {
    First,
    Second,
}

/// A block of entities from a single dataset (Dirty ER).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnilateralBlock {
    pub entities: Vec<usize>,
}

impl UnilateralBlock {
    pub fn new(entities: Vec<usize>) -> Self {
        Self { entities }
    }

    /// Number of pairwise comparisons implied by the block.
    pub fn comparisons(&self) -> f64 {
        let n = self.entities.len() as f64;
        n * (n - 1.0) / 2.0
    }
}

/// A block pairing entities of dataset 1 with entities of dataset 2 (Clean-Clean ER).
///
/// Dataset-2 ids are local to dataset 2, i.e. they are *not* offset by the
/// dataset limit inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilateralBlock {
    pub d1_entities: Vec<usize>,
    pub d2_entities: Vec<usize>,
}

impl BilateralBlock {
    pub fn new(d1_entities: Vec<usize>, d2_entities: Vec<usize>) -> Self {
        Self {
            d1_entities,
            d2_entities,
        }
    }

    pub fn comparisons(&self) -> f64 {
        self.d1_entities.len() as f64 * self.d2_entities.len() as f64
    }
}

/// One entity paired with each of its retained neighbours, as emitted by
/// comparison cleaning. The block implies exactly `neighbors.len()` comparisons.
///
/// In Clean-Clean ER `entity` is a dataset-1 id and `neighbors` are local
/// dataset-2 ids; in Dirty ER all ids belong to the single dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposedBlock {
    pub entity: usize,
    pub neighbors: Vec<usize>,
}

impl DecomposedBlock {
    pub fn new(entity: usize, neighbors: Vec<usize>) -> Self {
        Self { entity, neighbors }
    }

    pub fn comparisons(&self) -> f64 {
        self.neighbors.len() as f64
    }
}

/// A read-only set of candidate blocks, as produced by block building or by a
/// comparison-cleaning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "blocks", rename_all = "snake_case")]
pub enum BlockCollection {
    Unilateral(Vec<UnilateralBlock>),
    Bilateral(Vec<BilateralBlock>),
    Decomposed {
        clean_clean: bool,
        blocks: Vec<DecomposedBlock>,
    },
}

impl BlockCollection {
    pub fn len(&self) -> usize {
        match self {
            BlockCollection::Unilateral(blocks) => blocks.len(),
            BlockCollection::Bilateral(blocks) => blocks.len(),
            BlockCollection::Decomposed { blocks, .. } => blocks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_clean_clean(&self) -> bool {
        match self {
            BlockCollection::Unilateral(_) => false,
            BlockCollection::Bilateral(_) => true,
            BlockCollection::Decomposed { clean_clean, .. } => *clean_clean,
        }
    }

    /// Total comparisons implied by all blocks, duplicates included.
    pub fn total_comparisons(&self) -> f64 {
        // fold from +0.0: an empty f64 sum is -0.0
        let sum = |total: f64, comparisons: f64| total + comparisons;
        match self {
            BlockCollection::Unilateral(blocks) => {
                blocks.iter().map(|b| b.comparisons()).fold(0.0, sum)
            }
            BlockCollection::Bilateral(blocks) => {
                blocks.iter().map(|b| b.comparisons()).fold(0.0, sum)
            }
            BlockCollection::Decomposed { blocks, .. } => {
                blocks.iter().map(|b| b.comparisons()).fold(0.0, sum)
            }
        }
    }

    /// Sum of block sizes over both sides.
    pub fn block_assignments(&self) -> usize {
        match self {
            BlockCollection::Unilateral(blocks) => blocks.iter().map(|b| b.entities.len()).sum(),
            BlockCollection::Bilateral(blocks) => blocks
                .iter()
                .map(|b| b.d1_entities.len() + b.d2_entities.len())
                .sum(),
            BlockCollection::Decomposed { blocks, .. } => {
                blocks.iter().map(|b| 1 + b.neighbors.len()).sum()
            }
        }
    }

    /// Comparisons of the block at `block_id`, if it exists.
    pub fn block_comparisons(&self, block_id: usize) -> Option<f64> {
        match self {
            BlockCollection::Unilateral(blocks) => blocks.get(block_id).map(|b| b.comparisons()),
            BlockCollection::Bilateral(blocks) => blocks.get(block_id).map(|b| b.comparisons()),
            BlockCollection::Decomposed { blocks, .. } => {
                blocks.get(block_id).map(|b| b.comparisons())
            }
        }
    }

    /// Entities that share block `block_id` with `entity` and would be compared
    /// with it: the other side in Clean-Clean ER, every other entity in Dirty ER.
    ///
    /// The result is sorted and free of duplicates. Returns `None` when the
    /// block does not exist.
    pub fn co_occurring(
        &self,
        block_id: usize,
        entity: usize,
        side: DatasetSide,
    ) -> Option<Vec<usize>> {
        let mut neighbors: Vec<usize> = match self {
            BlockCollection::Unilateral(blocks) => blocks
                .get(block_id)?
                .entities
                .iter()
                .copied()
                .filter(|&id| id != entity)
                .collect(),
            BlockCollection::Bilateral(blocks) => {
                let block = blocks.get(block_id)?;
                match side {
                    DatasetSide::First => block.d2_entities.clone(),
                    DatasetSide::Second => block.d1_entities.clone(),
                }
            }
            BlockCollection::Decomposed { clean_clean, blocks } => {
                let block = blocks.get(block_id)?;
                let is_center = !(*clean_clean && side == DatasetSide::Second);
                if is_center && block.entity == entity {
                    block.neighbors.clone()
                } else if (*clean_clean || block.entity != entity)
                    && side_matches_neighbors(*clean_clean, side)
                    && block.neighbors.contains(&entity)
                {
                    vec![block.entity]
                } else {
                    Vec::new()
                }
            }
        };
        neighbors.sort_unstable();
        neighbors.dedup();
        Some(neighbors)
    }

    /// Distinct comparisons implied by the collection: `(min, max)` pairs in
    /// Dirty ER, `(dataset-1 id, dataset-2 id)` pairs in Clean-Clean ER.
    pub fn distinct_comparisons(&self) -> BTreeSet<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        match self {
            BlockCollection::Unilateral(blocks) => {
                for block in blocks {
                    for (i, &a) in block.entities.iter().enumerate() {
                        for &b in &block.entities[i + 1..] {
                            if a != b {
                                pairs.insert((a.min(b), a.max(b)));
                            }
                        }
                    }
                }
            }
            BlockCollection::Bilateral(blocks) => {
                for block in blocks {
                    for &a in &block.d1_entities {
                        for &b in &block.d2_entities {
                            pairs.insert((a, b));
                        }
                    }
                }
            }
            BlockCollection::Decomposed { clean_clean, blocks } => {
                for block in blocks {
                    for &neighbor in &block.neighbors {
                        if *clean_clean {
                            pairs.insert((block.entity, neighbor));
                        } else if neighbor != block.entity {
                            pairs.insert((block.entity.min(neighbor), block.entity.max(neighbor)));
                        }
                    }
                }
            }
        }
        pairs
    }
}

/// In Clean-Clean ER the neighbours of a decomposed block are dataset-2 ids.
fn side_matches_neighbors(clean_clean: bool, side: DatasetSide) -> bool {
    !clean_clean || side == DatasetSide::Second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_comparisons() {
        assert_eq!(UnilateralBlock::new(vec![1, 2, 3]).comparisons(), 3.0);
        assert_eq!(UnilateralBlock::new(vec![7]).comparisons(), 0.0);
        assert_eq!(BilateralBlock::new(vec![0, 1], vec![5, 6, 7]).comparisons(), 6.0);
    }

    #[test]
    fn test_collection_totals() {
        let blocks = BlockCollection::Unilateral(vec![
            UnilateralBlock::new(vec![1, 2, 3]),
            UnilateralBlock::new(vec![2, 3, 4]),
        ]);
        assert_eq!(blocks.len(), 2);
        assert!(!blocks.is_clean_clean());
        assert_eq!(blocks.total_comparisons(), 6.0);
        assert_eq!(blocks.block_assignments(), 6);
        assert_eq!(blocks.block_comparisons(1), Some(3.0));
        assert_eq!(blocks.block_comparisons(2), None);
    }

    #[test]
    fn test_empty_collection_has_zero_comparisons() {
        let empty = BlockCollection::Unilateral(Vec::new());
        assert!(!empty.total_comparisons().is_sign_negative());
        assert_eq!(empty.total_comparisons().to_string(), "0");

        let empty = BlockCollection::Decomposed {
            clean_clean: true,
            blocks: Vec::new(),
        };
        assert_eq!(empty.total_comparisons().to_string(), "0");
    }

    #[test]
    fn test_decomposed_co_occurrence() {
        let dirty = BlockCollection::Decomposed {
            clean_clean: false,
            blocks: vec![DecomposedBlock::new(3, vec![1, 2])],
        };
        assert_eq!(dirty.co_occurring(0, 3, DatasetSide::First), Some(vec![1, 2]));
        assert_eq!(dirty.co_occurring(0, 1, DatasetSide::First), Some(vec![3]));
        // neighbours of the same star are not compared with each other
        assert_eq!(dirty.distinct_comparisons().len(), 2);
        assert_eq!(dirty.co_occurring(1, 3, DatasetSide::First), None);

        let clean = BlockCollection::Decomposed {
            clean_clean: true,
            blocks: vec![DecomposedBlock::new(0, vec![0, 7])],
        };
        assert_eq!(clean.co_occurring(0, 0, DatasetSide::First), Some(vec![0, 7]));
        assert_eq!(clean.co_occurring(0, 0, DatasetSide::Second), Some(vec![0]));
        assert_eq!(clean.co_occurring(0, 7, DatasetSide::First), Some(vec![]));
        assert_eq!(clean.block_assignments(), 3);
    }

    #[test]
    fn test_collection_json_shape() {
        let blocks = BlockCollection::Bilateral(vec![BilateralBlock::new(vec![0], vec![5, 6])]);
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(json["kind"], "bilateral");
        assert_eq!(json["blocks"][0]["d2_entities"][1], 6);

        let parsed: BlockCollection = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, blocks);
    }
}
