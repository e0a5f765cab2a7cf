// src/datamodel/entity_index.rs

use anyhow::Result;
use log::debug;

use crate::datamodel::block::{BlockCollection, DatasetSide};
use crate::error::BlockingError;

/// Maps every entity to the ids of the blocks that contain it.
///
/// Dataset-2 entities are addressed by their local id together with
/// `DatasetSide::Second`; `global_id` gives the flat id (offset by the dataset
/// limit) used by graph-based strategies.
#[derive(Debug, Clone)]
pub struct EntityBlockIndex {
    side1: Vec<Vec<usize>>,
    side2: Option<Vec<Vec<usize>>>,
    no_of_blocks: usize,
}

impl EntityBlockIndex {
    /// Build the index that exactly reflects `blocks`.
    pub fn from_blocks(blocks: &BlockCollection) -> Self {
        let index = match blocks {
            BlockCollection::Unilateral(blocks) => {
                let mut side1 = Vec::new();
                for (block_id, block) in blocks.iter().enumerate() {
                    for &entity in &block.entities {
                        push_block(&mut side1, entity, block_id);
                    }
                }
                Self {
                    side1,
                    side2: None,
                    no_of_blocks: blocks.len(),
                }
            }
            BlockCollection::Bilateral(blocks) => {
                let mut side1 = Vec::new();
                let mut side2 = Vec::new();
                for (block_id, block) in blocks.iter().enumerate() {
                    for &entity in &block.d1_entities {
                        push_block(&mut side1, entity, block_id);
                    }
                    for &entity in &block.d2_entities {
                        push_block(&mut side2, entity, block_id);
                    }
                }
                Self {
                    side1,
                    side2: Some(side2),
                    no_of_blocks: blocks.len(),
                }
            }
            BlockCollection::Decomposed {
                clean_clean,
                blocks,
            } => {
                let mut side1 = Vec::new();
                let mut side2 = Vec::new();
                for (block_id, block) in blocks.iter().enumerate() {
                    push_block(&mut side1, block.entity, block_id);
                    let neighbor_side = if *clean_clean { &mut side2 } else { &mut side1 };
                    for &entity in &block.neighbors {
                        push_block(neighbor_side, entity, block_id);
                    }
                }
                Self {
                    side1,
                    side2: clean_clean.then_some(side2),
                    no_of_blocks: blocks.len(),
                }
            }
        };
        debug!(
            "Entity index built: {} entities over {} blocks (clean-clean: {})",
            index.no_of_entities(),
            index.no_of_blocks,
            index.is_clean_clean()
        );
        index
    }

    /// Wrap block lists produced elsewhere (e.g. by the block-building stage).
    pub fn from_parts(
        side1: Vec<Vec<usize>>,
        side2: Option<Vec<Vec<usize>>>,
        no_of_blocks: usize,
    ) -> Self {
        Self {
            side1,
            side2,
            no_of_blocks,
        }
    }

    /// Block ids containing the entity; empty when the entity is in no block.
    pub fn entity_blocks(&self, entity_id: usize, side: DatasetSide) -> &[usize] {
        let lists = match side {
            DatasetSide::First => Some(&self.side1),
            DatasetSide::Second => self.side2.as_ref(),
        };
        lists
            .and_then(|lists| lists.get(entity_id))
            .map(|blocks| blocks.as_slice())
            .unwrap_or(&[])
    }

    pub fn no_of_entity_blocks(&self, entity_id: usize, side: DatasetSide) -> usize {
        self.entity_blocks(entity_id, side).len()
    }

    /// Number of dataset-1 entities; dataset-2 ids start here in the flat id space.
    pub fn dataset_limit(&self) -> usize {
        self.side1.len()
    }

    pub fn no_of_entities(&self) -> usize {
        self.side1.len() + self.side2.as_ref().map_or(0, |side2| side2.len())
    }

    pub fn no_of_blocks(&self) -> usize {
        self.no_of_blocks
    }

    pub fn is_clean_clean(&self) -> bool {
        self.side2.is_some()
    }

    /// Flat id of an entity: dataset-2 ids are offset by the dataset limit.
    pub fn global_id(&self, entity_id: usize, side: DatasetSide) -> usize {
        match side {
            DatasetSide::First => entity_id,
            DatasetSide::Second => entity_id + self.dataset_limit(),
        }
    }

    /// Fail fast when the index was not built for `blocks`.
    pub fn validate_against(&self, blocks: &BlockCollection) -> Result<()> {
        if self.is_clean_clean() != blocks.is_clean_clean() {
            return Err(BlockingError::InconsistentIndex(format!(
                "index is {} but blocks are {}",
                describe(self.is_clean_clean()),
                describe(blocks.is_clean_clean())
            ))
            .into());
        }
        if self.no_of_blocks != blocks.len() {
            return Err(BlockingError::InconsistentIndex(format!(
                "index covers {} blocks but {} were supplied",
                self.no_of_blocks,
                blocks.len()
            ))
            .into());
        }
        Ok(())
    }
}

fn push_block(lists: &mut Vec<Vec<usize>>, entity: usize, block_id: usize) {
    if lists.len() <= entity {
        lists.resize_with(entity + 1, Vec::new);
    }
    let blocks = &mut lists[entity];
    // an entity listed twice in one block still belongs to it once
    if blocks.last() != Some(&block_id) {
        blocks.push(block_id);
    }
}

fn describe(clean_clean: bool) -> &'static str {
    if clean_clean {
        "bilateral"
    } else {
        "unilateral"
    }
}
