// src/comparison_cleaning/weighting.rs - Edge weighting schemes of the blocking graph

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::datamodel::{BlockCollection, DatasetSide, EntityBlockIndex, WeightedNode};
use crate::error::BlockingError;
use crate::tuning::{IntGridSearch, IntRandomSearch, ParameterDescription};

/// How the co-occurrence of two entities is turned into an edge weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightingScheme {
    /// Aggregate Reciprocal Comparisons: sum of 1/‖b‖ over common blocks.
    #[default]
    #[serde(rename = "ARCS")]
    Arcs,
    /// Common Blocks: number of shared blocks.
    #[serde(rename = "CBS")]
    Cbs,
    /// Enhanced Common Blocks: CBS discounted by how many blocks each entity is in.
    #[serde(rename = "ECBS")]
    Ecbs,
    /// Jaccard overlap of the two block lists.
    #[serde(rename = "JS")]
    Js,
}

impl WeightingScheme {
    pub const ALL: [WeightingScheme; 4] = [
        WeightingScheme::Arcs,
        WeightingScheme::Cbs,
        WeightingScheme::Ecbs,
        WeightingScheme::Js,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeightingScheme::Arcs => "ARCS",
            WeightingScheme::Cbs => "CBS",
            WeightingScheme::Ecbs => "ECBS",
            WeightingScheme::Js => "JS",
        }
    }

    fn from_ordinal(ordinal: i64) -> Self {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(WeightingScheme::Arcs)
    }
}

impl fmt::Display for WeightingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingScheme {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARCS" => Ok(WeightingScheme::Arcs),
            "CBS" => Ok(WeightingScheme::Cbs),
            "ECBS" => Ok(WeightingScheme::Ecbs),
            "JS" => Ok(WeightingScheme::Js),
            _ => Err(BlockingError::InvalidParameter(format!(
                "unknown weighting scheme '{}'",
                s
            ))),
        }
    }
}

/// Translate a flat id back to `(local id, side)`.
pub(crate) fn local_id(index: &EntityBlockIndex, global: usize) -> (usize, DatasetSide) {
    if index.is_clean_clean() && global >= index.dataset_limit() {
        (global - index.dataset_limit(), DatasetSide::Second)
    } else {
        (global, DatasetSide::First)
    }
}

fn opposite(index: &EntityBlockIndex, side: DatasetSide) -> DatasetSide {
    match (index.is_clean_clean(), side) {
        (true, DatasetSide::First) => DatasetSide::Second,
        _ => DatasetSide::First,
    }
}

/// Build the `WeightedNode` of the entity with flat id `node`.
///
/// Neighbour ids in the result are flat ids as well, so nodes of both sides
/// can be compared directly.
pub fn build_weighted_node(
    blocks: &BlockCollection,
    index: &EntityBlockIndex,
    scheme: WeightingScheme,
    node: usize,
) -> Result<WeightedNode> {
    let (entity, side) = local_id(index, node);
    let neighbor_side = opposite(index, side);
    let entity_blocks = index.entity_blocks(entity, side);

    // (common blocks, sum of reciprocal block comparisons)
    let mut co_occurrence: HashMap<usize, (usize, f64)> = HashMap::new();
    for &block_id in entity_blocks {
        let out_of_range = || BlockingError::BlockOutOfRange {
            block_id,
            total: blocks.len(),
        };
        let comparisons = blocks.block_comparisons(block_id).ok_or_else(out_of_range)?;
        let neighbors = blocks
            .co_occurring(block_id, entity, side)
            .ok_or_else(out_of_range)?;
        for neighbor in neighbors {
            let entry = co_occurrence
                .entry(index.global_id(neighbor, neighbor_side))
                .or_insert((0, 0.0));
            entry.0 += 1;
            if comparisons > 0.0 {
                entry.1 += 1.0 / comparisons;
            }
        }
    }

    let no_of_blocks = index.no_of_blocks() as f64;
    let entity_block_count = entity_blocks.len() as f64;
    let neighbor_weights = co_occurrence
        .into_iter()
        .map(|(neighbor, (common, arcs))| {
            let common = common as f64;
            let weight = match scheme {
                WeightingScheme::Arcs => arcs,
                WeightingScheme::Cbs => common,
                WeightingScheme::Ecbs => {
                    let (local, neighbor_side) = local_id(index, neighbor);
                    let neighbor_blocks = index.no_of_entity_blocks(local, neighbor_side) as f64;
                    common
                        * (no_of_blocks / entity_block_count).log10()
                        * (no_of_blocks / neighbor_blocks).log10()
                }
                WeightingScheme::Js => {
                    let (local, neighbor_side) = local_id(index, neighbor);
                    let neighbor_blocks = index.no_of_entity_blocks(local, neighbor_side) as f64;
                    common / (entity_block_count + neighbor_blocks - common)
                }
            };
            (neighbor, weight)
        })
        .collect();

    Ok(WeightedNode::from_neighbors(node, neighbor_weights))
}

/// Grid and random search over the four weighting schemes.
#[derive(Debug, Clone)]
pub(crate) struct SchemeSearch {
    grid: IntGridSearch,
    random: IntRandomSearch,
}

impl SchemeSearch {
    pub(crate) fn new(seed: Option<u64>) -> Self {
        let last = WeightingScheme::ALL.len() as i64;
        let random = match seed {
            Some(seed) => IntRandomSearch::with_seed(last, 0, seed),
            None => IntRandomSearch::new(last, 0),
        };
        Self {
            grid: IntGridSearch::new(last - 1, 0, 1),
            random,
        }
    }

    pub(crate) fn number_of_configurations(&self) -> usize {
        self.grid.number_of_configurations()
    }

    pub(crate) fn grid_scheme(
        &self,
        method: &'static str,
        iteration: usize,
    ) -> Result<WeightingScheme> {
        let ordinal = self.grid.numbered_value(method, iteration)?;
        Ok(WeightingScheme::from_ordinal(ordinal))
    }

    pub(crate) fn next_random_scheme(&mut self) -> WeightingScheme {
        WeightingScheme::from_ordinal(self.random.next_value())
    }

    pub(crate) fn numbered_random_scheme(&self, iteration: usize) -> WeightingScheme {
        WeightingScheme::from_ordinal(self.random.numbered_value(iteration))
    }

    pub(crate) fn description() -> ParameterDescription {
        ParameterDescription {
            class: "WeightingScheme".to_string(),
            name: "Weighting Scheme".to_string(),
            default_value: WeightingScheme::default().to_string(),
            min_value: "-".to_string(),
            max_value: "-".to_string(),
            step_value: "-".to_string(),
            description: "The weighting scheme that assigns weights to the edges of the blocking graph."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::{BilateralBlock, UnilateralBlock};

    fn dirty_blocks() -> BlockCollection {
        BlockCollection::Unilateral(vec![
            UnilateralBlock::new(vec![0, 1, 2]),
            UnilateralBlock::new(vec![0, 1]),
            UnilateralBlock::new(vec![2, 3]),
            UnilateralBlock::new(vec![3, 4]),
        ])
    }

    fn weight(scheme: WeightingScheme, node: usize, neighbor: usize) -> f64 {
        let blocks = dirty_blocks();
        let index = EntityBlockIndex::from_blocks(&blocks);
        build_weighted_node(&blocks, &index, scheme, node)
            .unwrap()
            .neighbor_weight(neighbor)
            .unwrap()
    }

    #[test]
    fn test_common_blocks_and_arcs() {
        assert_eq!(weight(WeightingScheme::Cbs, 0, 1), 2.0);
        assert_eq!(weight(WeightingScheme::Cbs, 0, 2), 1.0);
        // block 0 implies 3 comparisons, block 1 implies 1
        assert!((weight(WeightingScheme::Arcs, 0, 1) - (1.0 / 3.0 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_and_enhanced_common_blocks() {
        // |B0| = 2, |B2| = 2, one shared block
        assert!((weight(WeightingScheme::Js, 0, 2) - 1.0 / 3.0).abs() < 1e-12);
        let expected = 1.0 * (4.0f64 / 2.0).log10() * (4.0f64 / 2.0).log10();
        assert!((weight(WeightingScheme::Ecbs, 0, 2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_clean_clean_node_uses_flat_ids() {
        let blocks = BlockCollection::Bilateral(vec![
            BilateralBlock::new(vec![0, 1], vec![0]),
            BilateralBlock::new(vec![0], vec![0, 1]),
        ]);
        let index = EntityBlockIndex::from_blocks(&blocks);
        assert_eq!(index.dataset_limit(), 2);

        let node = build_weighted_node(&blocks, &index, WeightingScheme::Cbs, 0).unwrap();
        assert_eq!(node.neighbor_weight(2), Some(2.0));
        assert_eq!(node.neighbor_weight(3), Some(1.0));
        assert_eq!(node.degree(), 2);

        // dataset-2 entity 1 has flat id 3 and only meets entity 0
        let node = build_weighted_node(&blocks, &index, WeightingScheme::Cbs, 3).unwrap();
        assert_eq!(node.neighbor_weight(0), Some(1.0));
        assert_eq!(node.degree(), 1);
    }

    #[test]
    fn test_scheme_search_covers_all_schemes() {
        let mut search = SchemeSearch::new(Some(11));
        assert_eq!(search.number_of_configurations(), 4);
        let grid: Vec<WeightingScheme> = (0..4)
            .map(|i| search.grid_scheme("Cardinality Node Pruning", i).unwrap())
            .collect();
        assert_eq!(grid, WeightingScheme::ALL.to_vec());
        assert!(search.grid_scheme("Cardinality Node Pruning", 4).is_err());
        assert_eq!(search.numbered_random_scheme(5), search.numbered_random_scheme(5));
        assert!(WeightingScheme::ALL.contains(&search.next_random_scheme()));
    }

    #[test]
    fn test_scheme_names() {
        assert_eq!("ecbs".parse::<WeightingScheme>(), Ok(WeightingScheme::Ecbs));
        assert!("EJS".parse::<WeightingScheme>().is_err());
        assert_eq!(serde_json::to_string(&WeightingScheme::Js).unwrap(), "\"JS\"");
        assert_eq!(WeightingScheme::default(), WeightingScheme::Arcs);
    }
}
