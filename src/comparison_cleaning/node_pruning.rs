// src/comparison_cleaning/node_pruning.rs - Shared pass of the node-centric pruning strategies

use anyhow::Result;
use std::collections::HashSet;

use crate::comparison_cleaning::weighting::{build_weighted_node, local_id};
use crate::comparison_cleaning::{decomposed_block, driving_entities, WeightingScheme};
use crate::datamodel::{BlockCollection, EntityBlockIndex, WeightedNode};
use crate::utils::logging::StageLogger;

/// Run one node-centric pruning pass.
///
/// `retain` picks, for every node, the flat ids of the neighbours it keeps.
/// A pair survives when both endpoints keep each other (`reciprocal`) or when
/// either one does.
pub(crate) fn prune_nodes<F>(
    blocks: &BlockCollection,
    index: &EntityBlockIndex,
    scheme: WeightingScheme,
    reciprocal: bool,
    logger: &StageLogger,
    retain: F,
) -> Result<BlockCollection>
where
    F: Fn(&WeightedNode) -> HashSet<usize>,
{
    index.validate_against(blocks)?;
    let clean_clean = blocks.is_clean_clean();
    logger.log_blocks_in(blocks.len(), blocks.total_comparisons(), clean_clean);

    let no_of_nodes = index.no_of_entities();
    let mut nodes = Vec::with_capacity(no_of_nodes);
    let mut retained = Vec::with_capacity(no_of_nodes);
    for node in 0..no_of_nodes {
        let weighted = build_weighted_node(blocks, index, scheme, node)?;
        retained.push(retain(&weighted));
        nodes.push(weighted);
    }
    logger.log_phase(
        "Weighted nodes built",
        Some(&format!("{} nodes, scheme {}", no_of_nodes, scheme)),
    );

    let mut new_blocks = Vec::new();
    for entity in 0..driving_entities(index) {
        let mut kept = HashSet::new();
        for &neighbor in nodes[entity].neighbor_weights().keys() {
            if !clean_clean && neighbor >= entity {
                continue;
            }
            let by_entity = retained[entity].contains(&neighbor);
            let by_neighbor = retained
                .get(neighbor)
                .map_or(false, |kept_by_neighbor| kept_by_neighbor.contains(&entity));
            let survives = if reciprocal {
                by_entity && by_neighbor
            } else {
                by_entity || by_neighbor
            };
            if survives {
                kept.insert(local_id(index, neighbor).0);
            }
        }
        if !kept.is_empty() {
            new_blocks.push(decomposed_block(entity, kept));
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
