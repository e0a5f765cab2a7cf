// src/datamodel/mod.rs
pub mod block;
pub mod entity_index;
pub mod profile;
pub mod weighted_node;

pub use block::{BilateralBlock, BlockCollection, DatasetSide, DecomposedBlock, UnilateralBlock};
pub use entity_index::EntityBlockIndex;
pub use profile::{Attribute, EntityProfile};
pub use weighted_node::WeightedNode;
