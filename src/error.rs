// src/error.rs

use thiserror::Error;

/// Typed root causes carried inside `anyhow::Error` by the library.
///
/// Callers that need to branch on a failure can `downcast_ref::<BlockingError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockingError {
    /// A grid search was asked for a configuration outside `0..total`.
    #[error("{method}: configuration index {index} is out of range (0..{total})")]
    InvalidConfiguration {
        method: &'static str,
        index: usize,
        total: usize,
    },

    /// The entity index references a block the supplied collection does not hold.
    #[error("block {block_id} is referenced by the entity index but only {total} blocks were supplied")]
    BlockOutOfRange { block_id: usize, total: usize },

    /// Entity index and block collection do not describe the same universe.
    #[error("entity index does not match the supplied blocks: {0}")]
    InconsistentIndex(String),

    /// An edge endpoint lies outside the graph.
    #[error("vertex {vertex} is outside a graph of {vertices} vertices")]
    VertexOutOfRange { vertex: usize, vertices: usize },

    /// A text model received an update after it was finalized.
    #[error("text model '{0}' is finalized and accepts no further updates")]
    ModelFinalized(String),

    /// A method, scheme or model name that could not be parsed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
