// src/lib.rs
pub mod comparison_cleaning;
pub mod datamodel;
pub mod entity_clustering;
pub mod error;
pub mod graph;
pub mod schema_clustering;
pub mod tuning;
pub mod utils;

pub use error::BlockingError;
