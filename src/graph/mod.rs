// src/graph/mod.rs
pub mod connected_components;
pub mod undirected;

pub use connected_components::ConnectedComponents;
pub use undirected::UndirectedGraph;
