// src/tuning/mod.rs
//! Grid and random search over the configuration space of a method.
//!
//! Every cleaning or clustering method implements [`Tunable`], so a generic
//! tuning loop can drive heterogeneous methods. Parameter-free methods answer
//! with [`TuningOutcome::Unsupported`] instead of failing.

pub mod grid;
pub mod random;

pub use grid::{DoubleGridSearch, IntGridSearch};
pub use random::{DoubleRandomSearch, IntRandomSearch};

use anyhow::Result;
use log::warn;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub const PARAMETER_FREE: &str = "Parameter-free method";

/// Result of asking a method to adopt a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningOutcome {
    /// The configuration was applied.
    Applied,
    /// The method has no parameters; nothing changed.
    Unsupported,
}

/// Machine-readable description of one tunable parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescription {
    pub class: String,
    pub name: String,
    pub default_value: String,
    pub min_value: String,
    pub max_value: String,
    pub step_value: String,
    pub description: String,
}

pub trait Tunable {
    fn method_name(&self) -> &'static str;

    fn method_info(&self) -> String;

    /// Human-readable summary of the parameters the method takes.
    fn method_parameters(&self) -> String {
        let descriptions = self.parameter_descriptions();
        if descriptions.is_empty() {
            return format!("{} is a {}.", self.method_name(), PARAMETER_FREE);
        }
        let mut text = format!(
            "{} involves {} parameter{}:",
            self.method_name(),
            descriptions.len(),
            if descriptions.len() == 1 { "" } else { "s" }
        );
        for (i, parameter) in descriptions.iter().enumerate() {
            text.push_str(&format!("\n{}) {}", i + 1, parameter.description));
        }
        text
    }

    /// Current configuration, e.g. `Weighting Scheme=ARCS`.
    fn method_configuration(&self) -> String;

    fn parameter_descriptions(&self) -> Vec<ParameterDescription>;

    fn parameter_configuration(&self) -> JsonValue {
        serde_json::to_value(self.parameter_descriptions()).unwrap_or(JsonValue::Null)
    }

    fn number_of_grid_configurations(&self) -> usize;

    fn set_next_random_configuration(&mut self) -> Result<TuningOutcome>;

    fn set_numbered_grid_configuration(&mut self, iteration: usize) -> Result<TuningOutcome>;

    fn set_numbered_random_configuration(&mut self, iteration: usize) -> Result<TuningOutcome>;
}

/// Report a search request a parameter-free method cannot honour.
pub fn inapplicable_search(method_name: &str, search: &str) -> TuningOutcome {
    warn!(
        "{} search is inapplicable! {} is a parameter-free method!",
        search, method_name
    );
    TuningOutcome::Unsupported
}
