// src/utils/config.rs - Pipeline configuration read from the environment

use log::{debug, info, warn};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::comparison_cleaning::{CleaningMethod, WeightingScheme};
use crate::schema_clustering::{AttributeSource, RepresentationModel, SimilarityMetric};

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub cleaning_method: CleaningMethod,
    pub weighting_scheme: WeightingScheme,
    pub attribute_source: AttributeSource,
    pub representation_model: RepresentationModel,
    pub similarity_metric: SimilarityMetric,
    pub similarity_threshold: f64,
    /// Seed of the random-search streams; entropy when unset.
    pub random_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cleaning_method: CleaningMethod::ComparisonPropagation,
            weighting_scheme: WeightingScheme::Arcs,
            attribute_source: AttributeSource::Value,
            representation_model: RepresentationModel::TokenUnigrams,
            similarity_metric: SimilarityMetric::Jaccard,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            random_seed: None,
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            cleaning_method: parse_or(&lookup, "CLEANING_METHOD", defaults.cleaning_method),
            weighting_scheme: parse_or(&lookup, "WEIGHTING_SCHEME", defaults.weighting_scheme),
            attribute_source: parse_or(
                &lookup,
                "SCHEMA_ATTRIBUTE_SOURCE",
                defaults.attribute_source,
            ),
            representation_model: parse_or(
                &lookup,
                "SCHEMA_REPRESENTATION_MODEL",
                defaults.representation_model,
            ),
            similarity_metric: parse_or(
                &lookup,
                "SCHEMA_SIMILARITY_METRIC",
                defaults.similarity_metric,
            ),
            similarity_threshold: parse_or(
                &lookup,
                "CLUSTERING_SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            ),
            random_seed: lookup("TUNING_RANDOM_SEED").and_then(|raw| match raw.trim().parse() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    warn!(
                        "Ignoring TUNING_RANDOM_SEED='{}': not an unsigned integer, using entropy",
                        raw
                    );
                    None
                }
            }),
        };
        debug!("Pipeline config: {:?}", config);
        config
    }

    pub fn log_config(&self) {
        info!("⚙️  Pipeline configuration");
        info!("   Comparison cleaning: {} ({})", self.cleaning_method, self.weighting_scheme);
        info!(
            "   Schema clustering: source={}, model={}, metric={}",
            self.attribute_source, self.representation_model, self.similarity_metric
        );
        info!("   Entity clustering threshold: {}", self.similarity_threshold);
        match self.random_seed {
            Some(seed) => info!("   Random search seed: {}", seed),
            None => info!("   Random search seed: entropy"),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}='{}', falling back to {}", key, raw, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> PipelineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        assert_eq!(config_from(&[]), PipelineConfig::default());
    }

    #[test]
    fn test_env_config() {
        let config = config_from(&[
            ("CLEANING_METHOD", "rcnp"),
            ("WEIGHTING_SCHEME", "js"),
            ("SCHEMA_ATTRIBUTE_SOURCE", "holistic"),
            ("SCHEMA_REPRESENTATION_MODEL", "character-trigrams"),
            ("SCHEMA_SIMILARITY_METRIC", "cosine"),
            ("CLUSTERING_SIMILARITY_THRESHOLD", "0.75"),
            ("TUNING_RANDOM_SEED", "42"),
        ]);
        assert_eq!(
            config.cleaning_method,
            CleaningMethod::ReciprocalCardinalityNodePruning
        );
        assert_eq!(config.weighting_scheme, WeightingScheme::Js);
        assert_eq!(config.attribute_source, AttributeSource::Holistic);
        assert_eq!(
            config.representation_model,
            RepresentationModel::CharacterTrigrams
        );
        assert_eq!(config.similarity_metric, SimilarityMetric::Cosine);
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.random_seed, Some(42));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("CLEANING_METHOD", "meta-magic"),
            ("CLUSTERING_SIMILARITY_THRESHOLD", "high"),
            ("TUNING_RANDOM_SEED", "-1"),
        ]);
        assert_eq!(config.cleaning_method, CleaningMethod::ComparisonPropagation);
        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.random_seed, None);
    }
}
