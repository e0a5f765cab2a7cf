// src/entity_clustering/mod.rs - Turns scored entity pairs into equivalence clusters

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::BlockingError;
use crate::graph::{ConnectedComponents, UndirectedGraph};
use crate::tuning::{
    DoubleGridSearch, DoubleRandomSearch, ParameterDescription, Tunable, TuningOutcome,
};
use crate::utils::logging::StageLogger;

const METHOD_NAME: &str = "Connected Components Clustering";
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;
const MIN_THRESHOLD: f64 = 0.05;
const MAX_THRESHOLD: f64 = 0.95;
const THRESHOLD_STEP: f64 = 0.05;

/// Scored comparisons produced by an entity matcher, stored column-wise.
///
/// In Clean-Clean ER `entity_ids2` are local dataset-2 ids; in Dirty ER both
/// columns hold ids of the single dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPairs {
    pub clean_clean: bool,
    /// Dataset-1 entity count; dataset-2 ids are offset by it in Clean-Clean ER.
    pub dataset_limit: usize,
    /// Entity count over both datasets.
    pub no_of_entities: usize,
    pub entity_ids1: Vec<usize>,
    pub entity_ids2: Vec<usize>,
    pub similarities: Vec<f64>,
}

impl SimilarityPairs {
    pub fn new(clean_clean: bool, dataset_limit: usize, no_of_entities: usize) -> Self {
        Self {
            clean_clean,
            dataset_limit,
            no_of_entities,
            ..Self::default()
        }
    }

    pub fn push(&mut self, entity_id1: usize, entity_id2: usize, similarity: f64) {
        self.entity_ids1.push(entity_id1);
        self.entity_ids2.push(entity_id2);
        self.similarities.push(similarity);
    }

    pub fn len(&self) -> usize {
        self.similarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.similarities.is_empty()
    }

    /// `(id1, id2, similarity)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.entity_ids1
            .iter()
            .zip(&self.entity_ids2)
            .zip(&self.similarities)
            .map(|((&id1, &id2), &similarity)| (id1, id2, similarity))
    }

    fn check_columns(&self) -> Result<()> {
        if self.entity_ids1.len() != self.len() || self.entity_ids2.len() != self.len() {
            return Err(BlockingError::InvalidParameter(format!(
                "similarity pairs have columns of unequal length ({}, {}, {})",
                self.entity_ids1.len(),
                self.entity_ids2.len(),
                self.similarities.len()
            ))
            .into());
        }
        Ok(())
    }
}

/// Entities judged to describe the same real-world object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivalenceCluster {
    pub d1_entities: Vec<usize>,
    /// Local dataset-2 ids; always empty in Dirty ER.
    pub d2_entities: Vec<usize>,
}

impl EquivalenceCluster {
    pub fn size(&self) -> usize {
        self.d1_entities.len() + self.d2_entities.len()
    }
}

/// Links every pair scoring at least the threshold and returns the connected
/// components as clusters, isolated entities included.
#[derive(Debug, Clone)]
pub struct ConnectedComponentsClustering {
    similarity_threshold: f64,
    grid: DoubleGridSearch,
    random: DoubleRandomSearch,
}

impl Default for ConnectedComponentsClustering {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl ConnectedComponentsClustering {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
            grid: DoubleGridSearch::new(MAX_THRESHOLD, MIN_THRESHOLD, THRESHOLD_STEP),
            random: DoubleRandomSearch::new(MAX_THRESHOLD, MIN_THRESHOLD),
        }
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.random = DoubleRandomSearch::with_seed(MAX_THRESHOLD, MIN_THRESHOLD, seed);
        }
        self
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn get_duplicates(&self, pairs: &SimilarityPairs) -> Result<Vec<EquivalenceCluster>> {
        pairs.check_columns()?;
        let logger = StageLogger::new(METHOD_NAME);
        logger.log_start(&format!(
            "{} pairs, threshold {:.3}",
            pairs.len(),
            self.similarity_threshold
        ));

        if pairs.is_empty() {
            logger.log_warning("No similarity pairs supplied; every entity is a singleton");
        }

        let offset = if pairs.clean_clean {
            pairs.dataset_limit
        } else {
            0
        };
        let mut graph = UndirectedGraph::new(pairs.no_of_entities);
        for (id1, id2, similarity) in pairs.iter() {
            if self.similarity_threshold <= similarity {
                graph.add_edge(id1, id2 + offset)?;
            }
        }
        logger.log_phase(
            "Similarity graph built",
            Some(&format!("{} edges", graph.edge_count())),
        );

        let components = ConnectedComponents::new(&graph);
        let clusters: Vec<EquivalenceCluster> = components
            .components()
            .into_iter()
            .map(|members| {
                let mut cluster = EquivalenceCluster::default();
                for entity in members {
                    if pairs.clean_clean && entity >= pairs.dataset_limit {
                        cluster.d2_entities.push(entity - pairs.dataset_limit);
                    } else {
                        cluster.d1_entities.push(entity);
                    }
                }
                cluster
            })
            .collect();

        let singletons = clusters.iter().filter(|cluster| cluster.size() == 1).count();
        logger.log_clusters(pairs.no_of_entities, clusters.len(), singletons);
        Ok(clusters)
    }
}

impl Tunable for ConnectedComponentsClustering {
    fn method_name(&self) -> &'static str {
        METHOD_NAME
    }

    fn method_info(&self) -> String {
        format!(
            "{}: it gets equivalence clusters from the transitive closure of the similarity graph.",
            METHOD_NAME
        )
    }

    fn method_configuration(&self) -> String {
        format!("Similarity Threshold={}", self.similarity_threshold)
    }

    fn parameter_descriptions(&self) -> Vec<ParameterDescription> {
        vec![ParameterDescription {
            class: "f64".to_string(),
            name: "Similarity Threshold".to_string(),
            default_value: DEFAULT_SIMILARITY_THRESHOLD.to_string(),
            min_value: MIN_THRESHOLD.to_string(),
            max_value: MAX_THRESHOLD.to_string(),
            step_value: THRESHOLD_STEP.to_string(),
            description: "The minimum similarity of an edge in the similarity graph.".to_string(),
        }]
    }

    fn number_of_grid_configurations(&self) -> usize {
        self.grid.number_of_configurations()
    }

    fn set_next_random_configuration(&mut self) -> Result<TuningOutcome> {
        self.similarity_threshold = self.random.next_value();
        Ok(TuningOutcome::Applied)
    }

    fn set_numbered_grid_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        self.similarity_threshold = self.grid.numbered_value(METHOD_NAME, iteration)?;
        Ok(TuningOutcome::Applied)
    }

    fn set_numbered_random_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        self.similarity_threshold = self.random.numbered_value(iteration);
        Ok(TuningOutcome::Applied)
    }
}
