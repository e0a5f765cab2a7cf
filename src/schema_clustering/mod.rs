// src/schema_clustering/mod.rs - Groups similar attributes of one or two datasets
//! Attribute clustering builds one `TextModel` per attribute name and side,
//! links every attribute to its most similar partner and returns the connected
//! components of that nearest-neighbour graph. Attributes left alone in their
//! component share the glue cluster `component count + 1`.

pub mod text_model;

pub use text_model::{
    ModelFactory, ModelMetricCombo, NGramModel, NGramModelFactory, RepresentationModel,
    SimilarityMetric, TextModel,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::datamodel::{Attribute, DatasetSide, EntityProfile};
use crate::error::BlockingError;
use crate::graph::{ConnectedComponents, UndirectedGraph};
use crate::tuning::{IntGridSearch, IntRandomSearch, ParameterDescription, Tunable, TuningOutcome};
use crate::utils::logging::StageLogger;

/// Cluster id per attribute name; one map per dataset.
pub type AttributeClusters = HashMap<String, usize>;

/// What part of each attribute feeds its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSource {
    Name,
    Value,
    Holistic,
}

impl AttributeSource {
    pub fn method_name(self) -> &'static str {
        match self {
            AttributeSource::Name => "Attribute Name Clustering",
            AttributeSource::Value => "Attribute Value Clustering",
            AttributeSource::Holistic => "Holistic Attribute Clustering",
        }
    }

    fn text(self, attribute: &Attribute) -> String {
        match self {
            AttributeSource::Name => attribute.name.clone(),
            AttributeSource::Value => attribute.value.clone(),
            AttributeSource::Holistic => format!("{} {}", attribute.name, attribute.value),
        }
    }
}

impl fmt::Display for AttributeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeSource::Name => "name",
            AttributeSource::Value => "value",
            AttributeSource::Holistic => "holistic",
        })
    }
}

impl FromStr for AttributeSource {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(AttributeSource::Name),
            "value" => Ok(AttributeSource::Value),
            "holistic" => Ok(AttributeSource::Holistic),
            _ => Err(BlockingError::InvalidParameter(format!(
                "unknown attribute source '{}'",
                s
            ))),
        }
    }
}

/// Best partner found so far for one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BestMatch {
    similarity: f64,
    partner: usize,
}

/// Offer `candidate` as the best match of `attribute`; equal similarities keep the smaller id.
fn offer(best: &mut [Option<BestMatch>], attribute: usize, candidate: usize, similarity: f64) {
    let updated = match best[attribute] {
        Some(found) if found.similarity > similarity => found,
        Some(found) if found.similarity == similarity => BestMatch {
            partner: found.partner.min(candidate),
            ..found
        },
        _ => BestMatch {
            similarity,
            partner: candidate,
        },
    };
    best[attribute] = Some(updated);
}

/// One comparison updates the records of both attributes.
fn record_similarity(best: &mut [Option<BestMatch>], a: usize, b: usize, similarity: f64) {
    if similarity <= 0.0 {
        return;
    }
    offer(best, a, b, similarity);
    offer(best, b, a, similarity);
}

/// One finalized model per distinct attribute name, in first-seen order.
fn build_attribute_models<F: ModelFactory>(
    factory: &F,
    side: DatasetSide,
    profiles: &[EntityProfile],
    source: AttributeSource,
) -> Result<Vec<F::Model>> {
    let mut name_index: HashMap<&str, usize> = HashMap::new();
    let mut models = Vec::new();
    for profile in profiles {
        for attribute in &profile.attributes {
            if !name_index.contains_key(attribute.name.as_str()) {
                name_index.insert(attribute.name.as_str(), models.len());
                models.push(factory.create_model(side, &attribute.name));
            }
        }
    }

    for profile in profiles {
        for attribute in &profile.attributes {
            let model_id = name_index[attribute.name.as_str()];
            models[model_id].update(&source.text(attribute))?;
        }
    }

    for model in models.iter_mut() {
        model.finalize_model();
    }
    Ok(models)
}

/// Signature → ids of the models producing it.
fn build_inverted_index<M: TextModel>(models: &[M]) -> HashMap<&str, Vec<usize>> {
    let mut inverted_index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (model_id, model) in models.iter().enumerate() {
        for signature in model.signatures() {
            inverted_index
                .entry(signature.as_str())
                .or_default()
                .push(model_id);
        }
    }
    inverted_index
}

fn co_occurring_attributes<M: TextModel>(
    model: &M,
    inverted_index: &HashMap<&str, Vec<usize>>,
) -> BTreeSet<usize> {
    let mut candidates = BTreeSet::new();
    for signature in model.signatures() {
        if let Some(postings) = inverted_index.get(signature.as_str()) {
            candidates.extend(postings.iter().copied());
        }
    }
    candidates
}

/// Cluster the attributes of `d1` (and `d2` in Clean-Clean ER) with models
/// from `factory`. Returns one name → cluster id map per dataset.
pub fn cluster_attributes<F: ModelFactory>(
    factory: &F,
    source: AttributeSource,
    d1: &[EntityProfile],
    d2: Option<&[EntityProfile]>,
) -> Result<Vec<AttributeClusters>> {
    let logger = StageLogger::new(source.method_name());
    logger.log_start(&format!(
        "{} profiles in dataset 1, {} in dataset 2",
        d1.len(),
        d2.map_or(0, |profiles| profiles.len())
    ));

    let models1 = build_attribute_models(factory, DatasetSide::First, d1, source)?;
    let models2 = d2
        .map(|profiles| build_attribute_models(factory, DatasetSide::Second, profiles, source))
        .transpose()?;
    let delimiter = models1.len();
    let no_of_attributes = delimiter + models2.as_ref().map_or(0, |models| models.len());
    if no_of_attributes == 0 {
        logger.log_warning("No attributes found in the supplied profiles");
    }
    logger.log_phase(
        "Attribute models built",
        Some(&format!("{} attributes", no_of_attributes)),
    );

    let mut best: Vec<Option<BestMatch>> = vec![None; no_of_attributes];
    match &models2 {
        Some(models2) => {
            let inverted_index = build_inverted_index(models2);
            for (i, model) in models1.iter().enumerate() {
                for j in co_occurring_attributes(model, &inverted_index) {
                    let similarity = model.similarity(&models2[j]);
                    record_similarity(&mut best, i, delimiter + j, similarity);
                }
            }
        }
        None => {
            let inverted_index = build_inverted_index(&models1);
            for (i, model) in models1.iter().enumerate() {
                for j in co_occurring_attributes(model, &inverted_index) {
                    if j <= i {
                        continue;
                    }
                    let similarity = model.similarity(&models1[j]);
                    record_similarity(&mut best, i, j, similarity);
                }
            }
        }
    }

    let mut graph = UndirectedGraph::new(no_of_attributes);
    for (attribute, found) in best.iter().enumerate() {
        if let Some(found) = found {
            graph.add_edge(attribute, found.partner)?;
        }
    }
    logger.log_phase(
        "Similarity graph built",
        Some(&format!("{} edges", graph.edge_count())),
    );

    let components = ConnectedComponents::new(&graph);
    let glue_cluster_id = components.count() + 1;
    let cluster_of = |attribute: usize| {
        if components.size(attribute) == 1 {
            glue_cluster_id
        } else {
            components.id(attribute)
        }
    };

    let mut clusters = vec![models1
        .iter()
        .enumerate()
        .map(|(i, model)| (model.instance_name().to_string(), cluster_of(i)))
        .collect::<AttributeClusters>()];
    if let Some(models2) = &models2 {
        clusters.push(
            models2
                .iter()
                .enumerate()
                .map(|(j, model)| (model.instance_name().to_string(), cluster_of(delimiter + j)))
                .collect(),
        );
    }

    let singletons = (0..no_of_attributes)
        .filter(|&attribute| components.size(attribute) == 1)
        .count();
    logger.log_clusters(
        no_of_attributes,
        components.count() - singletons,
        singletons,
    );
    Ok(clusters)
}

/// Attribute clustering over the built-in n-gram models.
#[derive(Debug, Clone)]
pub struct AttributeClustering {
    source: AttributeSource,
    representation: RepresentationModel,
    metric: SimilarityMetric,
    combos: Vec<ModelMetricCombo>,
    grid: IntGridSearch,
    random: IntRandomSearch,
}

impl AttributeClustering {
    pub fn new(
        source: AttributeSource,
        representation: RepresentationModel,
        metric: SimilarityMetric,
    ) -> Self {
        let combos = ModelMetricCombo::all_valid();
        let last = combos.len() as i64;
        Self {
            source,
            representation,
            metric,
            grid: IntGridSearch::new(last - 1, 0, 1),
            random: IntRandomSearch::new(last, 0),
            combos,
        }
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.random = IntRandomSearch::with_seed(self.combos.len() as i64, 0, seed);
        }
        self
    }

    pub fn representation_model(&self) -> RepresentationModel {
        self.representation
    }

    pub fn similarity_metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub fn get_clusters(
        &self,
        d1: &[EntityProfile],
        d2: Option<&[EntityProfile]>,
    ) -> Result<Vec<AttributeClusters>> {
        let factory = NGramModelFactory::new(self.representation, self.metric);
        cluster_attributes(&factory, self.source, d1, d2)
    }

    fn apply_combo(&mut self, combo_id: i64) -> TuningOutcome {
        let combo = usize::try_from(combo_id)
            .ok()
            .and_then(|i| self.combos.get(i).copied());
        match combo {
            Some(combo) => {
                self.representation = combo.representation;
                self.metric = combo.metric;
                TuningOutcome::Applied
            }
            None => TuningOutcome::Unsupported,
        }
    }
}

impl Tunable for AttributeClustering {
    fn method_name(&self) -> &'static str {
        self.source.method_name()
    }

    fn method_info(&self) -> String {
        format!(
            "{}: it clusters together attributes with similar {} and places every unmatched attribute in a glue cluster.",
            self.method_name(),
            match self.source {
                AttributeSource::Name => "names",
                AttributeSource::Value => "values",
                AttributeSource::Holistic => "names and values",
            }
        )
    }

    fn method_configuration(&self) -> String {
        format!(
            "Representation Model={}\tSimilarity Measure={}",
            self.representation, self.metric
        )
    }

    fn parameter_descriptions(&self) -> Vec<ParameterDescription> {
        vec![
            ParameterDescription {
                class: "RepresentationModel".to_string(),
                name: "Representation Model".to_string(),
                default_value: RepresentationModel::TokenUnigrams.to_string(),
                min_value: "-".to_string(),
                max_value: "-".to_string(),
                step_value: "-".to_string(),
                description: "The Representation Model aggregates the textual items that correspond to every attribute."
                    .to_string(),
            },
            ParameterDescription {
                class: "SimilarityMetric".to_string(),
                name: "Similarity Measure".to_string(),
                default_value: SimilarityMetric::Jaccard.to_string(),
                min_value: "-".to_string(),
                max_value: "-".to_string(),
                step_value: "-".to_string(),
                description: "The Similarity Measure compares the models of two attributes, returning a value between 0 (completely dissimilar) and 1 (identical)."
                    .to_string(),
            },
        ]
    }

    fn number_of_grid_configurations(&self) -> usize {
        self.grid.number_of_configurations()
    }

    fn set_next_random_configuration(&mut self) -> Result<TuningOutcome> {
        let combo_id = self.random.next_value();
        Ok(self.apply_combo(combo_id))
    }

    fn set_numbered_grid_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        let combo_id = self.grid.numbered_value(self.method_name(), iteration)?;
        Ok(self.apply_combo(combo_id))
    }

    fn set_numbered_random_configuration(&mut self, iteration: usize) -> Result<TuningOutcome> {
        let combo_id = self.random.numbered_value(iteration);
        Ok(self.apply_combo(combo_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(url: &str, attributes: &[(&str, &str)]) -> EntityProfile {
        attributes
            .iter()
            .fold(EntityProfile::new(url), |profile, (name, value)| {
                profile.with_attribute(*name, *value)
            })
    }

    #[test]
    fn test_offer_prefers_smaller_id_on_ties() {
        let mut best = vec![None; 8];
        record_similarity(&mut best, 0, 7, 0.8);
        record_similarity(&mut best, 0, 4, 0.8);
        assert_eq!(best[0].map(|m| m.partner), Some(4));
        record_similarity(&mut best, 0, 2, 0.3);
        assert_eq!(best[0].map(|m| m.partner), Some(4));
        record_similarity(&mut best, 1, 7, 0.8);
        assert_eq!(best[7].map(|m| m.partner), Some(0));
        record_similarity(&mut best, 3, 5, 0.0);
        assert_eq!(best[3], None);
    }

    #[test]
    fn test_dirty_value_clustering() {
        let profiles = vec![
            profile("p1", &[("title", "deep learning"), ("venue", "nips"), ("year", "2017")]),
            profile("p2", &[("name", "deep learning book"), ("conference", "nips")]),
        ];
        let clustering = AttributeClustering::new(
            AttributeSource::Value,
            RepresentationModel::TokenUnigrams,
            SimilarityMetric::Jaccard,
        );
        let clusters = clustering.get_clusters(&profiles, None).unwrap();
        assert_eq!(clusters.len(), 1);
        let map = &clusters[0];
        assert_eq!(map["title"], map["name"]);
        assert_eq!(map["venue"], map["conference"]);
        assert_ne!(map["title"], map["venue"]);
        // year shares nothing and lands in the glue cluster: 3 components + 1
        assert_eq!(map["year"], 4);
    }

    #[test]
    fn test_clean_clean_name_clustering() {
        let d1 = vec![profile("a", &[("movie title", "x"), ("director", "y")])];
        let d2 = vec![profile("b", &[("title", "x"), ("budget", "z")])];
        let clustering = AttributeClustering::new(
            AttributeSource::Name,
            RepresentationModel::TokenUnigrams,
            SimilarityMetric::Jaccard,
        );
        let clusters = clustering.get_clusters(&d1, Some(&d2)).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0]["movie title"], clusters[1]["title"]);
        // director and budget are singletons: 3 components, glue id 4
        assert_eq!(clusters[0]["director"], 4);
        assert_eq!(clusters[1]["budget"], 4);
    }

    #[test]
    fn test_holistic_clustering_links_names_and_values() {
        let profiles = vec![profile(
            "p1",
            &[("author", "smith"), ("author name", "jones"), ("venue", "smith")],
        )];
        let holistic = AttributeClustering::new(
            AttributeSource::Holistic,
            RepresentationModel::TokenUnigrams,
            SimilarityMetric::Jaccard,
        );
        let clusters = holistic.get_clusters(&profiles, None).unwrap();
        let map = &clusters[0];
        // author ~ venue through "smith", author ~ author name through "author"
        assert_eq!(map["author"], map["venue"]);
        assert_eq!(map["author"], map["author name"]);
        // one component, so the unused glue id is 2
        assert_ne!(map["author"], 2);

        // values alone leave "author name" unmatched
        let by_value = AttributeClustering::new(
            AttributeSource::Value,
            RepresentationModel::TokenUnigrams,
            SimilarityMetric::Jaccard,
        );
        let clusters = by_value.get_clusters(&profiles, None).unwrap();
        assert_eq!(clusters[0]["author name"], 2 + 1);
    }

    #[test]
    fn test_grid_walks_all_combinations() {
        let mut clustering = AttributeClustering::new(
            AttributeSource::Holistic,
            RepresentationModel::TokenUnigrams,
            SimilarityMetric::Jaccard,
        );
        assert_eq!(clustering.number_of_grid_configurations(), 18);
        clustering.set_numbered_grid_configuration(17).unwrap();
        assert_eq!(
            clustering.representation_model(),
            RepresentationModel::CharacterFourgrams
        );
        assert_eq!(clustering.similarity_metric(), SimilarityMetric::Cosine);
        assert!(clustering.set_numbered_grid_configuration(18).is_err());
        assert_eq!(
            clustering.set_numbered_random_configuration(2).unwrap(),
            TuningOutcome::Applied
        );
        assert!(clustering.method_parameters().starts_with(
            "Holistic Attribute Clustering involves 2 parameters:"
        ));
    }
}
