// src/schema_clustering/text_model.rs - Textual models that summarise the values of one attribute

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::datamodel::DatasetSide;
use crate::error::BlockingError;

static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// A model aggregating every text fed to one attribute.
///
/// Models are fed with `update` and then frozen with `finalize_model`; only a
/// finalized model exposes meaningful signatures.
pub trait TextModel {
    fn instance_name(&self) -> &str;

    /// Add one more text. Fails once the model is finalized.
    fn update(&mut self, text: &str) -> Result<()>;

    fn finalize_model(&mut self);

    /// Keys used to find candidate models through an inverted index.
    fn signatures(&self) -> &HashSet<String>;

    /// Similarity in `[0, 1]`.
    fn similarity(&self, other: &Self) -> f64;
}

/// Creates an empty model for an attribute of one dataset.
pub trait ModelFactory {
    type Model: TextModel;

    fn create_model(&self, side: DatasetSide, instance_name: &str) -> Self::Model;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepresentationModel {
    TokenUnigrams,
    TokenBigrams,
    TokenTrigrams,
    CharacterBigrams,
    CharacterTrigrams,
    CharacterFourgrams,
}

impl RepresentationModel {
    pub const ALL: [RepresentationModel; 6] = [
        RepresentationModel::TokenUnigrams,
        RepresentationModel::TokenBigrams,
        RepresentationModel::TokenTrigrams,
        RepresentationModel::CharacterBigrams,
        RepresentationModel::CharacterTrigrams,
        RepresentationModel::CharacterFourgrams,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepresentationModel::TokenUnigrams => "token-unigrams",
            RepresentationModel::TokenBigrams => "token-bigrams",
            RepresentationModel::TokenTrigrams => "token-trigrams",
            RepresentationModel::CharacterBigrams => "character-bigrams",
            RepresentationModel::CharacterTrigrams => "character-trigrams",
            RepresentationModel::CharacterFourgrams => "character-fourgrams",
        }
    }

    /// The n-grams of `text` under this representation.
    pub fn ngrams(self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_SEPARATOR
            .split(&lowered)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        match self {
            RepresentationModel::TokenUnigrams => token_ngrams(&tokens, 1),
            RepresentationModel::TokenBigrams => token_ngrams(&tokens, 2),
            RepresentationModel::TokenTrigrams => token_ngrams(&tokens, 3),
            RepresentationModel::CharacterBigrams => character_ngrams(&tokens.join(" "), 2),
            RepresentationModel::CharacterTrigrams => character_ngrams(&tokens.join(" "), 3),
            RepresentationModel::CharacterFourgrams => character_ngrams(&tokens.join(" "), 4),
        }
    }
}

// Texts shorter than n yield one gram holding the whole text
fn token_ngrams(tokens: &[&str], n: usize) -> Vec<String> {
    if tokens.len() <= n {
        return vec![tokens.join(" ")];
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

fn character_ngrams(text: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= n {
        return vec![text.to_string()];
    }
    chars.windows(n).map(|window| window.iter().collect()).collect()
}

impl fmt::Display for RepresentationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepresentationModel {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|model| model.as_str() == normalized)
            .ok_or_else(|| {
                BlockingError::InvalidParameter(format!("unknown representation model '{}'", s))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityMetric {
    /// Overlap of the signature sets.
    Jaccard,
    /// Frequency-aware Jaccard: Σ min / Σ max.
    GeneralizedJaccard,
    /// Cosine of the n-gram frequency vectors.
    Cosine,
}

impl SimilarityMetric {
    pub const ALL: [SimilarityMetric; 3] = [
        SimilarityMetric::Jaccard,
        SimilarityMetric::GeneralizedJaccard,
        SimilarityMetric::Cosine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityMetric::Jaccard => "jaccard",
            SimilarityMetric::GeneralizedJaccard => "generalized-jaccard",
            SimilarityMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = BlockingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == normalized)
            .ok_or_else(|| {
                BlockingError::InvalidParameter(format!("unknown similarity metric '{}'", s))
            })
    }
}

/// One point of the schema-clustering configuration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelMetricCombo {
    pub representation: RepresentationModel,
    pub metric: SimilarityMetric,
}

impl ModelMetricCombo {
    /// Every representation paired with every metric, representation-major.
    pub fn all_valid() -> Vec<ModelMetricCombo> {
        RepresentationModel::ALL
            .iter()
            .flat_map(|&representation| {
                SimilarityMetric::ALL.iter().map(move |&metric| ModelMetricCombo {
                    representation,
                    metric,
                })
            })
            .collect()
    }
}

/// Bag-of-n-grams model; the distinct n-grams are its signatures.
#[derive(Debug, Clone)]
pub struct NGramModel {
    instance_name: String,
    representation: RepresentationModel,
    metric: SimilarityMetric,
    frequencies: HashMap<String, f64>,
    signatures: HashSet<String>,
    finalized: bool,
}

impl NGramModel {
    pub fn new(
        representation: RepresentationModel,
        metric: SimilarityMetric,
        instance_name: &str,
    ) -> Self {
        Self {
            instance_name: instance_name.to_string(),
            representation,
            metric,
            frequencies: HashMap::new(),
            signatures: HashSet::new(),
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn jaccard(&self, other: &Self) -> f64 {
        let common = self.signatures.intersection(&other.signatures).count() as f64;
        let union = (self.signatures.len() + other.signatures.len()) as f64 - common;
        if union == 0.0 {
            0.0
        } else {
            common / union
        }
    }

    fn generalized_jaccard(&self, other: &Self) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (gram, &frequency) in &self.frequencies {
            let other_frequency = other.frequencies.get(gram).copied().unwrap_or(0.0);
            numerator += frequency.min(other_frequency);
            denominator += frequency.max(other_frequency);
        }
        for (gram, &frequency) in &other.frequencies {
            if !self.frequencies.contains_key(gram) {
                denominator += frequency;
            }
        }
        if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        }
    }

    fn cosine(&self, other: &Self) -> f64 {
        let dot: f64 = self
            .frequencies
            .iter()
            .filter_map(|(gram, &f)| other.frequencies.get(gram).map(|&g| f * g))
            .fold(0.0, |acc, product| acc + product);
        let norm = |frequencies: &HashMap<String, f64>| -> f64 {
            frequencies.values().map(|f| f * f).sum::<f64>().sqrt()
        };
        let denominator = norm(&self.frequencies) * norm(&other.frequencies);
        if denominator == 0.0 {
            0.0
        } else {
            (dot / denominator).min(1.0)
        }
    }
}

impl TextModel for NGramModel {
    fn instance_name(&self) -> &str {
        &self.instance_name
    }

    fn update(&mut self, text: &str) -> Result<()> {
        if self.finalized {
            return Err(BlockingError::ModelFinalized(self.instance_name.clone()).into());
        }
        for gram in self.representation.ngrams(text) {
            *self.frequencies.entry(gram).or_insert(0.0) += 1.0;
        }
        Ok(())
    }

    fn finalize_model(&mut self) {
        self.signatures = self.frequencies.keys().cloned().collect();
        self.finalized = true;
    }

    fn signatures(&self) -> &HashSet<String> {
        &self.signatures
    }

    fn similarity(&self, other: &Self) -> f64 {
        match self.metric {
            SimilarityMetric::Jaccard => self.jaccard(other),
            SimilarityMetric::GeneralizedJaccard => self.generalized_jaccard(other),
            SimilarityMetric::Cosine => self.cosine(other),
        }
    }
}

/// Factory for `NGramModel`s sharing one representation and metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NGramModelFactory {
    pub representation: RepresentationModel,
    pub metric: SimilarityMetric,
}

impl NGramModelFactory {
    pub fn new(representation: RepresentationModel, metric: SimilarityMetric) -> Self {
        Self {
            representation,
            metric,
        }
    }
}

impl ModelFactory for NGramModelFactory {
    type Model = NGramModel;

    fn create_model(&self, _side: DatasetSide, instance_name: &str) -> NGramModel {
        NGramModel::new(self.representation, self.metric, instance_name)
    }
}
