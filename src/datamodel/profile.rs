// src/datamodel/profile.rs

use serde::{Deserialize, Serialize};

/// A single name/value pair of an entity profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An entity description as read from one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub entity_url: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl EntityProfile {
    pub fn new(entity_url: impl Into<String>) -> Self {
        Self {
            entity_url: entity_url.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }
}
