//! Entity Model Element

use super::{ElementMetadata, ModelElement, Property};
use serde::{Deserialize, Serialize};

/// A reusable composite value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub metadata: ElementMetadata,

    /// Properties declared by this entity, in declaration order
    pub properties: Vec<Property>,

    /// Parent entity id (`samm:extends`)
    pub extends: Option<String>,

    /// Declared as `samm:AbstractEntity`
    pub is_abstract: bool,

    /// Inherited and own properties, parent-first
    pub effective_properties: Vec<Property>,
}

impl Entity {
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            metadata: ElementMetadata::new(urn),
            properties: Vec::new(),
            extends: None,
            is_abstract: false,
            effective_properties: Vec::new(),
        }
    }

    /// Compute the effective property list on top of the parent's one
    ///
    /// Own properties are appended, except that a property whose id already
    /// appears in the inherited list replaces it in place.
    pub fn flatten_onto(&mut self, inherited: &[Property]) {
        let mut effective = inherited.to_vec();
        for own in &self.properties {
            match effective.iter().position(|p| p.urn() == own.urn()) {
                Some(index) => effective[index] = own.clone(),
                None => effective.push(own.clone()),
            }
        }
        self.effective_properties = effective;
    }

    pub fn declared_properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn effective_properties(&self) -> &[Property] {
        &self.effective_properties
    }
}

impl ModelElement for Entity {
    fn urn(&self) -> &str {
        &self.metadata.urn
    }

    fn metadata(&self) -> &ElementMetadata {
        &self.metadata
    }
}
