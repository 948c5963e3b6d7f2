//! SAMM meta model elements
//!
//! The resolved, strongly-typed form of an Aspect Model. Everything here is
//! produced by the [`ModelBuilder`](crate::parser::ModelBuilder) and is
//! read-only afterwards.

mod characteristic;
mod entity;
mod property;

pub use characteristic::{
    BoundDefinition, Characteristic, CharacteristicKind, CollectionKind, Constraint, DataType,
    ElementType,
};
pub use entity::Entity;
pub use property::Property;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity and display metadata shared by all model elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// Full IRI (or blank node label for anonymous elements)
    pub urn: String,
    /// Preferred names by language tag
    pub preferred_names: BTreeMap<String, String>,
    /// Descriptions by language tag
    pub descriptions: BTreeMap<String, String>,
    /// `samm:see` references
    pub see_refs: Vec<String>,
}

impl ElementMetadata {
    /// Create metadata for an element
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            urn: urn.into(),
            ..Default::default()
        }
    }

    pub fn add_preferred_name(&mut self, language: impl Into<String>, name: impl Into<String>) {
        self.preferred_names.insert(language.into(), name.into());
    }

    pub fn add_description(&mut self, language: impl Into<String>, text: impl Into<String>) {
        self.descriptions.insert(language.into(), text.into());
    }

    pub fn add_see_ref(&mut self, see: impl Into<String>) {
        self.see_refs.push(see.into());
    }

    pub fn get_preferred_name(&self, language: &str) -> Option<&str> {
        self.preferred_names.get(language).map(String::as_str)
    }

    pub fn get_description(&self, language: &str) -> Option<&str> {
        self.descriptions.get(language).map(String::as_str)
    }

    /// Preferred name in `language`, else the first one available
    pub fn preferred_name_or_any(&self, language: &str) -> Option<&str> {
        localized(&self.preferred_names, language)
    }

    /// Description in `language`, else the first one available
    pub fn description_or_any(&self, language: &str) -> Option<&str> {
        localized(&self.descriptions, language)
    }
}

fn localized<'a>(texts: &'a BTreeMap<String, String>, language: &str) -> Option<&'a str> {
    texts
        .get(language)
        .or_else(|| texts.values().next())
        .map(String::as_str)
}

/// Local part of an IRI: after `#`, else after the last `/` or `:`
pub fn local_name(urn: &str) -> &str {
    if let Some((_, local)) = urn.rsplit_once('#') {
        return local;
    }
    urn.rsplit(['/', ':']).next().unwrap_or(urn)
}

/// Common behavior of model elements
pub trait ModelElement {
    fn urn(&self) -> &str;

    fn metadata(&self) -> &ElementMetadata;

    /// Local name of the element
    fn name(&self) -> String {
        local_name(self.urn()).to_string()
    }
}

/// The root element of an Aspect Model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aspect {
    pub metadata: ElementMetadata,
    /// Properties in declaration order
    pub properties: Vec<Property>,
    /// Operation ids, in declaration order (not projected into JSON)
    pub operations: Vec<String>,
    /// Event ids, in declaration order (not projected into JSON)
    pub events: Vec<String>,
}

impl Aspect {
    pub fn new(urn: impl Into<String>) -> Self {
        Self {
            metadata: ElementMetadata::new(urn),
            properties: Vec::new(),
            operations: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Property ids in declaration order
    pub fn property_ids(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|property| property.urn())
    }
}

impl ModelElement for Aspect {
    fn urn(&self) -> &str {
        &self.metadata.urn
    }

    fn metadata(&self) -> &ElementMetadata {
        &self.metadata
    }
}

/// Non-fatal finding recorded while building a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Element the finding is about
    pub element: String,
    pub message: String,
}

/// A fully resolved Aspect Model
///
/// Built once by the model builder and never mutated afterwards; both
/// generators borrow it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Local namespace of the Aspect, including the trailing `#`
    pub namespace: String,
    pub aspect: Aspect,
    /// Named properties by id, without per-use overrides
    pub properties: BTreeMap<String, Property>,
    /// Entities by id, with their effective property lists
    pub entities: BTreeMap<String, Entity>,
    /// Named characteristics by id; anonymous ones live only in their owner
    pub characteristics: BTreeMap<String, Characteristic>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Model {
    pub fn aspect(&self) -> &Aspect {
        &self.aspect
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    pub fn characteristic(&self, id: &str) -> Option<&Characteristic> {
        self.characteristics.get(id)
    }

    /// Check that the Aspect carries a preferred name and a description in `language`
    pub fn validate_metadata(&self, language: &str) -> Vec<Diagnostic> {
        let metadata = &self.aspect.metadata;
        let mut findings = Vec::new();
        if metadata.get_preferred_name(language).is_none() {
            findings.push(Diagnostic {
                element: metadata.urn.clone(),
                message: format!("Aspect must have preferredName with '{language}' language tag"),
            });
        }
        if metadata.get_description(language).is_none() {
            findings.push(Diagnostic {
                element: metadata.urn.clone(),
                message: format!("Aspect must have description with '{language}' language tag"),
            });
        }
        findings
    }
}
