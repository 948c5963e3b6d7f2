//! Characteristic Model Elements
//!
//! Characteristics describe the semantics of Property values. After
//! resolution every characteristic, named or anonymous, is one
//! [`Characteristic`] value with a closed [`CharacteristicKind`].

use super::{ElementMetadata, ModelElement};
use oxrdf::vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared value type of a characteristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// XSD/RDF/SAMM scalar datatype IRI
    Scalar(String),
    /// Entity id
    Entity(String),
}

/// Element type of a collection characteristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementType {
    /// Given by `samm:dataType` of the collection
    DataType(DataType),
    /// Given by `samm-c:elementCharacteristic`
    Characteristic(Box<Characteristic>),
}

/// Collection flavors sharing one JSON array shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    Collection,
    List,
    Set,
    SortedSet,
    TimeSeries,
}

impl CollectionKind {
    /// Whether elements are unique
    pub fn is_unique(&self) -> bool {
        matches!(self, CollectionKind::Set | CollectionKind::SortedSet)
    }
}

/// Types of characteristics in SAMM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharacteristicKind {
    /// Plain `samm:Characteristic`, shape given by its data type
    Characteristic,

    Boolean,
    Text,
    Timestamp,
    Code,
    MultiLanguageText,

    /// CURIE of a unit
    UnitReference,

    /// Quantifiable with a unit
    Measurement {
        /// Unit CURIE
        unit: Option<String>,
    },

    /// Quantifiable value with optional unit
    Quantifiable {
        /// Unit CURIE
        unit: Option<String>,
    },

    /// Time duration with optional unit
    Duration {
        /// Unit CURIE
        unit: Option<String>,
    },

    /// Enumeration of values
    Enumeration {
        /// Possible values, converted to JSON
        values: Vec<Value>,
    },

    /// Enumeration representing states
    State {
        /// Possible values, converted to JSON
        values: Vec<Value>,
        /// Default state
        default_value: Option<Value>,
    },

    /// Collection, List, Set, SortedSet or TimeSeries
    Collection {
        kind: CollectionKind,
        element: ElementType,
    },

    /// One of two alternatives
    Either {
        left: Box<Characteristic>,
        right: Box<Characteristic>,
    },

    /// A single entity value (the entity is the data type)
    SingleEntity,

    /// String composed from other property values
    StructuredValue {
        /// Regular expression used to deconstruct the value
        deconstruction_rule: String,
        /// Property ids and literal separators
        elements: Vec<String>,
    },

    /// Base characteristic narrowed by constraints
    Trait {
        base: Box<Characteristic>,
        constraints: Vec<Constraint>,
    },

    /// A characteristic kind the resolver does not know
    Opaque {
        /// Local name of the declared type
        kind: String,
    },
}

/// Constraints that can be applied to characteristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// Length (strings) or size (collections)
    Length {
        min_value: Option<u64>,
        max_value: Option<u64>,
    },

    /// Value range
    Range {
        min_value: Option<f64>,
        max_value: Option<f64>,
        lower_bound: BoundDefinition,
        upper_bound: BoundDefinition,
    },

    RegularExpression {
        pattern: String,
    },

    Encoding {
        encoding: String,
    },

    Language {
        language_code: String,
    },

    Locale {
        locale_code: String,
    },

    FixedPoint {
        integer: u32,
        scale: u32,
    },

    /// Constraint kind the resolver does not know
    Other {
        kind: String,
    },
}

/// Bound definition for range constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundDefinition {
    /// Open bound (exclusive)
    Open,
    /// Inclusive lower bound
    #[default]
    AtLeast,
    /// Exclusive lower bound
    GreaterThan,
    /// Inclusive upper bound
    AtMost,
    /// Exclusive upper bound
    LessThan,
}

impl BoundDefinition {
    /// Whether the bound value itself is excluded
    pub fn is_exclusive(&self) -> bool {
        matches!(
            self,
            BoundDefinition::Open | BoundDefinition::GreaterThan | BoundDefinition::LessThan
        )
    }
}

/// A Characteristic in the SAMM meta model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Element metadata (URN or blank node label, names, descriptions)
    pub metadata: ElementMetadata,

    /// The declared data type of this characteristic
    pub data_type: Option<DataType>,

    /// The kind of characteristic
    pub kind: CharacteristicKind,
}

impl Characteristic {
    pub fn new(urn: impl Into<String>, kind: CharacteristicKind) -> Self {
        Self {
            metadata: ElementMetadata::new(urn),
            data_type: None,
            kind,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn kind(&self) -> &CharacteristicKind {
        &self.kind
    }

    /// Entity id when the data type is an entity
    pub fn entity_ref(&self) -> Option<&str> {
        match &self.data_type {
            Some(DataType::Entity(id)) => Some(id),
            _ => None,
        }
    }

    /// Scalar datatype IRI used for JSON mapping
    ///
    /// The declared data type wins; predefined kinds fall back to their
    /// implied type and traits to their base.
    pub fn effective_data_type(&self) -> Option<&str> {
        match &self.data_type {
            Some(DataType::Scalar(iri)) => return Some(iri),
            Some(DataType::Entity(_)) => return None,
            None => {}
        }
        match &self.kind {
            CharacteristicKind::Boolean => Some(xsd::BOOLEAN.as_str()),
            CharacteristicKind::Text | CharacteristicKind::Code => Some(xsd::STRING.as_str()),
            CharacteristicKind::Timestamp => Some(xsd::DATE_TIME.as_str()),
            CharacteristicKind::MultiLanguageText => Some(rdf::LANG_STRING.as_str()),
            CharacteristicKind::UnitReference => Some(crate::datatype::CURIE),
            CharacteristicKind::Trait { base, .. } => base.effective_data_type(),
            _ => None,
        }
    }
}

impl ModelElement for Characteristic {
    fn urn(&self) -> &str {
        &self.metadata.urn
    }

    fn metadata(&self) -> &ElementMetadata {
        &self.metadata
    }
}
