//! Property Model Element
//!
//! A Property defines a named feature of an Aspect or Entity.

use super::{Characteristic, ElementMetadata, ModelElement};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Property in the SAMM meta model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Element metadata (URN, names, descriptions)
    pub metadata: ElementMetadata,

    /// The characteristic that defines the semantics of this property
    pub characteristic: Characteristic,

    /// Example value, already converted to JSON
    pub example_value: Option<Value>,

    /// Whether this property is optional (default: false)
    pub optional: bool,

    /// Payload name (JSON key, if different from the property name)
    pub payload_name: Option<String>,

    /// Excluded from generated payloads and schemas
    pub not_in_payload: bool,
}

impl Property {
    pub fn new(urn: impl Into<String>, characteristic: Characteristic) -> Self {
        Self {
            metadata: ElementMetadata::new(urn),
            characteristic,
            example_value: None,
            optional: false,
            payload_name: None,
            not_in_payload: false,
        }
    }

    pub fn with_example_value(mut self, value: Value) -> Self {
        self.example_value = Some(value);
        self
    }

    pub fn as_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_payload_name(mut self, name: impl Into<String>) -> Self {
        self.payload_name = Some(name.into());
        self
    }

    /// The JSON key of this property: payload name or local name
    pub fn payload_key(&self) -> String {
        self.payload_name.clone().unwrap_or_else(|| self.name())
    }

    /// Whether the property takes part in JSON payloads at all
    pub fn in_payload(&self) -> bool {
        !self.not_in_payload
    }
}

impl ModelElement for Property {
    fn urn(&self) -> &str {
        &self.metadata.urn
    }

    fn metadata(&self) -> &ElementMetadata {
        &self.metadata
    }
}
