//! Generator configuration
//!
//! This module provides:
//! - Schema and payload generation options
//! - Parser options (SAMM version override)
//! - Configuration file parsing (TOML)
//!
//! Every section and field is optional in the file; missing values take the
//! defaults below.

use crate::error::{Result, SammError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Draft-07 meta schema URI
pub const JSON_SCHEMA_DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Complete generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub parser: ParserOptions,
    pub schema: SchemaOptions,
    pub instance: InstanceOptions,
}

/// Model builder options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// SAMM meta model version to use instead of the detected one
    pub samm_version: Option<String>,
}

/// JSON Schema generation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Emit the `$schema` keyword
    pub include_schema_uri: bool,
    pub schema_uri: String,
    /// Emit `title` and `description` from model metadata
    pub include_metadata: bool,
    /// Preferred language of titles and descriptions
    pub language: String,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            include_schema_uri: true,
            schema_uri: JSON_SCHEMA_DRAFT_07.to_string(),
            include_metadata: true,
            language: "en".to_string(),
        }
    }
}

/// Branch of an Either characteristic used in example payloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EitherPreference {
    Left,
    #[default]
    Right,
}

/// Example payload generation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceOptions {
    pub either_preference: EitherPreference,
    /// Language tag of generated multilingual texts
    pub default_language: String,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            either_preference: EitherPreference::Right,
            default_language: "en".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SammError::Config(format!("Failed to parse TOML configuration: {e}")))
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SammError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| match e {
            SammError::Config(message) => {
                SammError::Config(format!("{message} (in '{}')", path.display()))
            }
            other => other,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SammError::Config(format!("Failed to serialize configuration: {e}")))
    }
}
