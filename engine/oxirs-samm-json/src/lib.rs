//! # OxiRS SAMM JSON - JSON Schema and Payload Generation for SAMM Aspect Models
//!
//! This crate resolves a Semantic Aspect Meta Model (SAMM) Aspect Model from
//! its RDF statements into a strongly typed [`Model`], and projects that model
//! into two JSON documents: a JSON Schema describing conforming payloads, and
//! one example payload conforming to that schema.
//!
//! ## Core Concepts
//!
//! - **Aspect**: The root element; its properties become the top-level JSON keys
//! - **Property**: A named feature with a Characteristic, optional example value
//!   and payload name
//! - **Characteristic**: The value semantics of a Property (scalar, collection,
//!   Either, enumeration, multilingual text, ...)
//! - **Entity**: A composite value type, possibly inheriting from another Entity
//!
//! ## Pipeline
//!
//! 1. Turtle text is loaded into an [`oxrdf::Graph`] ([`parser::load_turtle_str`])
//! 2. [`ModelBuilder`] resolves the graph into a [`Model`]; all integrity
//!    checks happen here
//! 3. [`generate_schema`] and [`generate_instance`] walk the model; both share
//!    one classification of characteristics and the [`datatype`] table
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxirs_samm_json::parser::load_turtle_file;
//! use oxirs_samm_json::{build_model, generate_instance_string, generate_schema_string};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = load_turtle_file("path/to/Movement.ttl")?;
//! let model = build_model(&graph)?;
//!
//! println!("{}", generate_schema_string(&model)?);
//! println!("{}", generate_instance_string(&model)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! - [SAMM Specification](https://eclipse-esmf.github.io/samm-specification/snapshot/index.html)
//! - [JSON Schema draft-07](https://json-schema.org/draft-07)

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod datatype;
pub mod error;
pub mod generators;
pub mod metamodel;
pub mod parser;

// Re-exports for convenience
pub use config::{EitherPreference, GeneratorConfig, InstanceOptions, ParserOptions, SchemaOptions};
pub use error::{Result, SammError};
pub use generators::{
    generate_instance, generate_instance_string, generate_instance_with, generate_schema,
    generate_schema_string, generate_schema_with, InstanceGenerator, SchemaGenerator,
};
pub use metamodel::{Aspect, Characteristic, Entity, Model, ModelElement, Property};
pub use parser::{ModelBuilder, StatementGraph};

/// SAMM version assumed when a model does not reveal one
pub const SAMM_VERSION: &str = parser::DEFAULT_SAMM_VERSION;

/// Build a [`Model`] with the SAMM version detected from the graph
pub fn build_model(graph: &dyn StatementGraph) -> Result<Model> {
    ModelBuilder::new(graph).build()
}

/// Build a [`Model`] honoring the parser section of a configuration
pub fn build_model_with(graph: &dyn StatementGraph, config: &GeneratorConfig) -> Result<Model> {
    ModelBuilder::with_options(graph, &config.parser).build()
}
