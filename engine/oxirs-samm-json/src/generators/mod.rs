//! JSON generators for SAMM Aspect Models
//!
//! Both generators walk the same [`Model`] and classify every characteristic
//! through [`shape_of`], so a schema and an instance generated from one model
//! always agree on the JSON shape of each property.

pub mod payload;
pub mod schema;

pub use payload::InstanceGenerator;
pub use schema::SchemaGenerator;

use crate::config::{InstanceOptions, SchemaOptions};
use crate::datatype::{float_value, lookup, DatatypeInfo};
use crate::error::Result;
use crate::metamodel::{
    Characteristic, CharacteristicKind, Constraint, DataType, ElementType, Model,
};
use oxrdf::vocab::xsd;
use serde_json::Value;

/// Longest string or array the payload generator pads a value to
pub const MAX_GENERATED_LENGTH: u64 = 1024;

/// JSON shape of a characteristic
#[derive(Debug, Clone)]
pub(crate) enum Shape<'a> {
    /// Primitive value described by the datatype table
    Scalar(&'static DatatypeInfo),
    /// Fixed set of values; `datatype` is absent when they are not literals
    Enumerated {
        datatype: Option<&'static DatatypeInfo>,
        values: &'a [Value],
    },
    Array {
        items: Box<Shape<'a>>,
        unique: bool,
    },
    Either {
        left: &'a Characteristic,
        right: &'a Characteristic,
    },
    /// Entity id
    Entity(&'a str),
    Constrained {
        base: &'a Characteristic,
        constraints: &'a [Constraint],
    },
    Opaque,
}

pub(crate) fn shape_of(characteristic: &Characteristic) -> Shape<'_> {
    match characteristic.kind() {
        CharacteristicKind::Enumeration { values } | CharacteristicKind::State { values, .. }
            if !values.is_empty() =>
        {
            let literal = values
                .iter()
                .all(|value| !value.is_object() && !value.is_array());
            let datatype = if literal && characteristic.entity_ref().is_none() {
                Some(lookup(
                    characteristic
                        .effective_data_type()
                        .unwrap_or(xsd::STRING.as_str()),
                ))
            } else {
                None
            };
            Shape::Enumerated { datatype, values }
        }
        CharacteristicKind::Collection { kind, element } => Shape::Array {
            items: Box::new(element_shape(element)),
            unique: kind.is_unique(),
        },
        CharacteristicKind::Either { left, right } => Shape::Either { left, right },
        CharacteristicKind::Trait { base, constraints } => Shape::Constrained { base, constraints },
        CharacteristicKind::Opaque { .. } => Shape::Opaque,
        _ => match characteristic.entity_ref() {
            Some(entity) => Shape::Entity(entity),
            None => Shape::Scalar(lookup(
                characteristic
                    .effective_data_type()
                    .unwrap_or(xsd::STRING.as_str()),
            )),
        },
    }
}

fn element_shape(element: &ElementType) -> Shape<'_> {
    match element {
        ElementType::DataType(DataType::Scalar(iri)) => Shape::Scalar(lookup(iri)),
        ElementType::DataType(DataType::Entity(id)) => Shape::Entity(id),
        ElementType::Characteristic(characteristic) => shape_of(characteristic),
    }
}

/// JSON number for a constraint bound, integral when possible
pub(crate) fn bound_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        float_value(value)
    }
}

/// Generate the JSON Schema of a model with default options
pub fn generate_schema(model: &Model) -> Value {
    SchemaGenerator::new(model).generate()
}

pub fn generate_schema_with(model: &Model, options: &SchemaOptions) -> Value {
    SchemaGenerator::with_options(model, options.clone()).generate()
}

/// Pretty-printed JSON Schema
pub fn generate_schema_string(model: &Model) -> Result<String> {
    Ok(serde_json::to_string_pretty(&generate_schema(model))?)
}

/// Generate an example instance of a model with default options
pub fn generate_instance(model: &Model) -> Value {
    InstanceGenerator::new(model).generate()
}

pub fn generate_instance_with(model: &Model, options: &InstanceOptions) -> Value {
    InstanceGenerator::with_options(model, options.clone()).generate()
}

/// Pretty-printed example instance
pub fn generate_instance_string(model: &Model) -> Result<String> {
    Ok(serde_json::to_string_pretty(&generate_instance(model))?)
}
