//! SAMM to JSON Schema Generator
//!
//! Emits a draft-07 JSON Schema for the payload of an Aspect. Entities are
//! emitted once under `definitions` and referenced with `$ref`, which also
//! terminates recursive entity structures.

use super::{bound_value, shape_of, Shape};
use crate::config::SchemaOptions;
use crate::metamodel::{
    local_name, Characteristic, Constraint, ElementMetadata, Entity, Model, ModelElement,
    Property,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Generates the JSON Schema of one [`Model`]
pub struct SchemaGenerator<'m> {
    model: &'m Model,
    options: SchemaOptions,
    definitions: Map<String, Value>,
    /// Entity id to definition key
    definition_keys: HashMap<&'m str, String>,
}

impl<'m> SchemaGenerator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self::with_options(model, SchemaOptions::default())
    }

    pub fn with_options(model: &'m Model, options: SchemaOptions) -> Self {
        Self {
            model,
            options,
            definitions: Map::new(),
            definition_keys: HashMap::new(),
        }
    }

    /// Generate the schema document
    pub fn generate(mut self) -> Value {
        let model = self.model;
        let aspect = model.aspect();
        tracing::debug!("Generating JSON Schema for {}", aspect.urn());

        let mut root = Map::new();
        if self.options.include_schema_uri {
            root.insert("$schema".to_string(), json!(self.options.schema_uri));
        }
        if self.options.include_metadata {
            let title = aspect
                .metadata
                .preferred_name_or_any(&self.options.language)
                .map(str::to_string)
                .unwrap_or_else(|| aspect.name());
            root.insert("title".to_string(), json!(title));
            if let Some(description) = aspect.metadata.description_or_any(&self.options.language) {
                root.insert("description".to_string(), json!(description));
            }
        }

        let body = self.object_schema(aspect.properties());
        root.extend(body);

        if !self.definitions.is_empty() {
            root.insert(
                "definitions".to_string(),
                Value::Object(std::mem::take(&mut self.definitions)),
            );
        }
        Value::Object(root)
    }

    /// `{type: object, properties, required}` for a property list
    fn object_schema(&mut self, properties: &'m [Property]) -> Map<String, Value> {
        let mut members = Map::new();
        let mut required = Vec::new();

        for property in properties.iter().filter(|property| property.in_payload()) {
            let key = property.payload_key();
            if members.contains_key(&key) {
                continue;
            }
            let mut schema = self.characteristic_schema(&property.characteristic);
            self.annotate(&mut schema, &property.metadata);
            if !property.optional {
                required.push(Value::String(key.clone()));
            }
            members.insert(key, schema);
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(members));
        schema.insert("required".to_string(), Value::Array(required));
        schema
    }

    fn annotate(&self, schema: &mut Value, metadata: &ElementMetadata) {
        if !self.options.include_metadata {
            return;
        }
        let Some(object) = schema.as_object_mut() else {
            return;
        };
        if object.contains_key("$ref") {
            return;
        }
        if let Some(title) = metadata.preferred_name_or_any(&self.options.language) {
            object.insert("title".to_string(), json!(title));
        }
        if let Some(description) = metadata.description_or_any(&self.options.language) {
            object.insert("description".to_string(), json!(description));
        }
    }

    fn characteristic_schema(&mut self, characteristic: &'m Characteristic) -> Value {
        self.shape_schema(shape_of(characteristic))
    }

    fn shape_schema(&mut self, shape: Shape<'m>) -> Value {
        match shape {
            Shape::Scalar(info) => Value::Object(info.schema()),
            Shape::Enumerated { datatype, values } => {
                let mut schema = datatype.map(|info| info.schema()).unwrap_or_default();
                schema.insert("enum".to_string(), Value::Array(values.to_vec()));
                Value::Object(schema)
            }
            Shape::Array { items, unique } => {
                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("array"));
                schema.insert("items".to_string(), self.shape_schema(*items));
                if unique {
                    schema.insert("uniqueItems".to_string(), json!(true));
                }
                Value::Object(schema)
            }
            Shape::Either { left, right } => {
                let left = self.characteristic_schema(left);
                let right = self.characteristic_schema(right);
                json!({
                    "oneOf": [
                        {"type": "object", "properties": {"left": left}, "required": ["left"]},
                        {"type": "object", "properties": {"right": right}, "required": ["right"]}
                    ]
                })
            }
            Shape::Entity(id) => self.entity_reference(id),
            Shape::Constrained { base, constraints } => {
                let mut schema = self.characteristic_schema(base);
                if let Some(object) = schema.as_object_mut() {
                    if !object.contains_key("$ref") {
                        apply_constraints(object, constraints);
                    }
                }
                schema
            }
            Shape::Opaque => json!({"type": "object"}),
        }
    }

    /// `$ref` to the definition of an entity, emitting the definition once
    fn entity_reference(&mut self, id: &'m str) -> Value {
        let key = match self.definition_keys.get(id) {
            Some(key) => key.clone(),
            None => {
                let key = self.allocate_key(id);
                self.definition_keys.insert(id, key.clone());
                // Placeholder keeps first-encounter order and stops recursion
                self.definitions.insert(key.clone(), Value::Null);

                let model = self.model;
                let definition = match model.entity(id) {
                    Some(entity) => self.entity_schema(entity),
                    None => {
                        tracing::warn!("Entity {} is not part of the model", id);
                        json!({"type": "object"})
                    }
                };
                self.definitions.insert(key.clone(), definition);
                key
            }
        };
        json!({ "$ref": format!("#/definitions/{key}") })
    }

    fn entity_schema(&mut self, entity: &'m Entity) -> Value {
        let mut schema = Map::new();
        if self.options.include_metadata {
            if let Some(description) = entity.metadata.description_or_any(&self.options.language) {
                schema.insert("description".to_string(), json!(description));
            }
        }
        schema.extend(self.object_schema(entity.effective_properties()));
        Value::Object(schema)
    }

    /// Local name of the entity, suffixed when another entity already uses it
    fn allocate_key(&self, id: &str) -> String {
        let base = local_name(id);
        if !self.definitions.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}{n}"))
            .find(|key| !self.definitions.contains_key(key))
            .unwrap_or_else(|| id.to_string())
    }
}

fn apply_constraints(schema: &mut Map<String, Value>, constraints: &[Constraint]) {
    let is_array = schema.get("type") == Some(&json!("array"));
    for constraint in constraints {
        match constraint {
            Constraint::Length {
                min_value,
                max_value,
            } => {
                let (min_key, max_key) = if is_array {
                    ("minItems", "maxItems")
                } else {
                    ("minLength", "maxLength")
                };
                if let Some(min) = min_value {
                    schema.insert(min_key.to_string(), json!(min));
                }
                if let Some(max) = max_value {
                    schema.insert(max_key.to_string(), json!(max));
                }
            }
            Constraint::Range {
                min_value,
                max_value,
                lower_bound,
                upper_bound,
            } => {
                if let Some(min) = min_value {
                    let key = if lower_bound.is_exclusive() {
                        "exclusiveMinimum"
                    } else {
                        "minimum"
                    };
                    tighten(schema, key, *min, |bound, current| bound > current);
                }
                if let Some(max) = max_value {
                    let key = if upper_bound.is_exclusive() {
                        "exclusiveMaximum"
                    } else {
                        "maximum"
                    };
                    tighten(schema, key, *max, |bound, current| bound < current);
                }
            }
            _ => {}
        }
    }
}

/// Set a bound keyword unless the schema already carries a stricter one
///
/// Inclusive and exclusive keywords coexist; draft-07 applies both.
fn tighten(
    schema: &mut Map<String, Value>,
    key: &str,
    bound: f64,
    stricter: impl Fn(f64, f64) -> bool,
) {
    let replace = match schema.get(key).and_then(Value::as_f64) {
        Some(current) => stricter(bound, current),
        None => true,
    };
    if replace {
        schema.insert(key.to_string(), bound_value(bound));
    }
}
