//! SAMM to JSON Payload Generator
//!
//! Generates one example JSON payload for an Aspect. Values come from the
//! example values of the model where present, otherwise from the defaults of
//! the datatype table, so the payload validates against the generated schema.

use super::{shape_of, Shape, MAX_GENERATED_LENGTH};
use crate::config::{EitherPreference, InstanceOptions};
use crate::datatype::float_value;
use crate::metamodel::{Characteristic, Constraint, Model, ModelElement, Property};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Generates an example payload of one [`Model`]
pub struct InstanceGenerator<'m> {
    model: &'m Model,
    options: InstanceOptions,
    /// Entities currently being expanded, outermost first
    path: Vec<&'m str>,
}

impl<'m> InstanceGenerator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self::with_options(model, InstanceOptions::default())
    }

    pub fn with_options(model: &'m Model, options: InstanceOptions) -> Self {
        Self {
            model,
            options,
            path: Vec::new(),
        }
    }

    /// Generate the payload document
    pub fn generate(mut self) -> Value {
        let model = self.model;
        let aspect = model.aspect();
        tracing::debug!("Generating example payload for {}", aspect.urn());
        Value::Object(self.object_value(aspect.properties()))
    }

    fn object_value(&mut self, properties: &'m [Property]) -> Map<String, Value> {
        let mut object = Map::new();
        let mut seen = HashSet::new();
        for property in properties.iter().filter(|property| property.in_payload()) {
            let key = property.payload_key();
            if !seen.insert(key.clone()) {
                continue;
            }
            let value = match &property.example_value {
                Some(example) => self.fit_example(&property.characteristic, example),
                None if property.optional => continue,
                None => self.characteristic_value(&property.characteristic),
            };
            object.insert(key, value);
        }
        object
    }

    /// Bring a literal example into the shape of its characteristic
    fn fit_example(&mut self, characteristic: &'m Characteristic, example: &Value) -> Value {
        match shape_of(characteristic) {
            Shape::Array { .. } if !example.is_array() => json!([example]),
            Shape::Either { .. } | Shape::Entity(_) => {
                tracing::debug!(
                    "Example value of {} does not fit its shape, using the default",
                    characteristic.urn()
                );
                self.characteristic_value(characteristic)
            }
            _ => example.clone(),
        }
    }

    fn characteristic_value(&mut self, characteristic: &'m Characteristic) -> Value {
        self.shape_value(shape_of(characteristic))
    }

    fn shape_value(&mut self, shape: Shape<'m>) -> Value {
        match shape {
            Shape::Scalar(info) => info.default_value(&self.options.default_language),
            Shape::Enumerated { values, .. } => values.first().cloned().unwrap_or(Value::Null),
            Shape::Array { items, .. } => json!([self.shape_value(*items)]),
            Shape::Either { left, right } => {
                let (key, branch) = self.either_branch(left, right);
                let value = self.characteristic_value(branch);
                let mut object = Map::new();
                object.insert(key.to_string(), value);
                Value::Object(object)
            }
            Shape::Entity(id) => self.entity_value(id),
            Shape::Constrained { base, constraints } => {
                let element = unique_element(&shape_of(base));
                let mut value = self.characteristic_value(base);
                for constraint in constraints {
                    value = match (&element, constraint, value) {
                        (
                            Some(element),
                            Constraint::Length {
                                min_value,
                                max_value,
                            },
                            Value::Array(items),
                        ) => {
                            let mut items =
                                self.distinct_items(items, element, min_value.unwrap_or(0));
                            if let Some(max) = max_value {
                                items.truncate(*max as usize);
                            }
                            Value::Array(items)
                        }
                        (_, constraint, value) => satisfy(value, constraint),
                    };
                }
                value
            }
            Shape::Opaque => json!({}),
        }
    }

    /// Pad the elements of a set to `min` with values not yet present
    fn distinct_items(
        &mut self,
        mut items: Vec<Value>,
        element: &Shape<'m>,
        min: u64,
    ) -> Vec<Value> {
        let target = min.min(MAX_GENERATED_LENGTH) as usize;
        let attempts = target.saturating_mul(2).max(8);
        for n in 1..attempts {
            if items.len() >= target {
                break;
            }
            let Some(candidate) = self.nth_value(element, n) else {
                break;
            };
            if !items.contains(&candidate) {
                items.push(candidate);
            }
        }
        if items.len() < target {
            tracing::warn!(
                "Only {} distinct elements could be generated where {} are required",
                items.len(),
                target
            );
        }
        items
    }

    /// The `n`-th of a sequence of values of one shape, starting with its default
    fn nth_value(&mut self, shape: &Shape<'m>, n: usize) -> Option<Value> {
        if n == 0 {
            return Some(self.shape_value(shape.clone()));
        }
        match shape {
            Shape::Scalar(info) => info.nth_value(n, &self.options.default_language),
            Shape::Enumerated { values, .. } => values.get(n).cloned(),
            Shape::Constrained { base, constraints } => {
                let value = self.nth_value(&shape_of(*base), n)?;
                Some(
                    constraints
                        .iter()
                        .fold(value, |value, constraint| satisfy(value, constraint)),
                )
            }
            _ => None,
        }
    }

    /// Preferred branch, unless only the other one avoids a truncated cycle
    fn either_branch(
        &self,
        left: &'m Characteristic,
        right: &'m Characteristic,
    ) -> (&'static str, &'m Characteristic) {
        let (preferred, other) = match self.options.either_preference {
            EitherPreference::Right => (("right", right), ("left", left)),
            EitherPreference::Left => (("left", left), ("right", right)),
        };
        if self.truncates(preferred.1) && !self.truncates(other.1) {
            other
        } else {
            preferred
        }
    }

    fn truncates(&self, characteristic: &'m Characteristic) -> bool {
        matches!(shape_of(characteristic), Shape::Entity(id) if self.path.contains(&id))
    }

    fn entity_value(&mut self, id: &'m str) -> Value {
        if self.path.contains(&id) {
            tracing::debug!("Entity {} is already being expanded, emitting an empty object", id);
            return json!({});
        }
        let model = self.model;
        let Some(entity) = model.entity(id) else {
            return json!({});
        };

        self.path.push(id);
        let object = self.object_value(entity.effective_properties());
        self.path.pop();
        Value::Object(object)
    }
}

/// Element shape of a set, looking through constraints on the set itself
fn unique_element<'a>(shape: &Shape<'a>) -> Option<Shape<'a>> {
    match shape {
        Shape::Array {
            items,
            unique: true,
        } => Some((**items).clone()),
        Shape::Constrained { base, .. } => unique_element(&shape_of(*base)),
        _ => None,
    }
}

/// Adjust a default value until it satisfies one constraint
fn satisfy(value: Value, constraint: &Constraint) -> Value {
    match (constraint, value) {
        (
            Constraint::Length {
                min_value,
                max_value,
            },
            Value::String(text),
        ) => {
            let mut chars: Vec<char> = text.chars().collect();
            if let Some(min) = min_value {
                let min = (*min).min(MAX_GENERATED_LENGTH) as usize;
                if chars.len() < min {
                    chars.resize(min, 'x');
                }
            }
            if let Some(max) = max_value {
                chars.truncate(*max as usize);
            }
            Value::String(chars.into_iter().collect())
        }
        (
            Constraint::Length {
                min_value,
                max_value,
            },
            Value::Array(mut items),
        ) => {
            if let (Some(min), Some(first)) = (min_value, items.first().cloned()) {
                let min = (*min).min(MAX_GENERATED_LENGTH) as usize;
                if items.len() < min {
                    items.resize(min, first);
                }
            }
            if let Some(max) = max_value {
                items.truncate(*max as usize);
            }
            Value::Array(items)
        }
        (
            Constraint::Range {
                min_value,
                max_value,
                lower_bound,
                upper_bound,
            },
            Value::Number(number),
        ) => {
            let integral = number.is_i64() || number.is_u64();
            let current = number.as_f64().unwrap_or(0.0);
            let above = |x: f64| match min_value {
                Some(min) if lower_bound.is_exclusive() => x > *min,
                Some(min) => x >= *min,
                None => true,
            };
            let below = |x: f64| match max_value {
                Some(max) if upper_bound.is_exclusive() => x < *max,
                Some(max) => x <= *max,
                None => true,
            };
            if above(current) && below(current) {
                return Value::Number(number);
            }

            let candidates = match (min_value, max_value) {
                (Some(min), Some(max)) => vec![
                    *min,
                    *max,
                    (min + max) / 2.0,
                    ((min + max) / 2.0).floor(),
                    min.floor() + 1.0,
                    max.ceil() - 1.0,
                ],
                (Some(min), None) => vec![*min, min.floor() + 1.0],
                (None, Some(max)) => vec![*max, max.ceil() - 1.0],
                (None, None) => Vec::new(),
            };
            match candidates
                .into_iter()
                .filter(|candidate| !integral || candidate.fract() == 0.0)
                .find(|candidate| above(*candidate) && below(*candidate))
            {
                Some(adjusted) if integral => Value::from(adjusted as i64),
                Some(adjusted) => float_value(adjusted),
                None => Value::Number(number),
            }
        }
        (_, value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::{
        Aspect, BoundDefinition, CharacteristicKind, CollectionKind, DataType, ElementType,
        Entity,
    };
    use std::collections::BTreeMap;

    const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    fn scalar(name: &str, datatype: &str) -> Characteristic {
        Characteristic::new(format!("urn:x#{name}"), CharacteristicKind::Characteristic)
            .with_data_type(DataType::Scalar(format!("{XSD}{datatype}")))
    }

    fn single(id: &str) -> Characteristic {
        Characteristic::new(format!("{id}Characteristic"), CharacteristicKind::SingleEntity)
            .with_data_type(DataType::Entity(id.to_string()))
    }

    fn model(properties: Vec<Property>, entities: Vec<Entity>) -> Model {
        let mut aspect = Aspect::new("urn:x#Test");
        for property in properties {
            aspect.add_property(property);
        }
        Model {
            namespace: "urn:x#".to_string(),
            aspect,
            properties: BTreeMap::new(),
            entities: entities
                .into_iter()
                .map(|entity| (entity.metadata.urn.clone(), entity))
                .collect(),
            characteristics: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    fn entity(id: &str, properties: Vec<Property>) -> Entity {
        let mut entity = Entity::new(id);
        entity.properties = properties;
        entity.flatten_onto(&[]);
        entity
    }

    #[test]
    fn test_defaults_and_examples() {
        let instance = InstanceGenerator::new(&model(
            vec![
                Property::new("urn:x#count", scalar("Count", "int")),
                Property::new("urn:x#label", scalar("Label", "string"))
                    .with_example_value(json!("pump")),
                Property::new("urn:x#comment", scalar("Comment", "string")).as_optional(),
                Property::new("urn:x#note", scalar("Note", "string"))
                    .as_optional()
                    .with_example_value(json!("checked")),
                Property::new(
                    "urn:x#names",
                    Characteristic::new("urn:x#Names", CharacteristicKind::MultiLanguageText),
                ),
            ],
            Vec::new(),
        ))
        .generate();

        assert_eq!(
            instance,
            json!({"count": 0, "label": "pump", "note": "checked", "names": {"en": ""}})
        );
    }

    #[test]
    fn test_shared_payload_key_keeps_first_property() {
        let instance = InstanceGenerator::new(&model(
            vec![
                Property::new("urn:x#partId", scalar("PartId", "int"))
                    .as_optional()
                    .with_payload_name("serial"),
                Property::new("urn:x#serial", scalar("Serial", "string")),
            ],
            Vec::new(),
        ))
        .generate();
        assert_eq!(instance, json!({}));
    }

    #[test]
    fn test_either_prefers_right() {
        let result = Characteristic::new(
            "urn:x#Result",
            CharacteristicKind::Either {
                left: Box::new(scalar("Error", "string")),
                right: Box::new(scalar("Value", "int")),
            },
        );
        let aspect_model = model(vec![Property::new("urn:x#result", result)], Vec::new());

        assert_eq!(
            InstanceGenerator::new(&aspect_model).generate(),
            json!({"result": {"right": 0}})
        );

        let options = InstanceOptions {
            either_preference: EitherPreference::Left,
            ..InstanceOptions::default()
        };
        assert_eq!(
            InstanceGenerator::with_options(&aspect_model, options).generate(),
            json!({"result": {"left": ""}})
        );
    }

    #[test]
    fn test_either_avoids_truncated_branch() {
        let node = entity(
            "urn:x#Node",
            vec![Property::new(
                "urn:x#next",
                Characteristic::new(
                    "urn:x#Next",
                    CharacteristicKind::Either {
                        left: Box::new(scalar("End", "boolean")),
                        right: Box::new(single("urn:x#Node")),
                    },
                ),
            )],
        );
        let instance = InstanceGenerator::new(&model(
            vec![Property::new("urn:x#root", single("urn:x#Node"))],
            vec![node],
        ))
        .generate();
        assert_eq!(instance, json!({"root": {"next": {"left": false}}}));
    }

    #[test]
    fn test_recursive_entity_is_cut() {
        let node = entity(
            "urn:x#Node",
            vec![
                Property::new("urn:x#value", scalar("Value", "int")),
                Property::new("urn:x#child", single("urn:x#Node")),
            ],
        );
        let instance = InstanceGenerator::new(&model(
            vec![Property::new("urn:x#root", single("urn:x#Node"))],
            vec![node],
        ))
        .generate();
        assert_eq!(instance, json!({"root": {"value": 0, "child": {}}}));
    }

    #[test]
    fn test_collections_hold_one_element() {
        let tags = Characteristic::new(
            "urn:x#Tags",
            CharacteristicKind::Collection {
                kind: CollectionKind::Set,
                element: ElementType::DataType(DataType::Scalar(format!("{XSD}string"))),
            },
        );
        let instance = InstanceGenerator::new(&model(
            vec![
                Property::new("urn:x#tags", tags.clone()),
                Property::new("urn:x#more", tags).with_example_value(json!("alpha")),
            ],
            Vec::new(),
        ))
        .generate();
        assert_eq!(instance, json!({"tags": [""], "more": ["alpha"]}));
    }

    #[test]
    fn test_enumeration_first_value() {
        let state = Characteristic::new(
            "urn:x#Level",
            CharacteristicKind::State {
                values: vec![json!("LOW"), json!("HIGH")],
                default_value: Some(json!("HIGH")),
            },
        );
        let instance =
            InstanceGenerator::new(&model(vec![Property::new("urn:x#level", state)], Vec::new()))
                .generate();
        assert_eq!(instance, json!({"level": "LOW"}));
    }

    #[test]
    fn test_constraints_adjust_defaults() {
        let range = Constraint::Range {
            min_value: Some(10.0),
            max_value: Some(20.0),
            lower_bound: BoundDefinition::GreaterThan,
            upper_bound: BoundDefinition::AtMost,
        };
        assert_eq!(satisfy(json!(0), &range), json!(20));
        assert_eq!(satisfy(json!(15), &range), json!(15));

        let open = Constraint::Range {
            min_value: Some(0.0),
            max_value: Some(1.0),
            lower_bound: BoundDefinition::GreaterThan,
            upper_bound: BoundDefinition::LessThan,
        };
        assert_eq!(satisfy(json!(0.0), &open), json!(0.5));

        let length = Constraint::Length {
            min_value: Some(3),
            max_value: None,
        };
        assert_eq!(satisfy(json!(""), &length), json!("xxx"));
        assert_eq!(satisfy(json!([1]), &length), json!([1, 1, 1]));
    }

    fn constrained(name: &str, base: Characteristic, constraint: Constraint) -> Characteristic {
        Characteristic::new(
            format!("urn:x#{name}"),
            CharacteristicKind::Trait {
                base: Box::new(base),
                constraints: vec![constraint],
            },
        )
    }

    fn collection(name: &str, kind: CollectionKind, datatype: &str) -> Characteristic {
        Characteristic::new(
            format!("urn:x#{name}"),
            CharacteristicKind::Collection {
                kind,
                element: ElementType::DataType(DataType::Scalar(format!("{XSD}{datatype}"))),
            },
        )
    }

    #[test]
    fn test_sized_set_holds_distinct_elements() {
        let length = Constraint::Length {
            min_value: Some(3),
            max_value: Some(5),
        };
        let instance = InstanceGenerator::new(&model(
            vec![
                Property::new(
                    "urn:x#tags",
                    constrained(
                        "Tags",
                        collection("TagSet", CollectionKind::Set, "string"),
                        length.clone(),
                    ),
                ),
                Property::new(
                    "urn:x#readings",
                    constrained(
                        "Readings",
                        collection("ReadingList", CollectionKind::List, "int"),
                        length,
                    ),
                ),
            ],
            Vec::new(),
        ))
        .generate();
        assert_eq!(instance, json!({"tags": ["", "1", "2"], "readings": [0, 0, 0]}));
    }

    #[test]
    fn test_sized_set_stops_when_values_run_out() {
        let flags = constrained(
            "Flags",
            collection("FlagSet", CollectionKind::Set, "boolean"),
            Constraint::Length {
                min_value: Some(3),
                max_value: None,
            },
        );
        let instance =
            InstanceGenerator::new(&model(vec![Property::new("urn:x#flags", flags)], Vec::new()))
                .generate();
        assert_eq!(instance, json!({"flags": [false, true]}));
    }

    #[test]
    fn test_padding_is_capped() {
        let huge = Constraint::Length {
            min_value: Some(10_000_000_000_000),
            max_value: None,
        };
        let text = satisfy(json!(""), &huge);
        assert_eq!(text.as_str().map(str::len), Some(MAX_GENERATED_LENGTH as usize));

        let items = satisfy(json!([1]), &huge);
        assert_eq!(items.as_array().map(Vec::len), Some(MAX_GENERATED_LENGTH as usize));

        let tags = constrained(
            "Tags",
            collection("TagSet", CollectionKind::Set, "string"),
            huge,
        );
        let instance =
            InstanceGenerator::new(&model(vec![Property::new("urn:x#tags", tags)], Vec::new()))
                .generate();
        let generated = instance["tags"].as_array().cloned().unwrap_or_default();
        assert_eq!(generated.len(), MAX_GENERATED_LENGTH as usize);
        assert_eq!(generated[1023], json!("1023"));
    }
}
