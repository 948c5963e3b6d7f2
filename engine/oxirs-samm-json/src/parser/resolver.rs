//! Characteristic resolution
//!
//! Classifies characteristic nodes, named or anonymous, into the closed set of
//! [`CharacteristicKind`]s. Classification goes through one fixed table from
//! declared type to kind; a type that is not in the table degrades to
//! [`CharacteristicKind::Opaque`] with a diagnostic instead of failing the
//! whole model.

use super::graph::{Node, StatementGraph};
use super::read_metadata;
use super::vocab::Vocabulary;
use crate::datatype::literal_to_json;
use crate::error::{ReferenceKind, Result, SammError};
use crate::generators::MAX_GENERATED_LENGTH;
use crate::metamodel::{
    local_name, BoundDefinition, Characteristic, CharacteristicKind, CollectionKind, Constraint,
    DataType, Diagnostic, ElementType,
};
use oxrdf::vocab::rdf;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

/// Constructor selected by the declared type of a characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindTag {
    Plain,
    Boolean,
    Text,
    Timestamp,
    Code,
    MultiLanguageText,
    UnitReference,
    Measurement,
    Quantifiable,
    Duration,
    Enumeration,
    State,
    Collection(CollectionKind),
    Either,
    SingleEntity,
    StructuredValue,
    Trait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Samm,
    SammC,
}

/// Declared characteristic types and the kind each one constructs
const CHARACTERISTIC_TYPES: &[(Namespace, &str, KindTag)] = &[
    (Namespace::Samm, "Characteristic", KindTag::Plain),
    (Namespace::SammC, "Trait", KindTag::Trait),
    (Namespace::SammC, "Quantifiable", KindTag::Quantifiable),
    (Namespace::SammC, "Measurement", KindTag::Measurement),
    (Namespace::SammC, "Duration", KindTag::Duration),
    (Namespace::SammC, "Enumeration", KindTag::Enumeration),
    (Namespace::SammC, "State", KindTag::State),
    (Namespace::SammC, "Collection", KindTag::Collection(CollectionKind::Collection)),
    (Namespace::SammC, "List", KindTag::Collection(CollectionKind::List)),
    (Namespace::SammC, "Set", KindTag::Collection(CollectionKind::Set)),
    (Namespace::SammC, "SortedSet", KindTag::Collection(CollectionKind::SortedSet)),
    (Namespace::SammC, "TimeSeries", KindTag::Collection(CollectionKind::TimeSeries)),
    (Namespace::SammC, "Code", KindTag::Code),
    (Namespace::SammC, "Either", KindTag::Either),
    (Namespace::SammC, "SingleEntity", KindTag::SingleEntity),
    (Namespace::SammC, "StructuredValue", KindTag::StructuredValue),
    (Namespace::SammC, "Boolean", KindTag::Boolean),
    (Namespace::SammC, "Text", KindTag::Text),
    (Namespace::SammC, "Timestamp", KindTag::Timestamp),
    (Namespace::SammC, "MultiLanguageText", KindTag::MultiLanguageText),
    (Namespace::SammC, "UnitReference", KindTag::UnitReference),
];

/// Predefined `samm-c:` characteristic instances, usable without a definition
const PREDEFINED: &[(&str, KindTag, Option<&str>)] = &[
    ("Text", KindTag::Text, None),
    ("Boolean", KindTag::Boolean, None),
    ("Timestamp", KindTag::Timestamp, None),
    ("MultiLanguageText", KindTag::MultiLanguageText, None),
    ("UnitReference", KindTag::UnitReference, None),
    (
        "ResourcePath",
        KindTag::Plain,
        Some("http://www.w3.org/2001/XMLSchema#anyURI"),
    ),
    (
        "MimeType",
        KindTag::Plain,
        Some("http://www.w3.org/2001/XMLSchema#string"),
    ),
    (
        "Language",
        KindTag::Plain,
        Some("http://www.w3.org/2001/XMLSchema#string"),
    ),
    (
        "Locale",
        KindTag::Plain,
        Some("http://www.w3.org/2001/XMLSchema#string"),
    ),
];

/// Resolves characteristic nodes into [`Characteristic`] values
///
/// Named characteristics are resolved once and cached by IRI; anonymous ones
/// are resolved wherever they occur and never cached.
pub struct CharacteristicResolver<'g> {
    graph: &'g dyn StatementGraph,
    vocab: Vocabulary,
    named: BTreeMap<String, Characteristic>,
    in_progress: HashSet<Node>,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> CharacteristicResolver<'g> {
    pub fn new(graph: &'g dyn StatementGraph, vocab: Vocabulary) -> Self {
        Self {
            graph,
            vocab,
            named: BTreeMap::new(),
            in_progress: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Named characteristics resolved so far
    pub fn named(&self) -> &BTreeMap<String, Characteristic> {
        &self.named
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<String, Characteristic>, Vec<Diagnostic>) {
        (self.named, self.diagnostics)
    }

    /// Record a non-fatal finding
    pub(crate) fn diagnose(&mut self, element: &str, message: String) {
        tracing::warn!("{}: {}", element, message);
        self.diagnostics.push(Diagnostic {
            element: element.to_string(),
            message,
        });
    }

    /// Whether a node is declared as `samm:Entity` or `samm:AbstractEntity`
    pub fn is_entity(&self, node: &Node) -> bool {
        self.graph.has_type(node, &self.vocab.samm("Entity"))
            || self.graph.has_type(node, &self.vocab.samm("AbstractEntity"))
    }

    /// Resolve the characteristic at `node`, referenced from `referrer`
    pub fn resolve(&mut self, node: &Node, referrer: &str) -> Result<Characteristic> {
        if let Some(cached) = node.as_iri().and_then(|iri| self.named.get(iri)) {
            return Ok(cached.clone());
        }
        if !self.in_progress.insert(node.clone()) {
            return Err(SammError::CyclicCharacteristic {
                characteristic: node.to_string(),
            });
        }

        let resolved = self.resolve_node(node, referrer);
        self.in_progress.remove(node);
        let characteristic = resolved?;

        if let Some(iri) = node.as_iri() {
            tracing::debug!("Resolved characteristic {} as {:?}", iri, characteristic.kind);
            self.named.insert(iri.to_string(), characteristic.clone());
        }
        Ok(characteristic)
    }

    fn resolve_node(&mut self, node: &Node, referrer: &str) -> Result<Characteristic> {
        if let Some(predefined) = self.predefined(node) {
            return Ok(predefined);
        }

        let id = node.to_string();
        if !node.is_resource() || !self.graph.describes(node) {
            return Err(SammError::unresolved(
                ReferenceKind::Characteristic,
                id,
                referrer,
            ));
        }

        let mut characteristic = Characteristic::new(id.clone(), CharacteristicKind::Characteristic);
        read_metadata(self.graph, &self.vocab, node, &mut characteristic.metadata);

        if let Some(data_type) = self.graph.object(node, &self.vocab.samm("dataType")) {
            characteristic.data_type = Some(self.data_type(&data_type, &id)?);
        }

        let declared: Vec<String> = self
            .graph
            .objects(node, rdf::TYPE.as_str())
            .into_iter()
            .filter_map(|t| t.as_iri().map(str::to_string))
            .collect();

        characteristic.kind = match declared.iter().find_map(|t| self.classify(t)) {
            Some(tag) => self.construct(tag, node, &characteristic)?,
            None => {
                let kind = declared
                    .first()
                    .map(|t| local_name(t).to_string())
                    .unwrap_or_else(|| "untyped".to_string());
                self.diagnose(
                    &id,
                    format!("unknown characteristic type '{kind}', treated as an opaque object"),
                );
                CharacteristicKind::Opaque { kind }
            }
        };

        Ok(characteristic)
    }

    fn predefined(&self, node: &Node) -> Option<Characteristic> {
        let local = self.vocab.samm_c_local(node.as_iri()?)?;
        let (_, tag, data_type) = PREDEFINED.iter().find(|(name, _, _)| *name == local)?;

        let kind = match tag {
            KindTag::Text => CharacteristicKind::Text,
            KindTag::Boolean => CharacteristicKind::Boolean,
            KindTag::Timestamp => CharacteristicKind::Timestamp,
            KindTag::MultiLanguageText => CharacteristicKind::MultiLanguageText,
            KindTag::UnitReference => CharacteristicKind::UnitReference,
            _ => CharacteristicKind::Characteristic,
        };
        let mut characteristic = Characteristic::new(node.to_string(), kind);
        characteristic.data_type = data_type.map(|iri| DataType::Scalar(iri.to_string()));
        Some(characteristic)
    }

    fn classify(&self, type_iri: &str) -> Option<KindTag> {
        let (namespace, local) = if let Some(local) = self.vocab.samm_local(type_iri) {
            (Namespace::Samm, local)
        } else {
            (Namespace::SammC, self.vocab.samm_c_local(type_iri)?)
        };
        CHARACTERISTIC_TYPES
            .iter()
            .find(|(ns, name, _)| *ns == namespace && *name == local)
            .map(|(_, _, tag)| *tag)
    }

    fn construct(
        &mut self,
        tag: KindTag,
        node: &Node,
        characteristic: &Characteristic,
    ) -> Result<CharacteristicKind> {
        let id = characteristic.metadata.urn.as_str();
        let kind = match tag {
            KindTag::Plain => CharacteristicKind::Characteristic,
            KindTag::Boolean => CharacteristicKind::Boolean,
            KindTag::Text => CharacteristicKind::Text,
            KindTag::Timestamp => CharacteristicKind::Timestamp,
            KindTag::Code => CharacteristicKind::Code,
            KindTag::MultiLanguageText => CharacteristicKind::MultiLanguageText,
            KindTag::UnitReference => CharacteristicKind::UnitReference,
            KindTag::Measurement => {
                let unit = self.unit(node);
                if unit.is_none() {
                    self.diagnose(id, "Measurement without unit".to_string());
                }
                CharacteristicKind::Measurement { unit }
            }
            KindTag::Quantifiable => CharacteristicKind::Quantifiable {
                unit: self.unit(node),
            },
            KindTag::Duration => CharacteristicKind::Duration {
                unit: self.unit(node),
            },
            KindTag::Enumeration => CharacteristicKind::Enumeration {
                values: self.values(node, characteristic)?,
            },
            KindTag::State => {
                let values = self.values(node, characteristic)?;
                let default_value = self
                    .graph
                    .object(node, &self.vocab.samm_c("defaultValue"))
                    .map(|value| self.value_to_json(&value, characteristic.effective_data_type()));
                CharacteristicKind::State {
                    values,
                    default_value,
                }
            }
            KindTag::Collection(kind) => {
                let element = match self
                    .graph
                    .object(node, &self.vocab.samm_c("elementCharacteristic"))
                {
                    Some(element) => ElementType::Characteristic(Box::new(self.resolve(&element, id)?)),
                    None => match &characteristic.data_type {
                        Some(data_type) => ElementType::DataType(data_type.clone()),
                        None => {
                            return Err(SammError::MissingCollectionElementType {
                                characteristic: id.to_string(),
                            })
                        }
                    },
                };
                CharacteristicKind::Collection { kind, element }
            }
            KindTag::Either => {
                let left = self.either_branch(node, id, "left")?;
                let right = self.either_branch(node, id, "right")?;
                CharacteristicKind::Either {
                    left: Box::new(self.resolve(&left, id)?),
                    right: Box::new(self.resolve(&right, id)?),
                }
            }
            KindTag::SingleEntity => {
                if characteristic.entity_ref().is_none() {
                    let declared = characteristic
                        .effective_data_type()
                        .unwrap_or("samm:dataType")
                        .to_string();
                    return Err(SammError::unresolved(ReferenceKind::Entity, declared, id));
                }
                CharacteristicKind::SingleEntity
            }
            KindTag::StructuredValue => self.structured_value(node, id)?,
            KindTag::Trait => {
                let base = self
                    .graph
                    .object(node, &self.vocab.samm_c("baseCharacteristic"))
                    .ok_or_else(|| {
                        SammError::unresolved(
                            ReferenceKind::Characteristic,
                            "samm-c:baseCharacteristic",
                            id,
                        )
                    })?;
                let base = self.resolve(&base, id)?;
                let constraints = self
                    .graph
                    .objects(node, &self.vocab.samm_c("constraint"))
                    .iter()
                    .map(|constraint| self.constraint(constraint, id))
                    .collect::<Result<Vec<_>>>()?;
                CharacteristicKind::Trait {
                    base: Box::new(base),
                    constraints,
                }
            }
        };
        Ok(kind)
    }

    fn either_branch(&self, node: &Node, id: &str, branch: &'static str) -> Result<Node> {
        self.graph
            .object(node, &self.vocab.samm_c(branch))
            .ok_or_else(|| SammError::IncompleteEither {
                characteristic: id.to_string(),
                missing: branch,
            })
    }

    fn data_type(&self, node: &Node, referrer: &str) -> Result<DataType> {
        let iri = node.as_iri().ok_or_else(|| {
            SammError::unresolved(ReferenceKind::Entity, node.to_string(), referrer)
        })?;
        if self.is_entity(node) {
            return Ok(DataType::Entity(iri.to_string()));
        }
        if self.vocab.is_scalar_datatype(iri) {
            return Ok(DataType::Scalar(iri.to_string()));
        }
        Err(SammError::unresolved(ReferenceKind::Entity, iri, referrer))
    }

    fn unit(&self, node: &Node) -> Option<String> {
        self.graph
            .object(node, &self.vocab.samm_c("unit"))
            .or_else(|| self.graph.object(node, &self.vocab.samm("unit")))
            .and_then(|unit| unit.as_iri().map(|iri| self.vocab.compact_unit(iri)))
    }

    fn values(&self, node: &Node, characteristic: &Characteristic) -> Result<Vec<Value>> {
        let Some(head) = self.graph.object(node, &self.vocab.samm_c("values")) else {
            return Ok(Vec::new());
        };
        let hint = characteristic.effective_data_type();
        Ok(self
            .graph
            .list_items(&head)?
            .iter()
            .map(|value| self.value_to_json(value, hint))
            .collect())
    }

    /// Literal values convert by datatype; entity instances become objects
    /// keyed by the local names of their property statements.
    fn value_to_json(&self, node: &Node, hint: Option<&str>) -> Value {
        match node {
            Node::Literal(literal) => literal_to_json(literal, hint),
            _ => {
                let mut statements = self.graph.statements_about(node);
                statements.retain(|statement| statement.predicate != rdf::TYPE.as_str());
                if statements.is_empty() {
                    return Value::String(node_label(node));
                }
                statements.sort();

                let mut object = Map::new();
                for statement in statements {
                    let value = match &statement.object {
                        Node::Literal(literal) => literal_to_json(literal, None),
                        other => Value::String(node_label(other)),
                    };
                    object.insert(local_name(&statement.predicate).to_string(), value);
                }
                Value::Object(object)
            }
        }
    }

    fn structured_value(&mut self, node: &Node, id: &str) -> Result<CharacteristicKind> {
        let deconstruction_rule = match self
            .graph
            .object(node, &self.vocab.samm_c("deconstructionRule"))
        {
            Some(Node::Literal(literal)) => literal.value,
            _ => {
                self.diagnose(id, "StructuredValue without deconstruction rule".to_string());
                String::new()
            }
        };
        let elements = match self.graph.object(node, &self.vocab.samm_c("elements")) {
            Some(head) => self
                .graph
                .list_items(&head)?
                .into_iter()
                .map(|element| match element {
                    Node::Literal(literal) => literal.value,
                    other => other.to_string(),
                })
                .collect(),
            None => Vec::new(),
        };
        Ok(CharacteristicKind::StructuredValue {
            deconstruction_rule,
            elements,
        })
    }

    fn constraint(&mut self, node: &Node, referrer: &str) -> Result<Constraint> {
        if !self.graph.describes(node) {
            return Err(SammError::unresolved(
                ReferenceKind::Constraint,
                node.to_string(),
                referrer,
            ));
        }

        let kind = self
            .graph
            .objects(node, rdf::TYPE.as_str())
            .iter()
            .filter_map(|t| t.as_iri().and_then(|iri| self.vocab.samm_c_local(iri)))
            .map(str::to_string)
            .next()
            .unwrap_or_else(|| "untyped".to_string());

        let literal_of = |predicate: String| -> Option<String> {
            match self.graph.object(node, &predicate)? {
                Node::Literal(literal) => Some(literal.value),
                Node::Iri(iri) => Some(local_name(&iri).to_string()),
                Node::Blank(_) => None,
            }
        };

        let constraint = match kind.as_str() {
            "LengthConstraint" => Constraint::Length {
                min_value: parse_number(literal_of(self.vocab.samm_c("minValue"))),
                max_value: parse_number(literal_of(self.vocab.samm_c("maxValue"))),
            },
            "RangeConstraint" => Constraint::Range {
                min_value: parse_number(literal_of(self.vocab.samm_c("minValue"))),
                max_value: parse_number(literal_of(self.vocab.samm_c("maxValue"))),
                lower_bound: bound_definition(
                    literal_of(self.vocab.samm_c("lowerBoundDefinition")),
                    BoundDefinition::AtLeast,
                ),
                upper_bound: bound_definition(
                    literal_of(self.vocab.samm_c("upperBoundDefinition")),
                    BoundDefinition::AtMost,
                ),
            },
            "RegularExpressionConstraint" => Constraint::RegularExpression {
                pattern: literal_of(self.vocab.samm("value")).unwrap_or_default(),
            },
            "EncodingConstraint" => Constraint::Encoding {
                encoding: literal_of(self.vocab.samm("value")).unwrap_or_default(),
            },
            "LanguageConstraint" => Constraint::Language {
                language_code: literal_of(self.vocab.samm_c("languageCode")).unwrap_or_default(),
            },
            "LocaleConstraint" => Constraint::Locale {
                locale_code: literal_of(self.vocab.samm_c("localeCode")).unwrap_or_default(),
            },
            "FixedPointConstraint" => Constraint::FixedPoint {
                integer: parse_number(literal_of(self.vocab.samm_c("integer"))).unwrap_or(0),
                scale: parse_number(literal_of(self.vocab.samm_c("scale"))).unwrap_or(0),
            },
            _ => Constraint::Other { kind: kind.clone() },
        };
        match &constraint {
            Constraint::Other { .. } => self.diagnose(
                referrer,
                format!("unknown constraint type '{kind}' is ignored"),
            ),
            Constraint::Length {
                min_value: Some(min),
                ..
            } if *min > MAX_GENERATED_LENGTH => self.diagnose(
                referrer,
                format!(
                    "length minimum {min} exceeds {MAX_GENERATED_LENGTH}, example values stay shorter"
                ),
            ),
            _ => {}
        }
        Ok(constraint)
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Iri(iri) => local_name(iri).to_string(),
        Node::Literal(literal) => literal.value.clone(),
        blank => blank.to_string(),
    }
}

fn parse_number<T: FromStr>(lexical: Option<String>) -> Option<T> {
    lexical.and_then(|value| value.trim().parse().ok())
}

fn bound_definition(name: Option<String>, default: BoundDefinition) -> BoundDefinition {
    match name.as_deref() {
        Some("OPEN") => BoundDefinition::Open,
        Some("AT_LEAST") => BoundDefinition::AtLeast,
        Some("GREATER_THAN") => BoundDefinition::GreaterThan,
        Some("AT_MOST") => BoundDefinition::AtMost,
        Some("LESS_THAN") => BoundDefinition::LessThan,
        _ => default,
    }
}
