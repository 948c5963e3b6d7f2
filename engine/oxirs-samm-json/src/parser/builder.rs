//! Model builder
//!
//! Turns a statement graph into an immutable [`Model`]. All integrity checks
//! happen here; the generators rely on every reference being resolved.

use super::graph::{Node, StatementGraph};
use super::read_metadata;
use super::resolver::CharacteristicResolver;
use super::vocab::{Vocabulary, SAMM_VERSIONS};
use crate::config::ParserOptions;
use crate::datatype::literal_to_json;
use crate::error::{ReferenceKind, Result, SammError};
use crate::metamodel::{Aspect, Entity, Model, Property};
use std::collections::BTreeMap;

/// Builds a [`Model`] from a statement graph
pub struct ModelBuilder<'g> {
    graph: &'g dyn StatementGraph,
    vocab: Vocabulary,
    resolver: CharacteristicResolver<'g>,
    properties: BTreeMap<String, Property>,
    entities: BTreeMap<String, Entity>,
    /// Entities whose parents are being resolved, outermost first
    entity_chain: Vec<String>,
}

impl<'g> ModelBuilder<'g> {
    /// Builder with the SAMM version detected from the graph
    pub fn new(graph: &'g dyn StatementGraph) -> Self {
        Self::with_vocabulary(graph, Vocabulary::detect(graph))
    }

    /// Builder honoring parser options
    pub fn with_options(graph: &'g dyn StatementGraph, options: &ParserOptions) -> Self {
        match options.samm_version.as_deref() {
            Some(version) => {
                if !SAMM_VERSIONS.contains(&version) {
                    tracing::warn!("SAMM version {} is not a known meta model version", version);
                }
                Self::with_vocabulary(graph, Vocabulary::new(version))
            }
            None => Self::new(graph),
        }
    }

    pub fn with_vocabulary(graph: &'g dyn StatementGraph, vocab: Vocabulary) -> Self {
        Self {
            graph,
            resolver: CharacteristicResolver::new(graph, vocab.clone()),
            vocab,
            properties: BTreeMap::new(),
            entities: BTreeMap::new(),
            entity_chain: Vec::new(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Resolve the whole model
    pub fn build(mut self) -> Result<Model> {
        tracing::info!("Building aspect model (SAMM {})", self.vocab.version());

        let aspect_node = self.select_aspect()?;
        let aspect = self.build_aspect(&aspect_node)?;

        for entity in self.declared_entities() {
            self.resolve_entity(&entity, &aspect.metadata.urn)?;
        }

        let namespace = match aspect.metadata.urn.find('#') {
            Some(index) => aspect.metadata.urn[..=index].to_string(),
            None => String::new(),
        };
        let (characteristics, diagnostics) = self.resolver.into_parts();

        tracing::debug!(
            "Model {} has {} properties, {} entities, {} characteristics",
            aspect.metadata.urn,
            self.properties.len(),
            self.entities.len(),
            characteristics.len()
        );

        Ok(Model {
            namespace,
            aspect,
            properties: self.properties,
            entities: self.entities,
            characteristics,
            diagnostics,
        })
    }

    fn select_aspect(&self) -> Result<Node> {
        let aspects: Vec<Node> = self
            .graph
            .subjects_of_type(&self.vocab.samm("Aspect"))
            .into_iter()
            .filter(|node| node.as_iri().is_some())
            .collect();

        match aspects.as_slice() {
            [] => Err(SammError::MissingAspect),
            [only] => Ok(only.clone()),
            [first, ..] => {
                tracing::warn!(
                    "Found {} aspects, generating for {}",
                    aspects.len(),
                    first
                );
                Ok(first.clone())
            }
        }
    }

    fn build_aspect(&mut self, node: &Node) -> Result<Aspect> {
        let id = node.to_string();
        let mut aspect = Aspect::new(id.clone());
        read_metadata(self.graph, &self.vocab, node, &mut aspect.metadata);

        let Some(head) = self.graph.object(node, &self.vocab.samm("properties")) else {
            return Err(SammError::EmptyAspect { aspect: id });
        };
        for property in self.property_list(&head, &id)? {
            aspect.add_property(property);
        }
        if aspect.properties().is_empty() {
            return Err(SammError::EmptyAspect { aspect: id });
        }

        self.check_payload_keys(&id, aspect.properties());
        aspect.operations = self.id_list(node, "operations")?;
        aspect.events = self.id_list(node, "events")?;
        Ok(aspect)
    }

    fn id_list(&self, node: &Node, predicate: &str) -> Result<Vec<String>> {
        match self.graph.object(node, &self.vocab.samm(predicate)) {
            Some(head) => Ok(self
                .graph
                .list_items(&head)?
                .iter()
                .map(Node::to_string)
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Resolve a `samm:properties` list into per-use property records
    fn property_list(&mut self, head: &Node, owner: &str) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        for cell in self.graph.list_items(head)? {
            let property = match &cell {
                Node::Iri(_) => self.resolve_property(&cell, owner)?,
                Node::Blank(_) => self.resolve_wrapper(&cell, owner)?,
                Node::Literal(_) => {
                    return Err(SammError::malformed_list(
                        head,
                        format!("property list of {owner} contains literal {cell}"),
                    ))
                }
            };
            properties.push(property);
        }
        Ok(properties)
    }

    /// A blank list cell: `[ samm:property :p ; samm:optional true ; ... ]`
    fn resolve_wrapper(&mut self, wrapper: &Node, owner: &str) -> Result<Property> {
        let target = self
            .graph
            .object(wrapper, &self.vocab.samm("property"))
            .ok_or_else(|| {
                SammError::unresolved(ReferenceKind::Property, "samm:property", owner)
            })?;
        let mut property = self.resolve_property(&target, owner)?;
        self.apply_overrides(wrapper, &mut property);
        Ok(property)
    }

    fn apply_overrides(&self, node: &Node, property: &mut Property) {
        if let Some(optional) = self.flag(node, "optional") {
            property.optional = optional;
        }
        if let Some(not_in_payload) = self.flag(node, "notInPayload") {
            property.not_in_payload = not_in_payload;
        }
        if let Some(Node::Literal(name)) = self.graph.object(node, &self.vocab.samm("payloadName")) {
            property.payload_name = Some(name.value);
        }
    }

    fn flag(&self, node: &Node, predicate: &str) -> Option<bool> {
        match self.graph.object(node, &self.vocab.samm(predicate))? {
            Node::Literal(literal) => Some(matches!(literal.value.trim(), "true" | "1")),
            _ => None,
        }
    }

    /// Resolve a named property once; later uses get a clone
    fn resolve_property(&mut self, node: &Node, referrer: &str) -> Result<Property> {
        let id = node.to_string();
        if let Some(property) = self.properties.get(&id) {
            return Ok(property.clone());
        }
        if !node.is_resource() || !self.graph.describes(node) {
            return Err(SammError::unresolved(ReferenceKind::Property, id, referrer));
        }

        let characteristic_node = self
            .graph
            .object(node, &self.vocab.samm("characteristic"))
            .ok_or_else(|| {
                SammError::unresolved(ReferenceKind::Characteristic, "samm:characteristic", &id)
            })?;
        let characteristic = self.resolver.resolve(&characteristic_node, &id)?;

        let example_value = match self.graph.object(node, &self.vocab.samm("exampleValue")) {
            Some(Node::Literal(literal)) => {
                Some(literal_to_json(&literal, characteristic.effective_data_type()))
            }
            Some(other) => {
                self.resolver
                    .diagnose(&id, format!("example value {other} is not a literal, ignored"));
                None
            }
            None => None,
        };

        let mut property = Property::new(id.clone(), characteristic);
        property.example_value = example_value;
        read_metadata(self.graph, &self.vocab, node, &mut property.metadata);
        self.apply_overrides(node, &mut property);

        tracing::debug!("Resolved property {}", id);
        self.properties.insert(id, property.clone());
        Ok(property)
    }

    /// Every node declared `samm:Entity` or `samm:AbstractEntity`, sorted
    fn declared_entities(&self) -> Vec<Node> {
        let mut entities = self.graph.subjects_of_type(&self.vocab.samm("Entity"));
        entities.extend(self.graph.subjects_of_type(&self.vocab.samm("AbstractEntity")));
        entities.sort();
        entities.dedup();
        entities
    }

    /// Resolve an entity and its ancestors, parents first
    fn resolve_entity(&mut self, node: &Node, referrer: &str) -> Result<()> {
        let id = node.to_string();
        if self.entities.contains_key(&id) {
            return Ok(());
        }
        if let Some(start) = self.entity_chain.iter().position(|entry| *entry == id) {
            let mut chain = self.entity_chain[start..].to_vec();
            chain.push(id.clone());
            return Err(SammError::CyclicInheritance { entity: id, chain });
        }
        if !self.resolver.is_entity(node) {
            return Err(SammError::unresolved(ReferenceKind::Entity, id, referrer));
        }

        self.entity_chain.push(id.clone());
        let resolved = self.build_entity(node, &id);
        self.entity_chain.pop();
        let entity = resolved?;

        tracing::debug!(
            "Resolved entity {} with {} effective properties",
            id,
            entity.effective_properties().len()
        );
        self.entities.insert(id, entity);
        Ok(())
    }

    fn build_entity(&mut self, node: &Node, id: &str) -> Result<Entity> {
        let mut entity = Entity::new(id);
        entity.is_abstract = self
            .graph
            .has_type(node, &self.vocab.samm("AbstractEntity"));
        read_metadata(self.graph, &self.vocab, node, &mut entity.metadata);

        let inherited = match self.graph.object(node, &self.vocab.samm("extends")) {
            Some(parent) => {
                self.resolve_entity(&parent, id)?;
                let parent_id = parent.to_string();
                let properties = self
                    .entities
                    .get(&parent_id)
                    .map(|parent| parent.effective_properties().to_vec())
                    .unwrap_or_default();
                entity.extends = Some(parent_id);
                properties
            }
            None => Vec::new(),
        };

        if let Some(head) = self.graph.object(node, &self.vocab.samm("properties")) {
            entity.properties = self.property_list(&head, id)?;
        }
        entity.flatten_onto(&inherited);
        self.check_payload_keys(id, entity.effective_properties());
        Ok(entity)
    }

    /// Diagnose properties of one owner that share a payload key
    ///
    /// Generators keep the first of them.
    fn check_payload_keys(&mut self, owner: &str, properties: &[Property]) {
        let mut keys: BTreeMap<String, &str> = BTreeMap::new();
        for property in properties.iter().filter(|property| property.in_payload()) {
            let key = property.payload_key();
            if let Some(first) = keys.get(&key) {
                let message = format!(
                    "payload key '{key}' of {} is already used by {first}, the property is left out",
                    property.metadata.urn
                );
                self.resolver.diagnose(owner, message);
            } else {
                keys.insert(key, &property.metadata.urn);
            }
        }
    }
}
