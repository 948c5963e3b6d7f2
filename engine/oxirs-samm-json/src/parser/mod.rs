//! SAMM model parsing and resolution
//!
//! Statements come in through [`StatementGraph`]; [`ModelBuilder`] turns them
//! into a [`Model`](crate::metamodel::Model), delegating every characteristic
//! to the [`CharacteristicResolver`].

mod builder;
mod graph;
mod resolver;
mod ttl_parser;
mod vocab;

pub use builder::ModelBuilder;
pub use graph::{Literal, Node, Statement, StatementGraph};
pub use resolver::CharacteristicResolver;
pub use ttl_parser::{load_turtle_file, load_turtle_str};
pub use vocab::{Vocabulary, DEFAULT_SAMM_VERSION, SAMM_VERSIONS};

use crate::metamodel::ElementMetadata;

/// Read `samm:preferredName`, `samm:description` and `samm:see` of a node
///
/// Untagged texts are filed under `en`.
pub(crate) fn read_metadata(
    graph: &dyn StatementGraph,
    vocab: &Vocabulary,
    node: &Node,
    metadata: &mut ElementMetadata,
) {
    for name in graph.objects(node, &vocab.samm("preferredName")) {
        if let Node::Literal(literal) = name {
            let language = literal.language.as_deref().unwrap_or("en");
            metadata.add_preferred_name(language, literal.value);
        }
    }

    for description in graph.objects(node, &vocab.samm("description")) {
        if let Node::Literal(literal) = description {
            let language = literal.language.as_deref().unwrap_or("en");
            metadata.add_description(language, literal.value);
        }
    }

    for see in graph.objects(node, &vocab.samm("see")) {
        if let Node::Iri(iri) = see {
            metadata.add_see_ref(iri);
        }
    }
}
