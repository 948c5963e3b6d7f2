//! Statement graph abstraction
//!
//! The model builder does not care where statements come from. It needs three
//! queries: statements about a subject, statements with a predicate, and the
//! elements of an RDF list in order. [`StatementGraph`] captures exactly that,
//! and is implemented for [`oxrdf::Graph`].

use crate::error::{Result, SammError};
use oxrdf::vocab::rdf;
use oxrdf::{BlankNodeRef, Graph, NamedNodeRef, NamedOrBlankNodeRef, TermRef, TripleRef};
use std::collections::HashSet;
use std::fmt;

/// An RDF literal, owned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// Lexical form
    pub value: String,
    /// Datatype IRI (`rdf:langString` for language-tagged literals)
    pub datatype: String,
    /// Language tag, if any
    pub language: Option<String>,
}

impl Literal {
    /// A plain `xsd:string` literal
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: oxrdf::vocab::xsd::STRING.as_str().to_string(),
            language: None,
        }
    }

    /// A literal with an explicit datatype
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }
}

/// A node of the statement graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    /// Named node
    Iri(String),
    /// Blank (anonymous) node, identified by its label
    Blank(String),
    /// Literal value
    Literal(Literal),
}

impl Node {
    /// Create a named node
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    /// The IRI of a named node
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The literal of a literal node
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Whether this node can be the subject of a statement
    pub fn is_resource(&self) -> bool {
        !matches!(self, Node::Literal(_))
    }

    /// Whether this is a named node with the given IRI
    pub fn is_iri(&self, iri: &str) -> bool {
        matches!(self, Node::Iri(own) if own == iri)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => f.write_str(iri),
            Node::Blank(id) => write!(f, "_:{id}"),
            Node::Literal(literal) => match &literal.language {
                Some(language) => write!(f, "\"{}\"@{language}", literal.value),
                None => write!(f, "\"{}\"^^<{}>", literal.value, literal.datatype),
            },
        }
    }
}

impl From<TermRef<'_>> for Node {
    fn from(term: TermRef<'_>) -> Self {
        match term {
            TermRef::NamedNode(node) => Node::Iri(node.as_str().to_string()),
            TermRef::BlankNode(node) => Node::Blank(node.as_str().to_string()),
            TermRef::Literal(literal) => Node::Literal(Literal {
                value: literal.value().to_string(),
                datatype: literal.datatype().as_str().to_string(),
                language: literal.language().map(str::to_string),
            }),
            #[allow(unreachable_patterns)]
            other => Node::Blank(other.to_string()),
        }
    }
}

impl From<NamedOrBlankNodeRef<'_>> for Node {
    fn from(subject: NamedOrBlankNodeRef<'_>) -> Self {
        match subject {
            NamedOrBlankNodeRef::NamedNode(node) => Node::Iri(node.as_str().to_string()),
            NamedOrBlankNodeRef::BlankNode(node) => Node::Blank(node.as_str().to_string()),
        }
    }
}

/// One subject/predicate/object statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Statement {
    /// Subject node (never a literal)
    pub subject: Node,
    /// Predicate IRI
    pub predicate: String,
    /// Object node
    pub object: Node,
}

impl From<TripleRef<'_>> for Statement {
    fn from(triple: TripleRef<'_>) -> Self {
        Statement {
            subject: triple.subject.into(),
            predicate: triple.predicate.as_str().to_string(),
            object: triple.object.into(),
        }
    }
}

/// Queryable set of statements consumed by the model builder
pub trait StatementGraph {
    /// All statements whose subject is `subject`
    fn statements_about(&self, subject: &Node) -> Vec<Statement>;

    /// All statements using `predicate`
    fn statements_with_predicate(&self, predicate: &str) -> Vec<Statement>;

    /// Objects of `subject predicate ?o`, sorted
    fn objects(&self, subject: &Node, predicate: &str) -> Vec<Node> {
        let mut objects: Vec<Node> = self
            .statements_about(subject)
            .into_iter()
            .filter(|statement| statement.predicate == predicate)
            .map(|statement| statement.object)
            .collect();
        objects.sort();
        objects
    }

    /// First object of `subject predicate ?o` in sorted order
    fn object(&self, subject: &Node, predicate: &str) -> Option<Node> {
        self.objects(subject, predicate).into_iter().next()
    }

    /// Whether any statement has `subject` as subject
    fn describes(&self, subject: &Node) -> bool {
        !self.statements_about(subject).is_empty()
    }

    /// Whether `subject rdf:type rdf_type` is present
    fn has_type(&self, subject: &Node, rdf_type: &str) -> bool {
        self.objects(subject, rdf::TYPE.as_str())
            .iter()
            .any(|object| object.is_iri(rdf_type))
    }

    /// Subjects declared with `rdf:type rdf_type`, sorted and deduplicated
    fn subjects_of_type(&self, rdf_type: &str) -> Vec<Node> {
        let mut subjects: Vec<Node> = self
            .statements_with_predicate(rdf::TYPE.as_str())
            .into_iter()
            .filter(|statement| statement.object.is_iri(rdf_type))
            .map(|statement| statement.subject)
            .collect();
        subjects.sort();
        subjects.dedup();
        subjects
    }

    /// Resolve an RDF list (`rdf:first`/`rdf:rest` chain) into its elements
    ///
    /// Every cell must carry exactly one `rdf:first` and one `rdf:rest`, and
    /// the chain must end in `rdf:nil` without revisiting a cell.
    fn list_items(&self, head: &Node) -> Result<Vec<Node>> {
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head.clone();

        loop {
            if current.is_iri(rdf::NIL.as_str()) {
                return Ok(items);
            }
            if !current.is_resource() {
                return Err(SammError::malformed_list(
                    head,
                    format!("list cell {current} is a literal"),
                ));
            }
            if !visited.insert(current.clone()) {
                return Err(SammError::malformed_list(
                    head,
                    format!("list does not terminate, cell {current} is revisited"),
                ));
            }

            let firsts = self.objects(&current, rdf::FIRST.as_str());
            let rests = self.objects(&current, rdf::REST.as_str());
            match (firsts.as_slice(), rests.as_slice()) {
                ([first], [rest]) => {
                    items.push(first.clone());
                    current = rest.clone();
                }
                ([], _) | (_, []) => {
                    return Err(SammError::malformed_list(
                        head,
                        format!("list cell {current} lacks rdf:first or rdf:rest"),
                    ));
                }
                _ => {
                    return Err(SammError::malformed_list(
                        head,
                        format!("list branches at cell {current}"),
                    ));
                }
            }
        }
    }
}

/// Borrowed oxrdf subject of a resource node
///
/// The node's text is used as is; a node with no matching triple simply
/// yields nothing.
fn subject_ref(node: &Node) -> Option<NamedOrBlankNodeRef<'_>> {
    match node {
        Node::Iri(iri) => Some(NamedNodeRef::new_unchecked(iri).into()),
        Node::Blank(id) => Some(BlankNodeRef::new_unchecked(id).into()),
        Node::Literal(_) => None,
    }
}

impl StatementGraph for Graph {
    fn statements_about(&self, subject: &Node) -> Vec<Statement> {
        let Some(subject) = subject_ref(subject) else {
            return Vec::new();
        };
        self.triples_for_subject(subject).map(Statement::from).collect()
    }

    fn statements_with_predicate(&self, predicate: &str) -> Vec<Statement> {
        self.triples_for_predicate(NamedNodeRef::new_unchecked(predicate))
            .map(Statement::from)
            .collect()
    }
}
