//! Error types for SAMM model resolution and JSON generation
//!
//! Every fatal condition is detected while the model is being built. Once a
//! [`Model`](crate::metamodel::Model) exists, both generators run without
//! further error handling; only serializing their output to a string can fail.

use std::fmt;
use thiserror::Error;

/// Kind of model element a reference points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A `samm:Property`
    Property,
    /// A characteristic (named or anonymous)
    Characteristic,
    /// A `samm:Entity` or `samm:AbstractEntity`
    Entity,
    /// A constraint attached to a trait
    Constraint,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Property => "property",
            ReferenceKind::Characteristic => "characteristic",
            ReferenceKind::Entity => "entity",
            ReferenceKind::Constraint => "constraint",
        };
        f.write_str(name)
    }
}

/// Location in a Turtle source where parsing failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-based line number, when the parser reported one
    pub line: Option<usize>,
    /// 1-based column number, when the parser reported one
    pub column: Option<usize>,
    /// File path or description of the input
    pub source: Option<String>,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{source}")?;
        } else {
            f.write_str("<input>")?;
        }
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// SAMM processing error
#[derive(Error, Debug)]
pub enum SammError {
    /// The input graph contains no `samm:Aspect`
    #[error("No Aspect found in the model")]
    MissingAspect,

    /// The Aspect declares no properties
    #[error("Aspect {aspect} has no properties")]
    EmptyAspect {
        /// Aspect URN
        aspect: String,
    },

    /// An element is referenced but not defined in the graph
    #[error("Unresolved {kind} reference '{id}' (referenced from {referrer})")]
    UnresolvedReference {
        /// What kind of element was expected
        kind: ReferenceKind,
        /// The missing identifier
        id: String,
        /// The element holding the reference
        referrer: String,
    },

    /// A structural RDF list is broken
    #[error("Malformed list starting at {head}: {reason}")]
    MalformedList {
        /// Head node of the list
        head: String,
        /// What is wrong with it
        reason: String,
    },

    /// An entity `extends` chain loops back on itself
    #[error("Cyclic inheritance for entity {entity}: {}", chain.join(" -> "))]
    CyclicInheritance {
        /// Entity where the cycle was detected
        entity: String,
        /// Entities on the chain, starting from the first one visited
        chain: Vec<String>,
    },

    /// A characteristic refers to itself through its own definition
    #[error("Characteristic {characteristic} is defined in terms of itself")]
    CyclicCharacteristic {
        /// Characteristic identifier
        characteristic: String,
    },

    /// An Either characteristic without `left` or `right`
    #[error("Either characteristic {characteristic} is missing its '{missing}' branch")]
    IncompleteEither {
        /// Characteristic identifier
        characteristic: String,
        /// `left` or `right`
        missing: &'static str,
    },

    /// A collection characteristic without element type
    #[error("Collection characteristic {characteristic} has no element characteristic or data type")]
    MissingCollectionElementType {
        /// Characteristic identifier
        characteristic: String,
    },

    /// Turtle syntax error with source location
    #[error("Parse error at {location}: {message}")]
    ParseErrorWithLocation {
        /// Parser message
        message: String,
        /// Where it happened
        location: SourceLocation,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SammError {
    pub(crate) fn unresolved(
        kind: ReferenceKind,
        id: impl Into<String>,
        referrer: impl Into<String>,
    ) -> Self {
        SammError::UnresolvedReference {
            kind,
            id: id.into(),
            referrer: referrer.into(),
        }
    }

    pub(crate) fn malformed_list(head: impl fmt::Display, reason: impl Into<String>) -> Self {
        SammError::MalformedList {
            head: head.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for SAMM operations
pub type Result<T> = std::result::Result<T, SammError>;
