//! Turtle loading for SAMM models
//!
//! Reads Turtle text into an [`oxrdf::Graph`], which implements
//! [`StatementGraph`](super::StatementGraph) and can be handed straight to the
//! model builder.

use crate::error::{Result, SammError, SourceLocation};
use oxrdf::Graph;
use oxttl::TurtleParser;
use std::path::Path;

/// Parse Turtle text into a graph
///
/// `base_iri` resolves relative IRIs; SAMM models normally use absolute URNs
/// only, so `None` is fine for most inputs.
pub fn load_turtle_str(content: &str, base_iri: Option<&str>) -> Result<Graph> {
    parse_into_graph(content, base_iri, None)
}

/// Read and parse a Turtle file
pub fn load_turtle_file(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    tracing::info!("Parsing SAMM model from file: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    parse_into_graph(&content, None, Some(path.display().to_string()))
}

fn parse_into_graph(content: &str, base_iri: Option<&str>, source: Option<String>) -> Result<Graph> {
    let mut parser = TurtleParser::new();
    if let Some(base) = base_iri {
        parser = parser.with_base_iri(base).map_err(|e| {
            parse_error(&format!("Invalid base IRI '{base}': {e}"), source.clone())
        })?;
    }

    let mut graph = Graph::new();
    for result in parser.for_reader(content.as_bytes()) {
        let triple = result.map_err(|e| parse_error(&e.to_string(), source.clone()))?;
        graph.insert(&triple);
    }

    tracing::debug!("Parsed {} triples", graph.len());
    Ok(graph)
}

fn parse_error(message: &str, source: Option<String>) -> SammError {
    let (line, column) = extract_line_col(message);
    SammError::ParseErrorWithLocation {
        message: message.to_string(),
        location: SourceLocation {
            line,
            column,
            source,
        },
    }
}

/// Pick "line N" and "column N" out of a parser message
fn extract_line_col(message: &str) -> (Option<usize>, Option<usize>) {
    let words: Vec<&str> = message
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .collect();

    let number_after = |keyword: &str| {
        words.windows(2).find_map(|pair| {
            if pair[0].eq_ignore_ascii_case(keyword) {
                pair[1]
                    .trim_matches(|c: char| !c.is_ascii_digit())
                    .parse()
                    .ok()
            } else {
                None
            }
        })
    };

    (number_after("line"), number_after("column"))
}
