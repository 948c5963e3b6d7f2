//! SAMM vocabulary and namespace detection

use super::graph::StatementGraph;
use oxrdf::vocab::rdf;

/// SAMM meta model namespace base (version-agnostic)
pub const SAMM_NS_BASE: &str = "urn:samm:org.eclipse.esmf.samm:meta-model:";
/// SAMM characteristic namespace base (version-agnostic)
pub const SAMM_C_NS_BASE: &str = "urn:samm:org.eclipse.esmf.samm:characteristic:";
/// SAMM unit namespace base (version-agnostic)
pub const SAMM_UNIT_NS_BASE: &str = "urn:samm:org.eclipse.esmf.samm:unit:";

/// XML Schema datatype namespace
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
/// RDF namespace
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Supported SAMM versions, newest first
pub const SAMM_VERSIONS: &[&str] = &["2.3.0", "2.2.0", "2.1.0", "2.0.0"];

/// Version used when a graph does not reveal one
pub const DEFAULT_SAMM_VERSION: &str = "2.3.0";

/// The SAMM namespaces of one meta model version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    version: String,
    samm: String,
    samm_c: String,
    unit: String,
}

impl Vocabulary {
    /// Vocabulary for an explicit SAMM version
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            samm: format!("{SAMM_NS_BASE}{version}#"),
            samm_c: format!("{SAMM_C_NS_BASE}{version}#"),
            unit: format!("{SAMM_UNIT_NS_BASE}{version}#"),
        }
    }

    /// Detect the SAMM version from the `rdf:type` statements of a graph
    ///
    /// Falls back to [`DEFAULT_SAMM_VERSION`] when no SAMM type is present.
    pub fn detect(graph: &dyn StatementGraph) -> Self {
        let detected = graph
            .statements_with_predicate(rdf::TYPE.as_str())
            .iter()
            .filter_map(|statement| statement.object.as_iri())
            .find_map(|iri| {
                SAMM_VERSIONS
                    .iter()
                    .find(|version| iri.starts_with(&format!("{SAMM_NS_BASE}{version}#")))
            })
            .copied();

        let version = detected.unwrap_or(DEFAULT_SAMM_VERSION);
        tracing::debug!("Detected SAMM version: {}", version);
        Self::new(version)
    }

    /// Meta model version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// IRI in the `samm:` namespace
    pub fn samm(&self, local: &str) -> String {
        format!("{}{local}", self.samm)
    }

    /// IRI in the `samm-c:` namespace
    pub fn samm_c(&self, local: &str) -> String {
        format!("{}{local}", self.samm_c)
    }

    /// Local name of an IRI in the `samm:` namespace
    pub fn samm_local<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.samm.as_str())
    }

    /// Local name of an IRI in the `samm-c:` namespace
    pub fn samm_c_local<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.samm_c.as_str())
    }

    /// Compact a unit IRI into a `unit:` CURIE; other IRIs are returned unchanged
    pub fn compact_unit(&self, iri: &str) -> String {
        match iri.strip_prefix(self.unit.as_str()) {
            Some(local) => format!("unit:{local}"),
            None => iri.to_string(),
        }
    }

    /// Whether a datatype IRI denotes a scalar (non-entity) value type
    pub fn is_scalar_datatype(&self, iri: &str) -> bool {
        iri.starts_with(XSD_NS) || iri.starts_with(RDF_NS) || iri.starts_with(self.samm.as_str())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SAMM_VERSION)
    }
}
