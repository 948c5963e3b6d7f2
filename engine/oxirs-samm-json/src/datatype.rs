//! Datatype table
//!
//! Maps the SAMM value-type vocabulary (XSD datatypes, `rdf:langString`,
//! `samm:curie`) to a JSON kind, the extra JSON Schema keywords of that type,
//! and the default example value. The schema and payload generators both read
//! this table, which keeps their output in agreement.

use crate::metamodel::local_name;
use crate::parser::Literal;
use serde_json::{json, Map, Number, Value};

/// `samm:curie` datatype (looked up by local name, so the version is irrelevant)
pub const CURIE: &str = "urn:samm:org.eclipse.esmf.samm:meta-model:2.3.0#curie";

/// JSON primitive kind of a datatype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Boolean,
    Integer,
    Number,
    String,
    /// Object keyed by language tag with string values
    LangString,
}

impl JsonKind {
    /// JSON Schema `type` keyword value
    pub fn schema_type(&self) -> &'static str {
        match self {
            JsonKind::Boolean => "boolean",
            JsonKind::Integer => "integer",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::LangString => "object",
        }
    }
}

/// Default example value of a datatype
#[derive(Debug, Clone, Copy, PartialEq)]
enum Example {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    LangMap,
}

/// One row of the datatype table
#[derive(Debug, Clone, PartialEq)]
pub struct DatatypeInfo {
    /// Local name of the datatype IRI
    pub name: &'static str,
    pub kind: JsonKind,
    /// JSON Schema `format`
    pub format: Option<&'static str>,
    /// JSON Schema `contentEncoding`
    pub content_encoding: Option<&'static str>,
    /// Inclusive lower bound for integer kinds
    pub minimum: Option<i64>,
    /// Inclusive upper bound for integer kinds
    pub maximum: Option<i64>,
    example: Example,
}

const fn row(name: &'static str, kind: JsonKind, example: Example) -> DatatypeInfo {
    DatatypeInfo {
        name,
        kind,
        format: None,
        content_encoding: None,
        minimum: None,
        maximum: None,
        example,
    }
}

const fn formatted(name: &'static str, format: &'static str, example: &'static str) -> DatatypeInfo {
    DatatypeInfo {
        format: Some(format),
        ..row(name, JsonKind::String, Example::Str(example))
    }
}

const fn bounded(name: &'static str, minimum: Option<i64>, maximum: Option<i64>) -> DatatypeInfo {
    let example = match (minimum, maximum) {
        (Some(min), _) => min,
        (None, Some(max)) => max,
        (None, None) => 0,
    };
    DatatypeInfo {
        minimum,
        maximum,
        ..row(name, JsonKind::Integer, Example::Int(example))
    }
}

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

static STRING: DatatypeInfo = row("string", JsonKind::String, Example::Str(""));

static DATATYPES: &[DatatypeInfo] = &[
    row("boolean", JsonKind::Boolean, Example::Bool(false)),
    // string family
    row("string", JsonKind::String, Example::Str("")),
    row("normalizedString", JsonKind::String, Example::Str("")),
    row("token", JsonKind::String, Example::Str("")),
    row("hexBinary", JsonKind::String, Example::Str("")),
    DatatypeInfo {
        content_encoding: Some("base64"),
        ..row("base64Binary", JsonKind::String, Example::Str(""))
    },
    formatted("anyURI", "uri", "https://example.com"),
    row("curie", JsonKind::String, Example::Str("unit:one")),
    row("langString", JsonKind::LangString, Example::LangMap),
    // integer family
    bounded("integer", None, None),
    bounded("int", None, None),
    bounded("long", None, None),
    bounded("short", None, None),
    bounded("byte", None, None),
    bounded("nonNegativeInteger", Some(0), None),
    bounded("positiveInteger", Some(1), None),
    bounded("nonPositiveInteger", None, Some(0)),
    bounded("negativeInteger", None, Some(-1)),
    bounded("unsignedLong", Some(0), None),
    bounded("unsignedInt", Some(0), None),
    bounded("unsignedShort", Some(0), None),
    bounded("unsignedByte", Some(0), None),
    // floating family
    row("decimal", JsonKind::Number, Example::Float(0.0)),
    row("float", JsonKind::Number, Example::Float(0.0)),
    row("double", JsonKind::Number, Example::Float(0.0)),
    // temporal family
    formatted("date", "date", "1970-01-01"),
    formatted("time", "time", "00:00:00"),
    formatted("dateTime", "date-time", "1970-01-01T00:00:00Z"),
    formatted("dateTimeStamp", "date-time", "1970-01-01T00:00:00Z"),
    row("gYear", JsonKind::String, Example::Str("1970")),
    row("gMonth", JsonKind::String, Example::Str("--01")),
    row("gDay", JsonKind::String, Example::Str("---01")),
    row("gYearMonth", JsonKind::String, Example::Str("1970-01")),
    row("gMonthDay", JsonKind::String, Example::Str("--01-01")),
    row("duration", JsonKind::String, Example::Str("PT0S")),
    row("dayTimeDuration", JsonKind::String, Example::Str("PT0S")),
    row("yearMonthDuration", JsonKind::String, Example::Str("P0M")),
];

/// Look up a datatype IRI (or prefixed name) by its local name
///
/// Unknown datatypes map to `string`.
pub fn lookup(datatype: &str) -> &'static DatatypeInfo {
    let name = local_name(datatype);
    DATATYPES
        .iter()
        .find(|info| info.name == name)
        .unwrap_or(&STRING)
}

impl DatatypeInfo {
    /// JSON Schema fragment for this datatype
    pub fn schema(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(self.kind.schema_type()));
        if self.kind == JsonKind::LangString {
            schema.insert("additionalProperties".to_string(), json!({"type": "string"}));
        }
        if let Some(format) = self.format {
            schema.insert("format".to_string(), json!(format));
        }
        if let Some(encoding) = self.content_encoding {
            schema.insert("contentEncoding".to_string(), json!(encoding));
        }
        if let Some(minimum) = self.minimum {
            schema.insert("minimum".to_string(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            schema.insert("maximum".to_string(), json!(maximum));
        }
        schema
    }

    /// Default example value; `language` keys multilingual text
    pub fn default_value(&self, language: &str) -> Value {
        match self.example {
            Example::Bool(value) => Value::Bool(value),
            Example::Int(value) => Value::from(value),
            Example::Float(value) => float_value(value),
            Example::Str(value) => Value::String(value.to_string()),
            Example::LangMap => json!({ language: "" }),
        }
    }

    /// The `n`-th of a sequence of distinct example values, `n = 0` being
    /// [`DatatypeInfo::default_value`]
    ///
    /// Returns `None` once the datatype has no further distinct value.
    pub fn nth_value(&self, n: usize, language: &str) -> Option<Value> {
        if n == 0 {
            return Some(self.default_value(language));
        }
        match self.example {
            Example::Bool(value) => (n == 1).then_some(Value::Bool(!value)),
            Example::Int(start) => {
                let step = i64::try_from(n).ok()?;
                let value = if self.minimum.is_none() && self.maximum.is_some() {
                    start.checked_sub(step)?
                } else {
                    start.checked_add(step)?
                };
                Some(Value::from(value))
            }
            Example::Float(start) => Some(float_value(start + n as f64)),
            Example::LangMap => Some(json!({ language: n.to_string() })),
            Example::Str(_) => self.nth_text(n).map(Value::String),
        }
    }

    fn nth_text(&self, n: usize) -> Option<String> {
        let year = Some(1970 + n).filter(|year| *year <= 9999);
        match self.name {
            "anyURI" => Some(format!("https://example.com/{n}")),
            "curie" => Some(format!("unit:item{n}")),
            "hexBinary" => {
                let hex = format!("{n:x}");
                Some(if hex.len() % 2 == 1 { format!("0{hex}") } else { hex })
            }
            "base64Binary" => {
                // Three bytes encode to four characters without padding
                let bits = u32::try_from(n).ok().filter(|bits| *bits < 1 << 24)?;
                Some(
                    (0..4)
                        .rev()
                        .map(|i| BASE64_ALPHABET[((bits >> (6 * i)) & 0x3f) as usize] as char)
                        .collect(),
                )
            }
            "date" => year.map(|year| format!("{year:04}-01-01")),
            "time" => (n < 86_400)
                .then(|| format!("{:02}:{:02}:{:02}", n / 3600, n / 60 % 60, n % 60)),
            "dateTime" | "dateTimeStamp" => year.map(|year| format!("{year:04}-01-01T00:00:00Z")),
            "gYear" => year.map(|year| format!("{year:04}")),
            "gYearMonth" => year.map(|year| format!("{year:04}-01")),
            "gMonth" => (n < 12).then(|| format!("--{:02}", n + 1)),
            "gDay" => (n < 31).then(|| format!("---{:02}", n + 1)),
            "gMonthDay" => (n < 12).then(|| format!("--{:02}-01", n + 1)),
            "duration" | "dayTimeDuration" => Some(format!("PT{n}S")),
            "yearMonthDuration" => Some(format!("P{n}M")),
            _ => Some(n.to_string()),
        }
    }

    /// Convert a lexical form of this datatype to JSON
    ///
    /// Values that do not parse as the datatype are kept as strings.
    pub fn parse_lexical(&self, lexical: &str) -> Value {
        let trimmed = lexical.trim();
        let parsed = match self.kind {
            JsonKind::Boolean => match trimmed {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            JsonKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<u64>().map(Value::from))
                .ok(),
            JsonKind::Number => trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            JsonKind::String | JsonKind::LangString => None,
        };

        parsed.unwrap_or_else(|| {
            if matches!(self.kind, JsonKind::Boolean | JsonKind::Integer | JsonKind::Number) {
                tracing::warn!("Value '{}' is not a valid {}", lexical, self.name);
            }
            Value::String(lexical.to_string())
        })
    }
}

/// JSON number for a float, `0.0` for non-finite input
pub fn float_value(value: f64) -> Value {
    Number::from_f64(value)
        .or_else(|| Number::from_f64(0.0))
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Convert a literal to JSON
///
/// The literal's own datatype decides, except that untyped strings take
/// `hint` (the datatype of the characteristic they belong to).
/// Language-tagged strings become `{tag: text}`.
pub fn literal_to_json(literal: &Literal, hint: Option<&str>) -> Value {
    if let Some(language) = &literal.language {
        return json!({ language.as_str(): literal.value });
    }

    let own = lookup(&literal.datatype);
    let info = match hint {
        Some(hint) if own.name == "string" => lookup(hint),
        _ => own,
    };
    match info.kind {
        JsonKind::LangString => json!({ "en": literal.value }),
        _ => info.parse_lexical(&literal.value),
    }
}
