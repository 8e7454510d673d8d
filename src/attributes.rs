//! Typed span attributes and the formatting rules that turn heterogeneous
//! key/value inputs into the OTLP attribute list form.

use serde::Serialize;

/// A single key/value attribute attached to a span or resource.
///
/// Keys are unique within a span; insertion order is preserved through
/// serialization so exported output is reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute key, e.g. `db.statement`.
    pub key: String,
    /// Typed attribute value.
    pub value: AttributeValue,
}

/// The closed set of value types this exporter emits.
///
/// OTLP defines more variants (doubles, bools, arrays); everything this
/// layer records is either a string or an integer, so the sum type stays
/// closed and serialization stays total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AttributeValue {
    /// A UTF-8 string value, serialized as `stringValue`.
    #[serde(rename = "stringValue")]
    String(String),
    /// A 64-bit integer value, serialized as `intValue`.
    #[serde(rename = "intValue")]
    Int(i64),
}

impl Attribute {
    /// A string-typed attribute.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            key: key.into(),
            value: AttributeValue::String(value.into()),
        }
    }

    /// An integer-typed attribute.
    ///
    /// Integer attributes are reserved for values that are semantically
    /// numeric on the wire: row counts, ports, sizes and status codes.
    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Attribute {
            key: key.into(),
            value: AttributeValue::Int(value),
        }
    }
}

/// Scalar input domain accepted by [`format_attributes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scalar {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A boolean value.
    Bool(bool),
    /// An absent value.
    Null,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Normalize a sequence of key/scalar pairs into string-typed attributes,
/// preserving input order.
///
/// `Null` becomes the literal string `"NULL"`; integers and booleans are
/// stringified. Callers that want an integer-typed OTLP field use
/// [`Attribute::int`] directly instead. Formatting is total over the input
/// domain, there are no error cases.
pub fn format_attributes<K, I>(pairs: I) -> Vec<Attribute>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Scalar)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| {
            let rendered = match value {
                Scalar::String(s) => s,
                Scalar::Int(i) => i.to_string(),
                Scalar::Bool(b) => b.to_string(),
                Scalar::Null => "NULL".to_owned(),
            };
            Attribute::string(key, rendered)
        })
        .collect()
}
