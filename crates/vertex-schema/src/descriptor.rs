//! Parameter descriptors produced by schema extraction.

use crate::error::BindError;
use serde::Serialize;
use std::fmt;

/// The kind of value a parameter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A string.
    String,
    /// A signed integer of any width.
    Int,
    /// A floating point number.
    Float,
    /// A boolean.
    Bool,
    /// A list of strings.
    StringList,
    /// A value decoded from its raw string by the handler itself.
    Custom,
}

impl Kind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::StringList => "list",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// The query string.
    #[default]
    Query,
    /// A form-encoded request body.
    Body,
    /// A path segment.
    Path,
    /// A request header.
    Header,
}

impl Location {
    /// Parses a location name, as used in field tags.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Some(Self::Query),
            "body" | "formdata" => Some(Self::Body),
            "path" => Some(Self::Path),
            "header" => Some(Self::Header),
            _ => None,
        }
    }

    /// Returns the lowercase name of the location.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Body => "body",
            Self::Path => "path",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed parameter value, as bound into a handler or used as a default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A string, or the raw input of a custom-decoded field.
    String(String),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A list of strings.
    List(Vec<String>),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::String(_) => Kind::String,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Bool(_) => Kind::Bool,
            Self::List(_) => Kind::StringList,
        }
    }

    fn wrong(&self, expected: Kind) -> BindError {
        BindError::WrongType {
            expected,
            actual: self.kind(),
        }
    }

    /// Converts into a string.
    pub fn into_string(self) -> Result<String, BindError> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(other.wrong(Kind::String)),
        }
    }

    /// Converts into an integer.
    pub fn into_int(self) -> Result<i64, BindError> {
        match self {
            Self::Int(i) => Ok(i),
            other => Err(other.wrong(Kind::Int)),
        }
    }

    /// Converts into a float. Integers are widened.
    #[allow(clippy::cast_precision_loss)]
    pub fn into_float(self) -> Result<f64, BindError> {
        match self {
            Self::Float(f) => Ok(f),
            Self::Int(i) => Ok(i as f64),
            other => Err(other.wrong(Kind::Float)),
        }
    }

    /// Converts into a boolean.
    pub fn into_bool(self) -> Result<bool, BindError> {
        match self {
            Self::Bool(b) => Ok(b),
            other => Err(other.wrong(Kind::Bool)),
        }
    }

    /// Converts into a list of strings.
    pub fn into_list(self) -> Result<Vec<String>, BindError> {
        match self {
            Self::List(l) => Ok(l),
            other => Err(other.wrong(Kind::StringList)),
        }
    }

    /// Decodes a custom type from the raw string.
    pub fn decode<T: crate::value::Unmarshaler>(self) -> Result<T, BindError> {
        let raw = self.into_string()?;
        T::unmarshal_request_data(&raw)
    }
}

/// A parameter as seen by binding, validation and documentation.
///
/// Descriptors are created once per handler type at registration and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    pub(crate) name: String,
    pub(crate) struct_key: String,
    pub(crate) kind: Kind,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) raw_default: String,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) min_length: usize,
    pub(crate) max_length: usize,
    pub(crate) pattern: Option<String>,
    pub(crate) location: Location,
    pub(crate) description: String,
    pub(crate) format: String,
    pub(crate) options: Vec<String>,
}

impl ParamDescriptor {
    /// Creates a descriptor with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        let name = name.into();
        Self {
            struct_key: name.clone(),
            name,
            kind,
            required: false,
            default: None,
            raw_default: String::new(),
            min: None,
            max: None,
            min_length: 0,
            max_length: 0,
            pattern: None,
            location: Location::Query,
            description: String::new(),
            format: String::new(),
            options: Vec::new(),
        }
    }

    /// Wire name of the parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the handler field this parameter binds to.
    #[must_use]
    pub fn struct_key(&self) -> &str {
        &self.struct_key
    }

    /// Value kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Whether the parameter must be present.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }

    /// Parsed default value. Always `None` for required parameters.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        if self.required {
            None
        } else {
            self.default.as_ref()
        }
    }

    /// Returns `true` if a usable default exists.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_value().is_some()
    }

    /// The default exactly as declared.
    #[must_use]
    pub fn raw_default(&self) -> &str {
        &self.raw_default
    }

    /// Numeric lower bound.
    #[must_use]
    pub const fn min(&self) -> Option<f64> {
        self.min
    }

    /// Numeric upper bound.
    #[must_use]
    pub const fn max(&self) -> Option<f64> {
        self.max
    }

    /// Minimum string length, 0 when unset.
    #[must_use]
    pub const fn min_length(&self) -> usize {
        self.min_length
    }

    /// Maximum string length, 0 when unset.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Regular expression a string must match.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Where the parameter is read from.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Human readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Documentation format hint.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Allowed values, for documentation.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_hides_default() {
        let mut param = ParamDescriptor::new("limit", Kind::Int);
        param.default = Some(Value::Int(10));
        assert!(param.has_default());
        assert_eq!(param.default_value(), Some(&Value::Int(10)));

        param.required = true;
        assert!(!param.has_default());
        assert_eq!(param.default_value(), None);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Int(3).into_float().unwrap(), 3.0);
        assert_eq!(
            Value::List(vec!["a".to_string()]).into_list().unwrap(),
            vec!["a"]
        );
        let err = Value::Bool(true).into_string().unwrap_err();
        assert_eq!(
            err,
            BindError::WrongType {
                expected: Kind::String,
                actual: Kind::Bool
            }
        );
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(Location::parse("PATH"), Some(Location::Path));
        assert_eq!(Location::parse("formData"), Some(Location::Body));
        assert_eq!(Location::parse("cookie"), None);
        assert_eq!(Location::default(), Location::Query);
    }
}
