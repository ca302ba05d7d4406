//! Field access traits implemented by handlers.

use crate::descriptor::{Kind, Value};
use crate::error::BindError;

/// A borrowed view of a handler field, used by validators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    /// A string field.
    Str(&'a str),
    /// An integer field.
    Int(i64),
    /// A float field.
    Float(f64),
    /// A boolean field.
    Bool(bool),
    /// A list field.
    List(&'a [String]),
    /// A field validators cannot inspect, such as a decoded custom type.
    Opaque,
}

impl FieldRef<'_> {
    /// Returns the kind of the referenced value, `None` for opaque fields.
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        match self {
            Self::Str(_) => Some(Kind::String),
            Self::Int(_) => Some(Kind::Int),
            Self::Float(_) => Some(Kind::Float),
            Self::Bool(_) => Some(Kind::Bool),
            Self::List(_) => Some(Kind::StringList),
            Self::Opaque => None,
        }
    }
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::Str(s)
    }
}

impl<'a> From<&'a String> for FieldRef<'a> {
    fn from(s: &'a String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for FieldRef<'_> {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for FieldRef<'_> {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for FieldRef<'_> {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FieldRef<'_> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<'a> From<&'a Vec<String>> for FieldRef<'a> {
    fn from(l: &'a Vec<String>) -> Self {
        Self::List(l)
    }
}

impl<'a> From<&'a [String]> for FieldRef<'a> {
    fn from(l: &'a [String]) -> Self {
        Self::List(l)
    }
}

/// Read and write access to a handler's declared fields, keyed by struct key.
///
/// `field` returns `None` for fields that are unset, typically an `Option`
/// that holds `None`. Defaults are only applied to unset or empty fields.
///
/// # Example
///
/// ```
/// use vertex_schema::{BindError, Bindable, FieldRef, Value};
///
/// #[derive(Default)]
/// struct Search {
///     query: String,
///     limit: Option<i64>,
/// }
///
/// impl Bindable for Search {
///     fn field(&self, key: &str) -> Option<FieldRef<'_>> {
///         match key {
///             "Query" => Some(FieldRef::from(&self.query)),
///             "Limit" => self.limit.map(FieldRef::from),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
///         match key {
///             "Query" => self.query = value.into_string()?,
///             "Limit" => self.limit = Some(value.into_int()?),
///             _ => return Err(BindError::UnknownField(key.to_string())),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Bindable {
    /// Returns the current value of a field.
    fn field(&self, key: &str) -> Option<FieldRef<'_>>;

    /// Writes a value into a field.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the key is unknown or the value has the
    /// wrong kind.
    fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError>;
}

/// A type that decodes itself from a raw request string.
pub trait Unmarshaler: Sized {
    /// Decodes the raw value.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Decode`] when the value is not acceptable.
    fn unmarshal_request_data(data: &str) -> Result<Self, BindError>;
}
