//! Declarative description of a handler's input fields.
//!
//! A handler describes its fields once through [`InputShape`]. Schema
//! extraction turns the shape into [`ParamDescriptor`](crate::ParamDescriptor)s.
//!
//! # Example
//!
//! ```
//! use vertex_schema::{FieldDecl, InputShape};
//!
//! let shape = InputShape::fields([
//!     FieldDecl::ignored("Fetch a user by id"),
//!     FieldDecl::string("Id").rename("id").required().in_path(),
//!     FieldDecl::int("Limit")
//!         .tags(r#"schema:"limit" default:"10" min:"1" max:"100""#),
//! ]);
//! assert!(shape.is_struct());
//! ```

use crate::descriptor::{Kind, Location};
use tracing::warn;

/// Struct key of the field whose doc becomes the handler description.
pub const IGNORE_KEY: &str = "_";

/// The input shape of a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum InputShape {
    /// A handler with named fields.
    Struct(Vec<FieldDecl>),
    /// A plain function handler with no parameters.
    Function,
    /// Anything else. Registration fails for this shape.
    Unsupported(String),
}

impl InputShape {
    /// Creates a struct shape from field declarations.
    #[must_use]
    pub fn fields(fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        Self::Struct(fields.into_iter().collect())
    }

    /// Returns `true` for struct shapes.
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Returns `true` for function shapes.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function)
    }
}

/// The type of a declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A scalar or list parameter.
    Leaf(Kind),
    /// An embedded group whose fields are flattened into the parent.
    Group(Vec<FieldDecl>),
    /// A field decoded by the handler from its raw string.
    Decoded,
    /// A field of a type binding does not support. Skipped with a warning.
    Unknown(String),
}

/// A single declared handler field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub(crate) struct_key: String,
    pub(crate) name: Option<String>,
    pub(crate) ty: FieldType,
    pub(crate) required: bool,
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

impl FieldDecl {
    /// Creates a declaration of the given type.
    #[must_use]
    pub fn new(struct_key: impl Into<String>, ty: FieldType) -> Self {
        Self {
            struct_key: struct_key.into(),
            name: None,
            ty,
            required: false,
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

    /// A string field.
    #[must_use]
    pub fn string(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Leaf(Kind::String))
    }

    /// An integer field.
    #[must_use]
    pub fn int(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Leaf(Kind::Int))
    }

    /// A float field.
    #[must_use]
    pub fn float(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Leaf(Kind::Float))
    }

    /// A boolean field.
    #[must_use]
    pub fn bool(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Leaf(Kind::Bool))
    }

    /// A list-of-strings field.
    #[must_use]
    pub fn string_list(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Leaf(Kind::StringList))
    }

    /// A field the handler decodes itself, see
    /// [`Unmarshaler`](crate::Unmarshaler).
    #[must_use]
    pub fn decoded(struct_key: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Decoded)
    }

    /// An embedded group of fields.
    #[must_use]
    pub fn group(struct_key: impl Into<String>, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        Self::new(struct_key, FieldType::Group(fields.into_iter().collect()))
    }

    /// A field of an unsupported type.
    #[must_use]
    pub fn unknown(struct_key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(struct_key, FieldType::Unknown(type_name.into()))
    }

    /// The marker field carrying the handler's description.
    #[must_use]
    pub fn ignored(description: impl Into<String>) -> Self {
        Self::string(IGNORE_KEY).doc(description)
    }

    /// Sets the wire name. Defaults to the struct key.
    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default, in its textual form.
    #[must_use]
    pub fn default(mut self, raw: impl Into<String>) -> Self {
        self.raw_default = raw.into();
        self
    }

    /// Sets the numeric lower bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the numeric upper bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub const fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    /// Sets a regular expression the value must match.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets where the parameter is read from.
    #[must_use]
    pub const fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Reads the parameter from the path.
    #[must_use]
    pub const fn in_path(self) -> Self {
        self.location(Location::Path)
    }

    /// Reads the parameter from a header.
    #[must_use]
    pub const fn in_header(self) -> Self {
        self.location(Location::Header)
    }

    /// Reads the parameter from a form body.
    #[must_use]
    pub const fn in_body(self) -> Self {
        self.location(Location::Body)
    }

    /// Sets the description.
    #[must_use]
    pub fn doc(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the documentation format hint.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the allowed values, for documentation.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Applies constraints written as struct tags:
    /// `schema:"name" required:"true" min:"1" in:"path"`.
    ///
    /// Recognized keys are `schema`, `doc`, `default`, `required`, `min`,
    /// `max`, `minlen`, `maxlen`, `pattern`, `in`, `format` and `options`.
    /// Unparseable values and unknown keys are logged and ignored.
    #[must_use]
    pub fn tags(mut self, tags: &str) -> Self {
        for (key, value) in parse_tags(tags) {
            self = self.apply_tag(key, &value);
        }
        self
    }

    fn apply_tag(self, key: &str, value: &str) -> Self {
        match key {
            "schema" => {
                let name = value.split(',').next().unwrap_or_default();
                if name.is_empty() {
                    self
                } else {
                    self.rename(name)
                }
            }
            "doc" => self.doc(value),
            "default" => self.default(value),
            "required" => match crate::parse::parse_bool(value) {
                Some(true) => self.required(),
                Some(false) => Self {
                    required: false,
                    ..self
                },
                None => self.bad_tag(key, value),
            },
            "min" => match value.trim().parse() {
                Ok(min) => self.min(min),
                Err(_) => self.bad_tag(key, value),
            },
            "max" => match value.trim().parse() {
                Ok(max) => self.max(max),
                Err(_) => self.bad_tag(key, value),
            },
            "minlen" => match value.trim().parse() {
                Ok(len) => self.min_length(len),
                Err(_) => self.bad_tag(key, value),
            },
            "maxlen" => match value.trim().parse() {
                Ok(len) => self.max_length(len),
                Err(_) => self.bad_tag(key, value),
            },
            "pattern" => self.pattern(value),
            "in" => match Location::parse(value) {
                Some(location) => self.location(location),
                None => self.bad_tag(key, value),
            },
            "format" => self.format(value),
            "options" => self.options(crate::parse::parse_list(value)),
            _ => {
                warn!(field = %self.struct_key, tag = key, "ignoring unknown field tag");
                self
            }
        }
    }

    fn bad_tag(self, key: &str, value: &str) -> Self {
        warn!(
            field = %self.struct_key,
            tag = key,
            value = value,
            "ignoring unparseable field tag"
        );
        self
    }
}

/// Splits `key:"value" key2:"value2"` into pairs. Quoted values may contain
/// spaces and backslash-escaped quotes.
fn parse_tags(tags: &str) -> Vec<(&str, String)> {
    let mut out = Vec::new();
    let mut rest = tags.trim_start();

    while !rest.is_empty() {
        let Some(colon) = rest.find(':') else {
            warn!(tags = tags, "malformed field tags");
            break;
        };
        let key = rest[..colon].trim();
        rest = &rest[colon + 1..];

        let Some(body) = rest.strip_prefix('"') else {
            warn!(tags = tags, key = key, "field tag value is not quoted");
            break;
        };

        let mut value = String::new();
        let mut escaped = false;
        let mut end = None;
        for (i, c) in body.char_indices() {
            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                end = Some(i);
                break;
            } else {
                value.push(c);
            }
        }

        let Some(end) = end else {
            warn!(tags = tags, key = key, "unterminated field tag value");
            break;
        };
        out.push((key, value));
        rest = body[end + 1..].trim_start();
    }

    out
}
