//! Swagger 2.0 document types.
//!
//! These mirror the subset of the Swagger 2.0 object model that Vertex
//! emits. Field names follow the Swagger JSON spelling through serde
//! renames.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vertex_schema::{Kind, Location, ParamDescriptor};

/// The Swagger version this crate emits.
pub const SWAGGER_VERSION: &str = "2.0";

/// Swagger primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwaggerType {
    /// A string.
    String,
    /// A floating point number.
    Number,
    /// An integer.
    Integer,
    /// A boolean.
    Boolean,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl From<Kind> for SwaggerType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::String | Kind::Custom => Self::String,
            Kind::Int => Self::Integer,
            Kind::Float => Self::Number,
            Kind::Bool => Self::Boolean,
            Kind::StringList => Self::Array,
        }
    }
}

/// Returns the Swagger `in` value for a parameter location.
#[must_use]
pub const fn location_name(location: Location) -> &'static str {
    match location {
        Location::Query => "query",
        Location::Body => "formData",
        Location::Path => "path",
        Location::Header => "header",
    }
}

/// Meta information about the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// API title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// API description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Item type of an array parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Items {
    /// Element type.
    #[serde(rename = "type")]
    pub item_type: SwaggerType,
}

/// A single request parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Wire name.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Whether the parameter is required.
    pub required: bool,
    /// Value type.
    #[serde(rename = "type")]
    pub param_type: SwaggerType,
    /// Format hint.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Raw default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Inclusive upper bound.
    #[serde(rename = "maximum", default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Inclusive lower bound.
    #[serde(rename = "minimum", default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum length.
    #[serde(rename = "maxLength", default, skip_serializing_if = "is_zero")]
    pub max_length: usize,
    /// Minimum length.
    #[serde(rename = "minLength", default, skip_serializing_if = "is_zero")]
    pub min_length: usize,
    /// Regex pattern.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Location of the parameter.
    #[serde(rename = "in")]
    pub location: String,
    /// Element type for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Param {
    /// Converts a parameter descriptor.
    ///
    /// Bounds are emitted only when set, lengths only when non-zero.
    #[must_use]
    pub fn from_descriptor(param: &ParamDescriptor) -> Self {
        let param_type = SwaggerType::from(param.kind());
        Self {
            name: param.name().to_string(),
            description: param.description().to_string(),
            required: param.required(),
            param_type,
            format: param.format().to_string(),
            default: Some(param.raw_default())
                .filter(|raw| !raw.is_empty())
                .map(ToString::to_string),
            max: param.max(),
            min: param.min(),
            max_length: param.max_length(),
            min_length: param.min_length(),
            pattern: param.pattern().unwrap_or_default().to_string(),
            options: param.options().to_vec(),
            location: location_name(param.location()).to_string(),
            items: (param_type == SwaggerType::Array).then_some(Items {
                item_type: SwaggerType::String,
            }),
        }
    }
}

/// A response description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Human readable description.
    pub description: String,
    /// Response schema, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

/// One HTTP method on a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Method {
    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Operation identifier.
    #[serde(rename = "operationId", default, skip_serializing_if = "String::is_empty")]
    pub operation_id: String,
    /// Request parameters.
    #[serde(default)]
    pub parameters: Vec<Param>,
    /// Responses by status code or `default`.
    pub responses: IndexMap<String, Response>,
    /// Grouping tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Methods of one path, keyed by lowercase method name.
pub type Path = IndexMap<String, Method>;

/// The Swagger document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDoc {
    /// Always `2.0`.
    pub swagger: String,
    /// API meta information.
    pub info: Info,
    /// Host serving the API.
    pub host: String,
    /// Base path of every route.
    #[serde(rename = "basePath")]
    pub base_path: String,
    /// Accepted URL schemes.
    pub schemes: Vec<String>,
    /// Request content types.
    pub consumes: Vec<String>,
    /// Response content types.
    pub produces: Vec<String>,
    /// Routes by relative path.
    pub paths: IndexMap<String, Path>,
}

impl SwaggerDoc {
    /// Serializes the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DocsError::SerializationError`] on failure.
    pub fn to_json(&self) -> crate::DocsResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
