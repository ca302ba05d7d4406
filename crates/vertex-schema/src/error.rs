//! Schema, binding and validation error types.

use crate::descriptor::Kind;
use thiserror::Error;
use vertex_core::ApiError;

/// Error raised while extracting a handler's schema at registration time.
///
/// This is the only hard failure of schema extraction; everything else is
/// logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The handler's input is neither struct-like nor function-like.
    #[error("could not extract request info from non struct type '{type_name}'")]
    UnsupportedShape {
        /// Name of the offending type.
        type_name: String,
    },
}

/// Error raised by a handler's binder when writing a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The handler has no field with this struct key.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The value does not have the kind the field expects.
    #[error("expected a {expected} value, got {actual}")]
    WrongType {
        /// The kind the field expects.
        expected: Kind,
        /// The kind that was supplied.
        actual: Kind,
    },

    /// A custom decoder rejected the raw value.
    #[error("could not decode '{value}': {reason}")]
    Decode {
        /// The raw value.
        value: String,
        /// Why decoding failed.
        reason: String,
    },
}

impl BindError {
    /// Creates a decode error.
    #[must_use]
    pub fn decode(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A single field violation found while binding or validating a request.
///
/// Messages are safe to show to clients.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required parameter is absent from the request.
    #[error("missing required param '{name}'")]
    Missing {
        /// Wire name of the parameter.
        name: String,
    },

    /// A string exceeds its maximum length.
    #[error("{name} is too long")]
    TooLong {
        /// Wire name of the parameter.
        name: String,
        /// Configured maximum length.
        max: usize,
    },

    /// A string is shorter than its minimum length.
    #[error("{name} is too short")]
    TooShort {
        /// Wire name of the parameter.
        name: String,
        /// Configured minimum length.
        min: usize,
    },

    /// A string does not match its pattern.
    #[error("{name} does not match regex pattern")]
    PatternMismatch {
        /// Wire name of the parameter.
        name: String,
        /// The pattern source.
        pattern: String,
    },

    /// A number is below its minimum.
    #[error("Value too small for {name}")]
    TooSmall {
        /// Wire name of the parameter.
        name: String,
        /// Configured minimum.
        min: f64,
    },

    /// A number is above its maximum.
    #[error("Value too large for {name}")]
    TooLarge {
        /// Wire name of the parameter.
        name: String,
        /// Configured maximum.
        max: f64,
    },

    /// A raw request value could not be converted to the declared kind.
    #[error("invalid value '{value}' for {name}")]
    Malformed {
        /// Wire name of the parameter.
        name: String,
        /// The raw value.
        value: String,
    },

    /// The handler's bound field does not hold the declared kind.
    #[error("field {name} does not hold a {expected} value")]
    TypeMismatch {
        /// Wire name of the parameter.
        name: String,
        /// The declared kind.
        expected: Kind,
    },

    /// The handler's binder rejected a value.
    #[error("could not bind {name}: {source}")]
    Bind {
        /// Wire name of the parameter.
        name: String,
        /// The binder's error.
        #[source]
        source: BindError,
    },
}

impl ValidationError {
    /// Returns the wire name of the offending parameter.
    #[must_use]
    pub fn param_name(&self) -> &str {
        match self {
            Self::Missing { name }
            | Self::TooLong { name, .. }
            | Self::TooShort { name, .. }
            | Self::PatternMismatch { name, .. }
            | Self::TooSmall { name, .. }
            | Self::TooLarge { name, .. }
            | Self::Malformed { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::Bind { name, .. } => name,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::invalid_field(err.param_name().to_string(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertex_core::ErrorKind;

    #[test]
    fn test_messages() {
        let missing = ValidationError::Missing {
            name: "id".to_string(),
        };
        assert_eq!(missing.to_string(), "missing required param 'id'");

        let small = ValidationError::TooSmall {
            name: "age".to_string(),
            min: 18.0,
        };
        assert_eq!(small.to_string(), "Value too small for age");

        let long = ValidationError::TooLong {
            name: "name".to_string(),
            max: 3,
        };
        assert_eq!(long.to_string(), "name is too long");
    }

    #[test]
    fn test_into_api_error_cites_field() {
        let err: ApiError = ValidationError::PatternMismatch {
            name: "email".to_string(),
            pattern: "@".to_string(),
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.field(), Some("email"));
        assert_eq!(err.to_string(), "email does not match regex pattern");
    }

    #[test]
    fn test_bind_error_display() {
        let err = ValidationError::Bind {
            name: "when".to_string(),
            source: BindError::decode("yesterday", "not a date"),
        };
        assert_eq!(
            err.to_string(),
            "could not bind when: could not decode 'yesterday': not a date"
        );
    }
}
