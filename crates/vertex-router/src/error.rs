//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Errors raised while inserting routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Two routes claim the same method on the same path template.
    #[error("route conflict: {method} {path} is already registered")]
    Conflict {
        /// The conflicting method.
        method: Method,
        /// The path template.
        path: String,
    },

    /// Two templates use different parameter names at the same position.
    #[error("route conflict: parameter '{{{new}}}' in {path} shadows existing '{{{existing}}}'")]
    ParamNameMismatch {
        /// The path template being inserted.
        path: String,
        /// The name already registered at this position.
        existing: String,
        /// The name in the new template.
        new: String,
    },

    /// A `*name` segment that is not the last one.
    #[error("wildcard must be the last segment in {path}")]
    WildcardNotLast {
        /// The offending template.
        path: String,
    },

    /// A `{` or `}` that does not form a `{name}` placeholder.
    #[error("malformed path segment '{segment}' in {path}")]
    MalformedSegment {
        /// The offending template.
        path: String,
        /// The segment that failed to parse.
        segment: String,
    },
}
