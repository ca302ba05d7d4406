//! # Vertex Core
//!
//! Core types for the Vertex API framework.
//!
//! This crate provides the foundational types used throughout Vertex:
//!
//! - [`ApiError`] - The closed error taxonomy and its HTTP mapping
//! - [`RequestContext`] - Per-request context with form store and attributes
//! - [`FormValues`] - Merged query, body and path parameters
//! - [`ResponseWriter`] - Response sink shared by middleware and renderers
//! - [`Reply`] - A handler's successful return value

#![doc(html_root_url = "https://docs.rs/vertex-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod form;
mod handler;
mod response;

pub use context::{
    GeoLocation, RequestContext, RequestId, CALLBACK_PARAM, DEFAULT_LOCALE, HEADER_GEO_POSITION,
    MAX_CALLBACK_LEN,
};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use form::FormValues;
pub use handler::{BoxFuture, HandlerResult};
pub use response::{Reply, ResponseWriter};
