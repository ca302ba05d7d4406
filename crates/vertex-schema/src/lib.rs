//! # Vertex Schema
//!
//! Parameter schema extraction, binding and validation for Vertex handlers.
//!
//! Handlers declare their inputs once through an [`InputShape`]. At
//! registration the shape is turned into [`ParamDescriptor`]s, which drive:
//!
//! | Stage | Entry point | Runs |
//! |-------|-------------|------|
//! | Extraction | [`extract`] | once per handler type |
//! | Binding | [`bind`] | per request |
//! | Defaults and validation | [`RequestValidator`] | per request |
//! | Documentation | [`extract_request_info`] | once per route |
//!
//! ## Example
//!
//! ```rust
//! use vertex_schema::{extract, FieldDecl, InputShape, Kind};
//!
//! let shape = InputShape::fields([
//!     FieldDecl::string("Name").rename("name").required().max_length(100),
//!     FieldDecl::int("Age").rename("age").min(18.0).default("21"),
//! ]);
//!
//! let params = extract(&shape).unwrap();
//! assert_eq!(params[0].name(), "name");
//! assert_eq!(params[1].kind(), Kind::Int);
//! assert!(params[1].has_default());
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod descriptor;
mod error;
mod extract;
mod handler;
mod parse;
mod shape;
mod validate;
mod value;

pub use bind::bind;
pub use descriptor::{Kind, Location, ParamDescriptor, Value};
pub use error::{BindError, SchemaError, ValidationError};
pub use extract::{extract, extract_request_info, RequestInfo};
pub use handler::{
    handler_fn, DescribeInput, Factory, FnHandler, HandlerDescriptor, RequestHandler,
};
pub use parse::{parse_bool, parse_default, parse_list, parse_value};
pub use shape::{FieldDecl, FieldType, InputShape, IGNORE_KEY};
pub use validate::{
    new_validator, BaseValidator, FieldValidator, FloatValidator, IntValidator, KindValidator,
    RequestValidator, StringValidator,
};
pub use value::{Bindable, FieldRef, Unmarshaler};
