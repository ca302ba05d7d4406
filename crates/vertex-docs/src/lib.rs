//! # Vertex Docs
//!
//! Swagger 2.0 documentation for Vertex APIs.
//!
//! The document is generated from the same parameter descriptors that drive
//! binding and validation, so the published schema cannot drift from what
//! the server enforces.
//!
//! ## Quick Start
//!
//! ```rust
//! use vertex_docs::SwaggerBuilder;
//! use vertex_schema::{extract_request_info, FieldDecl, InputShape};
//!
//! let shape = InputShape::fields([
//!     FieldDecl::string("Id").rename("id").required().in_path(),
//! ]);
//! let info = extract_request_info("/users/{id}", "Fetch a user", &shape).unwrap();
//!
//! let json = SwaggerBuilder::new("Users", "1.0")
//!     .base_path("/users/1.0")
//!     .route(&info, &[http::Method::GET], None)
//!     .build()
//!     .unwrap()
//!     .to_json()
//!     .unwrap();
//!
//! assert!(json.contains("\"basePath\":\"/users/1.0\""));
//! ```

#![doc(html_root_url = "https://docs.rs/vertex-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod error;
mod swagger;

pub use builder::SwaggerBuilder;
pub use error::{DocsError, DocsResult};
pub use swagger::{
    location_name, Info, Items, Method, Param, Path, Response, SwaggerDoc, SwaggerType,
    SWAGGER_VERSION,
};
