//! # Vertex Test
//!
//! In-memory testing for Vertex APIs. A [`TestClient`] feeds requests
//! directly into a frozen registry, so the whole pipeline runs (routing,
//! security, middleware, binding, validation, rendering) without binding a
//! port.
//!
//! ## Example
//!
//! ```rust,ignore
//! use http::StatusCode;
//! use vertex_test::TestClient;
//!
//! #[tokio::test]
//! async fn test_get_user() {
//!     let client = TestClient::new(registry());
//!
//!     let response = client
//!         .get("/users/1.0/get/0")
//!         .header("x-token", "secret")
//!         .send()
//!         .await;
//!
//!     response
//!         .assert_status(StatusCode::BAD_REQUEST)
//!         .assert_text("Value too small for id\n");
//! }
//! ```
//!
//! Requests come from `127.0.0.1` unless [`TestRequestBuilder::peer`] says
//! otherwise, which matters for APIs that refuse insecure remote clients.

#![doc(html_root_url = "https://docs.rs/vertex-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder, DEFAULT_PEER};
pub use response::TestResponse;
