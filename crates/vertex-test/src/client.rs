//! In-memory client over a frozen registry.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use vertex_server::FrozenRegistry;

/// Sends requests straight into a [`FrozenRegistry`].
///
/// Requests go through routing, security, middleware, binding, validation
/// and rendering exactly as they would behind a listener, without opening a
/// socket.
///
/// ```rust,ignore
/// let client = TestClient::new(registry);
///
/// client
///     .get("/users/1.0/get/42")
///     .header("x-token", "secret")
///     .send()
///     .await
///     .assert_status(StatusCode::OK)
///     .assert_json_field("id", &json!(42));
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    registry: Arc<FrozenRegistry>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `registry`.
    pub fn new(registry: Arc<FrozenRegistry>) -> Self {
        Self {
            registry,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The registry requests are sent to.
    #[must_use]
    pub fn registry(&self) -> &Arc<FrozenRegistry> {
        &self.registry
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let builder = self
            .default_headers
            .iter()
            .fold(TestRequestBuilder::new(method, uri), |b, (name, value)| {
                b.header(name, value)
            });
        TestClientRequest {
            client: self,
            builder,
        }
    }

    /// Sends an already built request.
    pub async fn execute(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let (request, peer) = request.into_http_request();
        let response = self.registry.handle(request, Some(peer)).await;
        TestResponse::from_http(response).await
    }
}

/// A request builder bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Sets a urlencoded form body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the client address seen by the server.
    pub fn peer(mut self, peer: SocketAddr) -> Self {
        self.builder = self.builder.peer(peer);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built or the body not read.
    /// Use [`TestClientRequest::try_send`] to handle those errors.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, returning build and read errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use vertex_core::Reply;
    use vertex_schema::handler_fn;
    use vertex_server::{Api, MethodFlag, Registry, Route};

    fn echo_registry() -> Arc<FrozenRegistry> {
        Registry::builder()
            .api(
                Api::new("echo", "1.0").route(Route::new(
                    "/echo",
                    MethodFlag::GET | MethodFlag::POST | MethodFlag::PUT | MethodFlag::DELETE,
                    handler_fn(|_w, req| {
                        let reply = Reply::json(&json!({
                            "method": req.method().as_str(),
                            "name": req.form_value("name"),
                            "token": req.header("x-token").unwrap_or_default(),
                            "local": req.is_local(),
                        }));
                        Box::pin(async move { reply })
                    }),
                )),
            )
            .freeze()
            .unwrap()
    }

    #[tokio::test]
    async fn test_all_methods() {
        let client = TestClient::new(echo_registry());
        for (method, name) in [
            (Method::GET, "GET"),
            (Method::POST, "POST"),
            (Method::PUT, "PUT"),
            (Method::DELETE, "DELETE"),
        ] {
            client
                .request(method, "/echo/1.0/echo")
                .send()
                .await
                .assert_status(StatusCode::OK)
                .assert_json_field("method", &json!(name));
        }
    }

    #[tokio::test]
    async fn test_query_and_form_reach_handler() {
        let client = TestClient::new(echo_registry());

        client
            .get("/echo/1.0/echo")
            .query("name", "alice")
            .send()
            .await
            .assert_json_field("name", &json!("alice"));

        client
            .post("/echo/1.0/echo")
            .form(&[("name", "bob")])
            .send()
            .await
            .assert_json_field("name", &json!("bob"));
    }

    #[tokio::test]
    async fn test_default_header_and_peer() {
        let client = TestClient::new(echo_registry()).with_default_header("x-token", "secret");

        client
            .get("/echo/1.0/echo")
            .send()
            .await
            .assert_json_field("token", &json!("secret"))
            .assert_json_field("local", &json!(true));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let client = TestClient::new(echo_registry());
        client
            .get("/nope")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_blocking_use() {
        let client = TestClient::new(echo_registry());
        let response = tokio_test::block_on(client.delete("/echo/1.0/echo").send());
        response.assert_json_field("method", &json!("DELETE"));
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let client = TestClient::new(echo_registry());
        let result = client.get("/echo/1.0/echo").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
