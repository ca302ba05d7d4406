//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::fmt;

/// A fully read response with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads `response` to the end.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid utf-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        serde_json::from_slice(&self.body).map_err(TestError::Json)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics with the body in the message if the status differs.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {:?}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a header is present with the given value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self.header(name);
        assert_eq!(
            actual,
            Some(expected.as_ref()),
            "header {name:?} mismatch"
        );
        self
    }

    /// Asserts the exact body text.
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    #[track_caller]
    pub fn assert_text(&self, expected: impl AsRef<str>) -> &Self {
        assert_eq!(
            String::from_utf8_lossy(&self.body),
            expected.as_ref(),
            "body mismatch"
        );
        self
    }

    /// Asserts that a dotted JSON path holds `expected`.
    ///
    /// Numeric segments index into arrays: `items.0.name`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON, the path is missing or the value differs.
    #[track_caller]
    pub fn assert_json_field(&self, path: &str, expected: &serde_json::Value) -> &Self {
        let json: serde_json::Value = match self.json() {
            Ok(json) => json,
            Err(e) => panic!("body is not json ({e}): {:?}", String::from_utf8_lossy(&self.body)),
        };
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("json path {path:?} not found in {json}"));
        assert_eq!(actual, expected, "json field {path:?} mismatch");
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    fn response(status: u16, body: &str) -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        TestResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from(body.to_string()),
        )
    }

    #[test]
    fn test_accessors() {
        let r = response(200, r#"{"name":"Alice"}"#);
        assert_eq!(r.status(), StatusCode::OK);
        assert_eq!(r.content_type(), Some("application/json; charset=utf-8"));
        assert_eq!(r.header("x-missing"), None);
        assert_eq!(r.text().unwrap(), r#"{"name":"Alice"}"#);
    }

    #[test]
    fn test_json() {
        let r = response(200, r#"{"name":"Alice","age":30}"#);
        let value: serde_json::Value = r.json().unwrap();
        assert_eq!(value["age"], 30);
        assert!(response(200, "nope").json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_assertions_chain() {
        response(400, "Value too small for id\n")
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_header("content-type", "application/json; charset=utf-8")
            .assert_text("Value too small for id\n");
    }

    #[test]
    #[should_panic(expected = "expected status 200 OK")]
    fn test_assert_status_failure() {
        response(404, "404 page not found").assert_status(StatusCode::OK);
    }

    #[test]
    fn test_assert_json_field() {
        response(200, r#"{"user":{"tags":["admin","ops"]}}"#)
            .assert_json_field("user.tags.1", &json!("ops"));
    }

    #[test]
    fn test_json_path() {
        let value = json!({ "a": [{ "b": 1 }] });
        assert_eq!(json_path(&value, "a.0.b"), Some(&json!(1)));
        assert_eq!(json_path(&value, "a.1.b"), None);
        assert_eq!(json_path(&value, ""), Some(&value));
    }

    #[tokio::test]
    async fn test_from_http() {
        let http = http::Response::builder()
            .status(StatusCode::CREATED)
            .header("x-vertex-requestid", "abc")
            .body(http_body_util::Full::new(Bytes::from_static(b"done")))
            .unwrap();

        let r = TestResponse::from_http(http).await.unwrap();
        r.assert_status(StatusCode::CREATED)
            .assert_header("x-vertex-requestid", "abc")
            .assert_text("done");
    }
}
