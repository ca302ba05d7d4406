//! Request context types.
//!
//! The [`RequestContext`] wraps one incoming HTTP request together with the
//! merged form store, client metadata and an attribute map that middleware
//! use to hand data to each other. It is created fresh per request and never
//! shared across requests.

use crate::form::FormValues;
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Locale used when `Accept-Language` is absent or unusable.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Header carrying the client's `lat,long` position.
pub const HEADER_GEO_POSITION: &str = "x-latlong";

/// Form parameter naming a JSONP callback.
pub const CALLBACK_PARAM: &str = "callback";

/// Longest JSONP callback name that is honoured.
pub const MAX_CALLBACK_LEN: usize = 128;

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use vertex_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client position parsed from the `X-LatLong` header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
}

/// Per-request context flowing through the security check, the middleware
/// chain and into the handler.
///
/// # Example
///
/// ```
/// use vertex_core::RequestContext;
///
/// let request = http::Request::builder()
///     .uri("/users/1.0/user?name=alice")
///     .header("accept-language", "fr-FR,fr;q=0.9")
///     .body(bytes::Bytes::new())
///     .unwrap();
///
/// let mut ctx = RequestContext::from_request(request, None);
/// assert_eq!(ctx.form().value("name"), "alice");
/// assert_eq!(ctx.locale(), "fr-FR");
///
/// ctx.set_attribute("user", 42_u64);
/// assert_eq!(ctx.attribute::<u64>("user"), Some(&42));
/// ```
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    form: FormValues,
    attributes: HashMap<String, Box<dyn Any + Send + Sync>>,
    start_time: Instant,
    request_id: RequestId,
    locale: String,
    user_agent: String,
    remote_ip: Option<IpAddr>,
    location: Option<GeoLocation>,
    callback: Option<String>,
    secure: bool,
}

impl RequestContext {
    /// Builds a context from a raw request and the peer address.
    ///
    /// The form store receives urlencoded body values first, then query
    /// values. Path parameters are merged later with [`FormValues::set`].
    pub fn from_request(request: http::Request<Bytes>, peer: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();

        let mut form = FormValues::new();
        if is_form_body(&parts.headers) {
            if let Ok(text) = std::str::from_utf8(&body) {
                form.extend_urlencoded(text);
            }
        }
        if let Some(query) = parts.uri.query() {
            form.extend_urlencoded(query);
        }

        let user_agent = header_str(&parts.headers, http::header::USER_AGENT)
            .unwrap_or_default()
            .to_string();
        let callback = form
            .get(CALLBACK_PARAM)
            .filter(|cb| !cb.is_empty())
            .and_then(|cb| {
                if is_valid_callback(cb) {
                    Some(cb.to_string())
                } else {
                    tracing::debug!(callback = %cb, "ignoring invalid jsonp callback");
                    None
                }
            });

        let ctx = Self {
            locale: parse_locale(&parts.headers),
            remote_ip: parse_remote_ip(&parts.headers, peer),
            location: parse_location(&parts.headers),
            secure: parse_secure(&parts.uri, &parts.headers),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            form,
            attributes: HashMap::new(),
            start_time: Instant::now(),
            request_id: RequestId::new(),
            user_agent,
            callback,
        };

        tracing::debug!(
            request_id = %ctx.request_id,
            remote_ip = ?ctx.remote_ip,
            secure = ctx.secure,
            "request context created"
        );
        ctx
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the URI path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the merged form store.
    #[must_use]
    pub const fn form(&self) -> &FormValues {
        &self.form
    }

    /// Returns the merged form store for mutation.
    pub fn form_mut(&mut self) -> &mut FormValues {
        &mut self.form
    }

    /// Returns the first form value for a key, or `""`.
    #[must_use]
    pub fn form_value(&self, key: &str) -> &str {
        self.form.value(key)
    }

    /// Stores an attribute for downstream middleware or the handler.
    pub fn set_attribute<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.attributes.insert(key.into(), Box::new(value));
    }

    /// Returns an attribute if present and of type `T`.
    #[must_use]
    pub fn attribute<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.attributes.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Removes an attribute and returns it if it was of type `T`.
    pub fn remove_attribute<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        self.attributes
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Returns `true` if an attribute exists under the key.
    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns when the request started processing.
    #[must_use]
    pub const fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the preferred locale of the client.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns the `User-Agent` header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the resolved client IP.
    #[must_use]
    pub const fn remote_ip(&self) -> Option<IpAddr> {
        self.remote_ip
    }

    /// Returns the client position, if it sent one.
    #[must_use]
    pub const fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    /// Returns the JSONP callback name, if any.
    ///
    /// Only dotted JavaScript identifiers such as `cb` or `app.on_data` are
    /// kept. Anything else is dropped and the reply renders as plain JSON.
    #[must_use]
    pub fn callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    /// Returns `true` if the request arrived over TLS.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Marks the request as secure. Used by servers terminating TLS.
    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    /// Returns `true` if the client is on a loopback address.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.remote_ip.is_some_and(|ip| ip.is_loopback())
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("form", &self.form)
            .field("remote_ip", &self.remote_ip)
            .field("secure", &self.secure)
            .field("attributes", &self.attributes.len())
            .finish_non_exhaustive()
    }
}

fn header_str(headers: &HeaderMap, name: impl http::header::AsHeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_form_body(headers: &HeaderMap) -> bool {
    header_str(headers, http::header::CONTENT_TYPE)
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Takes the first language tag of `Accept-Language`, ignoring weights.
fn parse_locale(headers: &HeaderMap) -> String {
    header_str(headers, http::header::ACCEPT_LANGUAGE)
        .and_then(|value| value.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or_default().trim())
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map_or_else(|| DEFAULT_LOCALE.to_string(), ToString::to_string)
}

/// Resolves the client address: peer, then last `X-Forwarded-For` hop,
/// then `X-Real-Ip`. Later sources win when they parse.
fn parse_remote_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let mut ip = peer.map(|addr| addr.ip());

    if let Some(xff) = header_str(headers, "x-forwarded-for") {
        let last = xff.trim_matches(',').rsplit(',').next().unwrap_or_default();
        if let Ok(parsed) = last.trim().parse::<IpAddr>() {
            ip = Some(parsed);
        }
    }

    if let Some(xri) = header_str(headers, "x-real-ip") {
        if let Ok(parsed) = xri.trim().parse::<IpAddr>() {
            ip = Some(parsed);
        }
    }

    ip
}

fn parse_location(headers: &HeaderMap) -> Option<GeoLocation> {
    let value = header_str(headers, HEADER_GEO_POSITION)?;
    let (lat, long) = value.split_once(',')?;
    Some(GeoLocation {
        lat: lat.trim().parse().ok()?,
        long: long.trim().parse().ok()?,
    })
}

/// Accepts `^[A-Za-z_$][A-Za-z0-9_$.]*$` up to [`MAX_CALLBACK_LEN`] bytes.
fn is_valid_callback(callback: &str) -> bool {
    let mut chars = callback.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    callback.len() <= MAX_CALLBACK_LEN
        && (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn parse_secure(uri: &Uri, headers: &HeaderMap) -> bool {
    if uri.scheme_str() == Some("https") {
        return true;
    }

    header_str(headers, "x-forwarded-proto")
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, "x-scheme"))
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> http::request::Builder {
        http::Request::builder().uri(uri)
    }

    fn ctx(builder: http::request::Builder, peer: Option<&str>) -> RequestContext {
        let request = builder.body(Bytes::new()).unwrap();
        RequestContext::from_request(request, peer.map(|p| p.parse().unwrap()))
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_form_merges_body_then_query() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/x?a=query&b=2")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Bytes::from("a=body&c=3"))
            .unwrap();

        let ctx = RequestContext::from_request(request, None);
        assert_eq!(ctx.form().get_all("a"), ["body", "query"]);
        assert_eq!(ctx.form_value("a"), "body");
        assert_eq!(ctx.form_value("b"), "2");
        assert_eq!(ctx.form_value("c"), "3");
    }

    #[test]
    fn test_non_form_body_is_not_parsed() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/x")
            .header("content-type", "application/json")
            .body(Bytes::from("a=1"))
            .unwrap();

        let ctx = RequestContext::from_request(request, None);
        assert!(!ctx.form().has("a"));
    }

    #[test]
    fn test_locale_default_and_parsed() {
        assert_eq!(ctx(request("/"), None).locale(), DEFAULT_LOCALE);

        let parsed = ctx(
            request("/").header("accept-language", "he-IL;q=0.8, en;q=0.5"),
            None,
        );
        assert_eq!(parsed.locale(), "he-IL");
    }

    #[test]
    fn test_remote_ip_resolution() {
        let peer_only = ctx(request("/"), Some("10.0.0.1:5555"));
        assert_eq!(peer_only.remote_ip(), Some("10.0.0.1".parse().unwrap()));

        let forwarded = ctx(
            request("/").header("x-forwarded-for", "1.1.1.1, 2.2.2.2,"),
            Some("10.0.0.1:5555"),
        );
        assert_eq!(forwarded.remote_ip(), Some("2.2.2.2".parse().unwrap()));

        let real_ip = ctx(
            request("/")
                .header("x-forwarded-for", "1.1.1.1")
                .header("x-real-ip", "3.3.3.3"),
            Some("10.0.0.1:5555"),
        );
        assert_eq!(real_ip.remote_ip(), Some("3.3.3.3".parse().unwrap()));

        let garbage = ctx(
            request("/").header("x-forwarded-for", "not-an-ip"),
            Some("10.0.0.1:5555"),
        );
        assert_eq!(garbage.remote_ip(), Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_is_local() {
        assert!(ctx(request("/"), Some("127.0.0.1:1")).is_local());
        assert!(ctx(request("/"), Some("[::1]:1")).is_local());
        assert!(!ctx(request("/"), Some("8.8.8.8:1")).is_local());
        assert!(!ctx(request("/"), None).is_local());
    }

    #[test]
    fn test_location_header() {
        let located = ctx(request("/").header("x-latlong", "32.08,34.78"), None);
        assert_eq!(
            located.location(),
            Some(GeoLocation {
                lat: 32.08,
                long: 34.78
            })
        );

        let broken = ctx(request("/").header("x-latlong", "north,south"), None);
        assert!(broken.location().is_none());
    }

    #[test]
    fn test_secure_detection() {
        assert!(!ctx(request("/"), None).is_secure());
        assert!(ctx(request("https://example.com/"), None).is_secure());
        assert!(ctx(request("/").header("x-forwarded-proto", "https"), None).is_secure());
        assert!(ctx(request("/").header("x-scheme", "https"), None).is_secure());
        assert!(!ctx(request("/").header("x-forwarded-proto", "http"), None).is_secure());
    }

    #[test]
    fn test_callback_param() {
        assert_eq!(ctx(request("/?callback=cb"), None).callback(), Some("cb"));
        assert_eq!(ctx(request("/?callback="), None).callback(), None);
        assert_eq!(
            ctx(request("/?callback=app.on_data"), None).callback(),
            Some("app.on_data")
        );
    }

    #[test]
    fn test_callback_rejects_script() {
        for cb in [
            "alert(document.cookie);//",
            "cb%3Balert(1)",
            "1cb",
            "cb%20x",
            "%3Cscript%3E",
        ] {
            let uri = format!("/?callback={cb}");
            assert_eq!(ctx(request(&uri), None).callback(), None, "{cb}");
        }

        let long = format!("/?callback={}", "a".repeat(MAX_CALLBACK_LEN + 1));
        assert_eq!(ctx(request(&long), None).callback(), None);
    }

    #[test]
    fn test_attributes() {
        let mut ctx = ctx(request("/"), None);
        ctx.set_attribute("principal", "alice".to_string());

        assert!(ctx.has_attribute("principal"));
        assert_eq!(ctx.attribute::<String>("principal").map(String::as_str), Some("alice"));
        assert_eq!(ctx.attribute::<u32>("principal"), None);
        assert_eq!(ctx.remove_attribute::<String>("principal").as_deref(), Some("alice"));
        assert!(!ctx.has_attribute("principal"));
    }

    #[test]
    fn test_user_agent() {
        let ctx = ctx(request("/").header("user-agent", "curl/8.0"), None);
        assert_eq!(ctx.user_agent(), "curl/8.0");
    }
}
