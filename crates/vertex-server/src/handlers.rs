//! Ready-made handlers and path helpers.

use crate::route::{MethodFlag, Route};
use http::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vertex_core::{ApiError, BoxFuture, HandlerResult, Reply, RequestContext, ResponseWriter};
use vertex_schema::{
    BindError, Bindable, DescribeInput, FieldRef, HandlerDescriptor, InputShape, RequestHandler,
    SchemaError, Value,
};

/// A handler that does nothing and returns an empty reply.
///
/// Useful for routes whose work is done entirely by middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidHandler;

impl Bindable for VoidHandler {
    fn field(&self, _key: &str) -> Option<FieldRef<'_>> {
        None
    }

    fn set_field(&mut self, key: &str, _value: Value) -> Result<(), BindError> {
        Err(BindError::UnknownField(key.to_string()))
    }
}

impl DescribeInput for VoidHandler {
    fn input_shape() -> InputShape {
        InputShape::Function
    }
}

impl RequestHandler for VoidHandler {
    fn handle<'a>(
        &'a self,
        _w: &'a mut ResponseWriter,
        _req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async { Ok(Reply::Empty) })
    }
}

/// Serves files from a directory.
///
/// The route prefix is stripped from the request path and the rest is
/// looked up under the directory. The handler writes the response itself
/// and returns [`ApiError::Hijacked`], so no renderer runs.
///
/// # Example
///
/// ```
/// use vertex_server::{Api, StaticHandler};
///
/// let api = Api::new("console", "1.0")
///     .route(StaticHandler::new("/console/1.0/static", "./public").route("/static/*path"));
/// assert_eq!(api.routes().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StaticHandler {
    strip_prefix: String,
    dir: Arc<PathBuf>,
}

impl StaticHandler {
    /// Creates a handler stripping `strip_prefix` and serving from `dir`.
    pub fn new(strip_prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            strip_prefix: strip_prefix.into(),
            dir: Arc::new(dir.into()),
        }
    }

    /// Describes this handler for registration.
    ///
    /// # Errors
    ///
    /// Never fails in practice: the handler has a function shape.
    pub fn descriptor(self) -> Result<HandlerDescriptor, SchemaError> {
        let factory = move || Box::new(self.clone()) as Box<dyn RequestHandler>;
        HandlerDescriptor::new(
            std::any::type_name::<Self>(),
            InputShape::Function,
            Arc::new(factory),
        )
    }

    /// Builds a `GET` route serving this directory.
    #[must_use]
    pub fn route(self, path: impl Into<String>) -> Route {
        Route::from_result(path.into(), MethodFlag::GET, self.descriptor())
    }

    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = request_path
            .strip_prefix(self.strip_prefix.as_str())
            .unwrap_or(request_path);

        let mut path = self.dir.as_ref().clone();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                s => path.push(s),
            }
        }
        Some(path)
    }

    async fn serve(&self, w: &mut ResponseWriter, req: &RequestContext) {
        let Some(mut path) = self.resolve(req.path()) else {
            tracing::warn!(path = req.path(), "rejecting path traversal");
            w.write_error(StatusCode::NOT_FOUND, "404 page not found");
            return;
        };

        if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            path.push("index.html");
        }

        match tokio::fs::read(&path).await {
            Ok(contents) => {
                w.set_header("content-type", content_type(&path));
                w.write_status(StatusCode::OK);
                w.write(&contents);
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "static file not served");
                w.write_error(StatusCode::NOT_FOUND, "404 page not found");
            }
        }
    }
}

impl Bindable for StaticHandler {
    fn field(&self, _key: &str) -> Option<FieldRef<'_>> {
        None
    }

    fn set_field(&mut self, key: &str, _value: Value) -> Result<(), BindError> {
        Err(BindError::UnknownField(key.to_string()))
    }
}

impl RequestHandler for StaticHandler {
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            self.serve(w, req).await;
            Err(ApiError::Hijacked)
        })
    }
}

/// Answers every request with a redirect.
///
/// Like [`StaticHandler`] it writes the response itself and returns
/// [`ApiError::Hijacked`].
#[derive(Debug, Clone)]
pub struct RedirectHandler {
    location: Arc<str>,
    status: StatusCode,
}

impl RedirectHandler {
    /// A `301 Moved Permanently` to `location`.
    pub fn permanent(location: impl Into<String>) -> Self {
        Self {
            location: Arc::from(location.into()),
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    /// The redirect target.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Describes this handler for registration.
    ///
    /// # Errors
    ///
    /// Never fails in practice: the handler has a function shape.
    pub fn descriptor(self) -> Result<HandlerDescriptor, SchemaError> {
        let factory = move || Box::new(self.clone()) as Box<dyn RequestHandler>;
        HandlerDescriptor::new(
            std::any::type_name::<Self>(),
            InputShape::Function,
            Arc::new(factory),
        )
    }

    /// Builds a `GET` route answering with this redirect.
    #[must_use]
    pub fn route(self, path: impl Into<String>) -> Route {
        Route::from_result(path.into(), MethodFlag::GET, self.descriptor())
    }
}

impl Bindable for RedirectHandler {
    fn field(&self, _key: &str) -> Option<FieldRef<'_>> {
        None
    }

    fn set_field(&mut self, key: &str, _value: Value) -> Result<(), BindError> {
        Err(BindError::UnknownField(key.to_string()))
    }
}

impl RequestHandler for RedirectHandler {
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        _req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        w.set_header("location", &self.location);
        w.write_status(self.status);
        Box::pin(async { Err(ApiError::Hijacked) })
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

/// Fills a path template with parameter values.
///
/// Placeholders without a value are left as they are.
///
/// # Example
///
/// ```
/// use vertex_server::format_path;
///
/// let path = format_path("/users/{id}/posts/{post}", [("id", "42"), ("post", "7")]);
/// assert_eq!(path, "/users/42/posts/7");
/// ```
pub fn format_path<I, K, V>(template: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    params.into_iter().fold(template.to_string(), |path, (key, value)| {
        path.replace(&format!("{{{}}}", key.as_ref()), value.as_ref())
    })
}
