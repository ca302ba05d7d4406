//! The terminal chain element that binds, validates and invokes a handler.

use crate::middleware::{Middleware, Next};
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};
use vertex_schema::{bind, HandlerDescriptor};

/// Terminal middleware synthesized for every route.
///
/// For each request it allocates a fresh handler instance, binds request
/// values into it (skipped for function handlers), applies defaults and
/// validates, then calls the handler. It never calls `next`.
#[derive(Debug, Clone)]
pub struct BindAndInvoke {
    descriptor: HandlerDescriptor,
}

impl BindAndInvoke {
    /// Creates the terminal for a handler.
    #[must_use]
    pub const fn new(descriptor: HandlerDescriptor) -> Self {
        Self { descriptor }
    }

    /// Returns the handler descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }
}

impl Middleware for BindAndInvoke {
    fn name(&self) -> &'static str {
        "bind_and_invoke"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        _next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let mut handler = self.descriptor.instantiate();

            if !self.descriptor.is_function() {
                bind(handler.as_mut(), self.descriptor.params(), req).map_err(ApiError::from)?;
                self.descriptor
                    .validator()
                    .validate(handler.as_mut(), req)
                    .map_err(ApiError::from)?;
            }

            tracing::trace!(
                request_id = %req.request_id(),
                handler = self.descriptor.type_name(),
                "invoking handler"
            );
            handler.handle(w, req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Chain;
    use bytes::Bytes;
    use vertex_core::{ErrorKind, Reply};
    use vertex_schema::{
        handler_fn, BindError, Bindable, DescribeInput, FieldDecl, FieldRef, InputShape,
        RequestHandler, Value,
    };

    #[derive(Default)]
    struct Greet {
        name: String,
        times: Option<i64>,
    }

    impl Bindable for Greet {
        fn field(&self, key: &str) -> Option<FieldRef<'_>> {
            match key {
                "Name" => Some(FieldRef::from(&self.name)),
                "Times" => self.times.map(FieldRef::from),
                _ => None,
            }
        }

        fn set_field(&mut self, key: &str, value: Value) -> Result<(), BindError> {
            match key {
                "Name" => self.name = value.into_string()?,
                "Times" => self.times = Some(value.into_int()?),
                _ => return Err(BindError::UnknownField(key.to_string())),
            }
            Ok(())
        }
    }

    impl DescribeInput for Greet {
        fn input_shape() -> InputShape {
            InputShape::fields([
                FieldDecl::string("Name").rename("name").required().max_length(10),
                FieldDecl::int("Times").rename("times").default("1").min(1.0).max(3.0),
            ])
        }
    }

    impl RequestHandler for Greet {
        fn handle<'a>(
            &'a self,
            _w: &'a mut ResponseWriter,
            _req: &'a RequestContext,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async move {
                let times = usize::try_from(self.times.unwrap_or(1)).unwrap_or(1);
                Ok(Reply::text(format!("hi {}", self.name).repeat(times)))
            })
        }
    }

    fn chain() -> Chain {
        Chain::builder()
            .terminal(BindAndInvoke::new(HandlerDescriptor::of::<Greet>().unwrap()))
            .build()
    }

    async fn call(chain: &Chain, uri: &str) -> HandlerResult {
        let request = http::Request::builder()
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        let mut req = RequestContext::from_request(request, None);
        let mut w = ResponseWriter::new();
        chain.handle(&mut w, &mut req).await
    }

    #[tokio::test]
    async fn test_binds_defaults_and_invokes() {
        let chain = chain();
        assert_eq!(
            call(&chain, "/greet?name=bob").await.unwrap(),
            Reply::text("hi bob")
        );
        assert_eq!(
            call(&chain, "/greet?name=al&times=2").await.unwrap(),
            Reply::text("hi alhi al")
        );
    }

    #[tokio::test]
    async fn test_validation_failure_is_invalid_input() {
        let chain = chain();

        let err = call(&chain, "/greet").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "missing required param 'name'");
        assert_eq!(err.field(), Some("name"));

        let err = call(&chain, "/greet?name=bob&times=9").await.unwrap_err();
        assert_eq!(err.to_string(), "Value too large for times");

        let err = call(&chain, "/greet?name=bob&times=x").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid value 'x' for times");
    }

    #[tokio::test]
    async fn test_each_request_gets_fresh_instance() {
        let chain = chain();
        call(&chain, "/greet?name=first&times=3").await.unwrap();
        assert_eq!(
            call(&chain, "/greet?name=second").await.unwrap(),
            Reply::text("hi second")
        );
    }

    #[tokio::test]
    async fn test_function_handler_skips_binding() {
        let terminal = BindAndInvoke::new(handler_fn(|_w, req| {
            Box::pin(async move { Ok(Reply::text(req.form_value("q").to_string())) })
        }));
        assert!(terminal.descriptor().is_function());

        let chain = Chain::builder().terminal(terminal).build();
        assert_eq!(call(&chain, "/f?q=x").await.unwrap(), Reply::text("x"));
    }
}
