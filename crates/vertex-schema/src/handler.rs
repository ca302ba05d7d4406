//! Request handler traits and the registration-time handler descriptor.

use crate::descriptor::{ParamDescriptor, Value};
use crate::error::{BindError, SchemaError};
use crate::extract::extract;
use crate::shape::InputShape;
use crate::validate::RequestValidator;
use crate::value::{Bindable, FieldRef};
use std::fmt;
use std::sync::Arc;
use vertex_core::{BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// A request handler.
///
/// A fresh instance is created for every request, bound from the request's
/// values, validated and then invoked.
pub trait RequestHandler: Bindable + Send + Sync + 'static {
    /// Handles one request.
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// Declares the input shape of a handler type.
pub trait DescribeInput {
    /// Returns the handler's declared fields.
    fn input_shape() -> InputShape;
}

/// Creates fresh handler instances.
pub type Factory = Arc<dyn Fn() -> Box<dyn RequestHandler> + Send + Sync>;

type HandlerFn = dyn for<'a> Fn(&'a mut ResponseWriter, &'a RequestContext) -> BoxFuture<'a, HandlerResult>
    + Send
    + Sync;

/// Everything the framework knows about a handler type.
///
/// Built once at registration. Holds the extracted parameters, the request
/// validator and a factory for fresh instances.
#[derive(Clone)]
pub struct HandlerDescriptor {
    type_name: &'static str,
    shape: InputShape,
    params: Arc<[ParamDescriptor]>,
    validator: Arc<RequestValidator>,
    factory: Factory,
}

impl HandlerDescriptor {
    /// Describes a struct handler type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the declared shape is unsupported.
    pub fn of<H>() -> Result<Self, SchemaError>
    where
        H: RequestHandler + DescribeInput + Default,
    {
        Self::new(
            std::any::type_name::<H>(),
            H::input_shape(),
            Arc::new(|| Box::new(H::default()) as Box<dyn RequestHandler>),
        )
    }

    /// Describes a handler from an explicit shape and instance factory.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the shape is unsupported.
    pub fn new(
        type_name: &'static str,
        shape: InputShape,
        factory: Factory,
    ) -> Result<Self, SchemaError> {
        let params = extract(&shape)?;
        let validator = RequestValidator::new(&params);
        Ok(Self {
            type_name,
            shape,
            params: params.into(),
            validator: Arc::new(validator),
            factory,
        })
    }

    /// Returns the handler type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the declared input shape.
    #[must_use]
    pub const fn shape(&self) -> &InputShape {
        &self.shape
    }

    /// Returns `true` for plain function handlers, which skip binding.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        self.shape.is_function()
    }

    /// Returns the extracted parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Returns the request validator.
    #[must_use]
    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    /// Creates a fresh handler instance.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn RequestHandler> {
        (self.factory)()
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("type_name", &self.type_name)
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}

/// A plain function handler. It has no fields to bind.
#[derive(Clone)]
pub struct FnHandler {
    f: Arc<HandlerFn>,
}

impl Bindable for FnHandler {
    fn field(&self, _key: &str) -> Option<FieldRef<'_>> {
        None
    }

    fn set_field(&mut self, key: &str, _value: Value) -> Result<(), BindError> {
        Err(BindError::UnknownField(key.to_string()))
    }
}

impl RequestHandler for FnHandler {
    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a RequestContext,
    ) -> BoxFuture<'a, HandlerResult> {
        (self.f)(w, req)
    }
}

/// Describes a plain function handler.
///
/// # Example
///
/// ```
/// use vertex_core::Reply;
/// use vertex_schema::handler_fn;
///
/// let handler = handler_fn(|_w, req| {
///     Box::pin(async move { Ok(Reply::text(req.path().to_string())) })
/// });
/// assert!(handler.is_function());
/// ```
#[must_use]
pub fn handler_fn<F>(f: F) -> HandlerDescriptor
where
    F: for<'a> Fn(&'a mut ResponseWriter, &'a RequestContext) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync
        + 'static,
{
    let handler = FnHandler { f: Arc::new(f) };
    HandlerDescriptor {
        type_name: std::any::type_name::<F>(),
        shape: InputShape::Function,
        params: Arc::from(Vec::new()),
        validator: Arc::new(RequestValidator::new(&[])),
        factory: Arc::new(move || Box::new(handler.clone()) as Box<dyn RequestHandler>),
    }
}
