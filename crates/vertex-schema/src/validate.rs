//! Field validators and the per-handler request validator.
//!
//! A [`RequestValidator`] is built once per handler type from its
//! descriptors. For every request it fills defaults into unset optional
//! fields, then runs each field's validator in declaration order and stops
//! at the first violation.

use crate::descriptor::{Kind, Location, ParamDescriptor, Value};
use crate::error::ValidationError;
use crate::value::{Bindable, FieldRef};
use regex::Regex;
use std::fmt;
use tracing::{debug, error};
use vertex_core::RequestContext;

/// Returns `true` if the request carries the parameter at all, even empty.
pub(crate) fn is_present(param: &ParamDescriptor, ctx: &RequestContext) -> bool {
    match param.location() {
        Location::Header => ctx.headers().contains_key(param.name()),
        _ => ctx.form().has(param.name()),
    }
}

/// Returns the first raw value of the parameter, or `""`.
pub(crate) fn raw_value<'a>(param: &ParamDescriptor, ctx: &'a RequestContext) -> &'a str {
    match param.location() {
        Location::Header => ctx.header(param.name()).unwrap_or_default(),
        _ => ctx.form_value(param.name()),
    }
}

/// Validates a single handler field against its descriptor.
pub trait FieldValidator: Send + Sync + fmt::Debug {
    /// The descriptor this validator enforces.
    fn descriptor(&self) -> &ParamDescriptor;

    /// Checks the field's current value.
    ///
    /// `field` is `None` when the handler reports the field as unset.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    fn validate(&self, field: Option<FieldRef<'_>>, ctx: &RequestContext)
        -> Result<(), ValidationError>;

    /// The default to apply to an unset field. Required fields never have one.
    fn default_value(&self) -> Option<&Value> {
        self.descriptor().default_value()
    }

    /// Key of the handler field.
    fn struct_key(&self) -> &str {
        self.descriptor().struct_key()
    }

    /// Wire name of the parameter.
    fn param_name(&self) -> &str {
        self.descriptor().name()
    }

    /// Returns `true` if the parameter is not required.
    fn is_optional(&self) -> bool {
        !self.descriptor().required()
    }
}

/// Checks presence only. Other validators build on it.
#[derive(Debug, Clone)]
pub struct BaseValidator {
    descriptor: ParamDescriptor,
}

impl BaseValidator {
    /// Creates a presence validator.
    #[must_use]
    pub const fn new(descriptor: ParamDescriptor) -> Self {
        Self { descriptor }
    }

    /// Fails if the parameter is required and absent from the request or
    /// unset on the handler.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`].
    pub fn check_required(
        &self,
        field: Option<&FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        if self.descriptor.required() && (!is_present(&self.descriptor, ctx) || field.is_none()) {
            return Err(ValidationError::Missing {
                name: self.descriptor.name().to_string(),
            });
        }
        Ok(())
    }

    fn mismatch(&self) -> ValidationError {
        ValidationError::TypeMismatch {
            name: self.descriptor.name().to_string(),
            expected: self.descriptor.kind(),
        }
    }

    fn expect_kind(&self, field: &FieldRef<'_>, kind: Kind) -> Result<(), ValidationError> {
        if field.kind() == Some(kind) {
            Ok(())
        } else {
            Err(self.mismatch())
        }
    }
}

impl FieldValidator for BaseValidator {
    fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }

    fn validate(
        &self,
        field: Option<FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        self.check_required(field.as_ref(), ctx)
    }
}

/// Validates string length and pattern.
#[derive(Debug, Clone)]
pub struct StringValidator {
    base: BaseValidator,
    pattern: Option<Regex>,
}

impl StringValidator {
    /// Creates a string validator. An invalid pattern is logged and disabled.
    #[must_use]
    pub fn new(descriptor: ParamDescriptor) -> Self {
        let pattern = descriptor.pattern().and_then(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                error!(
                    param = %descriptor.name(),
                    pattern = p,
                    error = %e,
                    "invalid pattern, disabling pattern check"
                );
                None
            }
        });
        Self {
            base: BaseValidator::new(descriptor),
            pattern,
        }
    }
}

impl FieldValidator for StringValidator {
    fn descriptor(&self) -> &ParamDescriptor {
        &self.base.descriptor
    }

    fn validate(
        &self,
        field: Option<FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        self.base.check_required(field.as_ref(), ctx)?;
        let Some(field) = field else {
            return Ok(());
        };
        let FieldRef::Str(s) = field else {
            return Err(self.base.mismatch());
        };

        let d = self.descriptor();
        let len = s.chars().count();
        if d.max_length() > 0 && len > d.max_length() {
            return Err(ValidationError::TooLong {
                name: d.name().to_string(),
                max: d.max_length(),
            });
        }
        if d.min_length() > 0 && len < d.min_length() {
            return Err(ValidationError::TooShort {
                name: d.name().to_string(),
                min: d.min_length(),
            });
        }
        if let Some(re) = &self.pattern {
            if !re.is_match(s) {
                return Err(ValidationError::PatternMismatch {
                    name: d.name().to_string(),
                    pattern: re.as_str().to_string(),
                });
            }
        }
        Ok(())
    }
}

fn check_range(d: &ParamDescriptor, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::Malformed {
            name: d.name().to_string(),
            value: value.to_string(),
        });
    }
    if let Some(min) = d.min() {
        if value < min {
            return Err(ValidationError::TooSmall {
                name: d.name().to_string(),
                min,
            });
        }
    }
    if let Some(max) = d.max() {
        if value > max {
            return Err(ValidationError::TooLarge {
                name: d.name().to_string(),
                max,
            });
        }
    }
    Ok(())
}

/// Validates integer bounds. Integers are compared as floats.
#[derive(Debug, Clone)]
pub struct IntValidator {
    base: BaseValidator,
}

impl IntValidator {
    /// Creates an integer validator.
    #[must_use]
    pub const fn new(descriptor: ParamDescriptor) -> Self {
        Self {
            base: BaseValidator::new(descriptor),
        }
    }
}

impl FieldValidator for IntValidator {
    fn descriptor(&self) -> &ParamDescriptor {
        &self.base.descriptor
    }

    #[allow(clippy::cast_precision_loss)]
    fn validate(
        &self,
        field: Option<FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        self.base.check_required(field.as_ref(), ctx)?;
        match field {
            None => Ok(()),
            Some(FieldRef::Int(i)) => check_range(self.descriptor(), i as f64),
            Some(_) => Err(self.base.mismatch()),
        }
    }
}

/// Validates float bounds.
#[derive(Debug, Clone)]
pub struct FloatValidator {
    base: BaseValidator,
}

impl FloatValidator {
    /// Creates a float validator.
    #[must_use]
    pub const fn new(descriptor: ParamDescriptor) -> Self {
        Self {
            base: BaseValidator::new(descriptor),
        }
    }
}

impl FieldValidator for FloatValidator {
    fn descriptor(&self) -> &ParamDescriptor {
        &self.base.descriptor
    }

    fn validate(
        &self,
        field: Option<FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        self.base.check_required(field.as_ref(), ctx)?;
        match field {
            None => Ok(()),
            Some(FieldRef::Float(f)) => check_range(self.descriptor(), f),
            Some(_) => Err(self.base.mismatch()),
        }
    }
}

/// Checks presence and kind for booleans and lists.
#[derive(Debug, Clone)]
pub struct KindValidator {
    base: BaseValidator,
}

impl KindValidator {
    /// Creates a kind-checking validator.
    #[must_use]
    pub const fn new(descriptor: ParamDescriptor) -> Self {
        Self {
            base: BaseValidator::new(descriptor),
        }
    }
}

impl FieldValidator for KindValidator {
    fn descriptor(&self) -> &ParamDescriptor {
        &self.base.descriptor
    }

    fn validate(
        &self,
        field: Option<FieldRef<'_>>,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        self.base.check_required(field.as_ref(), ctx)?;
        match field {
            None => Ok(()),
            Some(f) => self.base.expect_kind(&f, self.descriptor().kind()),
        }
    }
}

/// Builds the validator matching a descriptor's kind.
#[must_use]
pub fn new_validator(descriptor: ParamDescriptor) -> Box<dyn FieldValidator> {
    match descriptor.kind() {
        Kind::String => Box::new(StringValidator::new(descriptor)),
        Kind::Int => Box::new(IntValidator::new(descriptor)),
        Kind::Float => Box::new(FloatValidator::new(descriptor)),
        Kind::Bool | Kind::StringList => Box::new(KindValidator::new(descriptor)),
        Kind::Custom => Box::new(BaseValidator::new(descriptor)),
    }
}

/// Validates whole requests for one handler type.
#[derive(Debug)]
pub struct RequestValidator {
    validators: Vec<Box<dyn FieldValidator>>,
}

impl RequestValidator {
    /// Builds validators for every descriptor.
    #[must_use]
    pub fn new(params: &[ParamDescriptor]) -> Self {
        Self {
            validators: params.iter().cloned().map(new_validator).collect(),
        }
    }

    /// Number of field validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if there is nothing to validate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Applies defaults and validates a bound handler instance.
    ///
    /// A default is written when the parameter is optional and either the
    /// field is unset or the request has no non-empty value for it.
    ///
    /// # Errors
    ///
    /// Returns the first violation, in declaration order.
    pub fn validate<B: Bindable + ?Sized>(
        &self,
        instance: &mut B,
        ctx: &RequestContext,
    ) -> Result<(), ValidationError> {
        for v in &self.validators {
            if v.is_optional() {
                let unset = instance.field(v.struct_key()).is_none();
                if unset || raw_value(v.descriptor(), ctx).is_empty() {
                    if let Some(default) = v.default_value() {
                        debug!(
                            param = %v.param_name(),
                            default = ?default,
                            "applying default value"
                        );
                        instance
                            .set_field(v.struct_key(), default.clone())
                            .map_err(|source| ValidationError::Bind {
                                name: v.param_name().to_string(),
                                source,
                            })?;
                    }
                }
            }

            if let Err(e) = v.validate(instance.field(v.struct_key()), ctx) {
                error!(
                    request_id = %ctx.request_id(),
                    param = %v.param_name(),
                    error = %e,
                    "request validation failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
