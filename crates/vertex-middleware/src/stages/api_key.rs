//! API key checks against a fixed key set.

use crate::middleware::{Middleware, Next};
use std::collections::HashSet;
use vertex_core::{ApiError, BoxFuture, HandlerResult, RequestContext, ResponseWriter};

/// Approves requests whose form carries a known API key.
#[derive(Debug, Clone)]
pub struct ApiKeyValidator {
    param_name: String,
    valid_keys: HashSet<String>,
}

impl ApiKeyValidator {
    /// Creates a validator reading `param_name` from the request form.
    #[must_use]
    pub fn new<I, S>(param_name: impl Into<String>, valid_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validator = Self {
            param_name: param_name.into(),
            valid_keys: HashSet::new(),
        };
        validator.add(valid_keys);
        validator
    }

    /// Adds more valid keys.
    pub fn add<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_keys.extend(keys.into_iter().map(Into::into));
    }

    fn check(&self, req: &RequestContext) -> Result<(), ApiError> {
        let key = req.form_value(&self.param_name);
        if self.valid_keys.contains(key) {
            Ok(())
        } else {
            Err(ApiError::unauthorized(format!(
                "missing or invalid api key '{key}'"
            )))
        }
    }
}

impl Middleware for ApiKeyValidator {
    fn name(&self) -> &'static str {
        "api_key"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if let Err(e) = self.check(req) {
            return Box::pin(async move { Err(e) });
        }
        next.run(w, req)
    }
}
