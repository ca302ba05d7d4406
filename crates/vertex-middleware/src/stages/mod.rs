//! Ready-made middleware.
//!
//! | Middleware | Purpose |
//! |------------|---------|
//! | [`AutoRecover`] | Turn panics into general failures |
//! | [`RequestLogger`] | Log each request and its outcome |
//! | [`Cors`] | Write CORS headers |
//! | [`ApiKeyValidator`] | Require a known API key |
//! | [`BasicAuth`] | Require HTTP basic auth credentials |
//! | [`CacheMiddleware`] | Cache successful results |
//! | [`ConnectionLimiter`] | Cap concurrent requests |
//! | [`ForceSecure`] | Reject insecure requests |
//! | [`IpRangeFilter`] | Allow or deny by remote IP |
//! | [`Instrumentation`] | Record timing and success metrics |

pub mod api_key;
pub mod basic_auth;
pub mod cache;
pub mod cors;
pub mod instrumentation;
pub mod ip_filter;
pub mod limiter;
pub mod logger;
pub mod recover;
pub mod secure;

pub use api_key::ApiKeyValidator;
pub use basic_auth::BasicAuth;
pub use cache::CacheMiddleware;
pub use cors::Cors;
pub use instrumentation::Instrumentation;
pub use ip_filter::IpRangeFilter;
pub use limiter::ConnectionLimiter;
pub use logger::RequestLogger;
pub use recover::AutoRecover;
pub use secure::ForceSecure;

use crate::chain::BoxedMiddleware;
use std::sync::Arc;

/// The middleware most APIs start with: panic recovery, request logging and
/// the default CORS policy.
#[must_use]
pub fn default_middleware() -> Vec<BoxedMiddleware> {
    vec![
        Arc::new(AutoRecover),
        Arc::new(RequestLogger),
        Arc::new(Cors::new().default_policy()),
    ]
}
