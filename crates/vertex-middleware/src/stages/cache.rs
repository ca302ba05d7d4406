//! Response caching keyed by method, path and form values.

use crate::middleware::{Middleware, Next};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;
use vertex_core::{BoxFuture, HandlerResult, Reply, RequestContext, ResponseWriter};

#[derive(Debug, Clone)]
struct Entry {
    value: Reply,
    expires_at: Instant,
}

/// Caches successful handler results in an LRU with a TTL.
///
/// The key is the method, the URL path and the encoded form (query, body and
/// path params). Headers are not part of the key. A request carrying
/// `Cache-Control: no-cache` bypasses the cache.
#[derive(Debug)]
pub struct CacheMiddleware {
    cache: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl CacheMiddleware {
    /// Creates a cache holding at most `max_items` results for `ttl` each.
    #[must_use]
    pub fn new(max_items: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_items).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn request_key(req: &RequestContext) -> String {
        format!("{}/{}::{}", req.method(), req.path(), req.form().encode())
    }

    fn get(&self, key: &str) -> Option<Reply> {
        let mut cache = self.cache.lock();
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: String, value: Reply) {
        self.cache.lock().put(
            key,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Number of cached entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn bypasses_cache(req: &RequestContext) -> bool {
    req.header("cache-control")
        .is_some_and(|v| v.eq_ignore_ascii_case("no-cache"))
}

impl Middleware for CacheMiddleware {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn handle<'a>(
        &'a self,
        w: &'a mut ResponseWriter,
        req: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        if bypasses_cache(req) {
            return next.run(w, req);
        }

        let key = Self::request_key(req);
        debug!(key = %key, "cache lookup");
        if let Some(value) = self.get(&key) {
            debug!(key = %key, "serving cached response");
            return Box::pin(async move { Ok(value) });
        }

        Box::pin(async move {
            let result = next.run(w, req).await;
            if let Ok(value) = &result {
                self.put(key, value.clone());
            }
            result
        })
    }
}
