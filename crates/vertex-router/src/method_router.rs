//! HTTP method-based routing.
//!
//! This module provides [`MethodRouter`] which maps HTTP methods to route
//! values for a single path template.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to route values for a single path.
///
/// # Example
///
/// ```rust
/// use vertex_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new()
///     .get(0usize)
///     .post(1);
///
/// assert_eq!(router.get_value(&Method::GET), Some(&0));
/// assert_eq!(router.get_value(&Method::POST), Some(&1));
/// assert_eq!(router.get_value(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET value.
    #[must_use]
    pub fn get(self, value: T) -> Self {
        self.method(Method::GET, value)
    }

    /// Registers a POST value.
    #[must_use]
    pub fn post(self, value: T) -> Self {
        self.method(Method::POST, value)
    }

    /// Registers a PUT value.
    #[must_use]
    pub fn put(self, value: T) -> Self {
        self.method(Method::PUT, value)
    }

    /// Registers a DELETE value.
    #[must_use]
    pub fn delete(self, value: T) -> Self {
        self.method(Method::DELETE, value)
    }

    /// Registers a value for any method, replacing an existing one.
    #[must_use]
    pub fn method(mut self, method: Method, value: T) -> Self {
        self.set(method, value);
        self
    }

    /// Sets the value for a method and returns the one it replaced.
    pub fn set(&mut self, method: Method, value: T) -> Option<T> {
        if let Some(slot) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((method, value));
        None
    }

    /// Returns the value registered for a method.
    #[must_use]
    pub fn get_value(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the method has a value.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.entries.iter().any(|(m, _)| m == method)
    }

    /// Moves every method of `other` into this router.
    ///
    /// Methods already present are kept; the first one that collides is
    /// returned as an error and nothing after it is merged.
    pub fn merge(&mut self, other: MethodRouter<T>) -> Result<(), Method> {
        for (method, value) in other.entries {
            if self.contains(&method) {
                return Err(method);
            }
            self.entries.push((method, value));
        }
        Ok(())
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the allowed methods in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Iterates over `(method, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> {
        self.entries.iter().map(|(m, v)| (m, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_new() {
        let router = MethodRouter::<usize>::new();
        assert!(!router.has_any_method());
    }

    #[test]
    fn test_method_router_each_verb() {
        let router = MethodRouter::new().get(1).post(2).put(3).delete(4);

        assert_eq!(router.get_value(&Method::GET), Some(&1));
        assert_eq!(router.get_value(&Method::POST), Some(&2));
        assert_eq!(router.get_value(&Method::PUT), Some(&3));
        assert_eq!(router.get_value(&Method::DELETE), Some(&4));
        assert_eq!(router.get_value(&Method::PATCH), None);
    }

    #[test]
    fn test_method_router_generic() {
        let router = MethodRouter::new().method(Method::PATCH, "patch");
        assert_eq!(router.get_value(&Method::PATCH), Some(&"patch"));
    }

    #[test]
    fn test_method_router_set_replaces() {
        let mut router = MethodRouter::new().get(1);
        assert_eq!(router.set(Method::GET, 2), Some(1));
        assert_eq!(router.get_value(&Method::GET), Some(&2));
        assert_eq!(router.allowed_methods(), vec![Method::GET]);
    }

    #[test]
    fn test_method_router_allowed_methods() {
        let router = MethodRouter::new().get(0).post(1).delete(2);

        let allowed = router.allowed_methods();
        assert_eq!(allowed, vec![Method::GET, Method::POST, Method::DELETE]);
        assert!(!allowed.contains(&Method::PUT));
    }

    #[test]
    fn test_method_router_merge_adds_methods() {
        let mut router = MethodRouter::new().get("list");
        router.merge(MethodRouter::new().post("create")).unwrap();

        assert_eq!(router.get_value(&Method::GET), Some(&"list"));
        assert_eq!(router.get_value(&Method::POST), Some(&"create"));
    }

    #[test]
    fn test_method_router_merge_reports_collision() {
        let mut router = MethodRouter::new().get("original");
        let err = router
            .merge(MethodRouter::new().get("other").post("create"))
            .unwrap_err();

        assert_eq!(err, Method::GET);
        assert_eq!(router.get_value(&Method::GET), Some(&"original"));
        assert!(!router.contains(&Method::POST));
    }
}
