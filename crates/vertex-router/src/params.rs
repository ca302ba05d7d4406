//! Values captured from a matched path.
//!
//! A template such as `/users/{id}/files/*rest` captures one value per
//! `{name}` segment and, at most once and always last, the remainder of the
//! path for `*name`. The dispatcher copies every capture into the request's
//! form, where it overrides query and body values of the same name.

use smallvec::SmallVec;
use std::fmt;

/// How a value was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// A single `{name}` segment.
    Segment,
    /// The `*name` remainder, segments joined with `/`.
    CatchAll,
}

/// One captured path value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    name: String,
    value: String,
    capture: Capture,
}

impl PathParam {
    /// Name declared in the template.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw captured text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// How the value was captured.
    #[must_use]
    pub const fn capture(&self) -> Capture {
        self.capture
    }
}

/// Path values captured by a route match, in template order.
///
/// Templates rarely declare more than a few parameters, so they are kept
/// inline.
///
/// ```rust
/// use vertex_router::{MethodRouter, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router
///     .insert("/users/{id}/files/*rest", MethodRouter::new().get(()))
///     .unwrap();
///
/// let m = router.match_route(&Method::GET, "/users/7/files/a/b.txt").unwrap();
/// assert_eq!(m.params.get("id"), Some("7"));
/// assert_eq!(m.params.catch_all(), Some("a/b.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    captured: SmallVec<[PathParam; 4]>,
}

impl PathParams {
    /// An empty capture set, as produced by templates without parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_segment(&mut self, name: &str, value: &str) {
        self.push(name, value.to_string(), Capture::Segment);
    }

    pub(crate) fn push_catch_all(&mut self, name: &str, segments: &[&str]) {
        self.push(name, segments.join("/"), Capture::CatchAll);
    }

    fn push(&mut self, name: &str, value: String, capture: Capture) {
        self.captured.push(PathParam {
            name: name.to_string(),
            value,
            capture,
        });
    }

    /// Forgets captures made after a failed branch.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.captured.truncate(len);
    }

    /// Value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captured
            .iter()
            .find(|p| p.name == name)
            .map(PathParam::value)
    }

    /// The `*name` remainder, if the template ends in one.
    #[must_use]
    pub fn catch_all(&self) -> Option<&str> {
        self.captured
            .last()
            .filter(|p| p.capture == Capture::CatchAll)
            .map(PathParam::value)
    }

    /// Number of captured values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captured.len()
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captured.iter().map(|p| (p.name(), p.value()))
    }

    /// Every capture with its kind.
    #[must_use]
    pub fn as_slice(&self) -> &[PathParam] {
        &self.captured
    }
}

/// Collects `{name}` segment captures, for dispatching without a router.
impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push_segment(name.as_ref(), value.as_ref());
        }
        params
    }
}

impl fmt::Display for PathParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.captured.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match p.capture {
                Capture::Segment => write!(f, "{}={}", p.name, p.value)?,
                Capture::CatchAll => write!(f, "*{}={}", p.name, p.value)?,
            }
        }
        Ok(())
    }
}
