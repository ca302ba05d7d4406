//! Segment tree node implementation.
//!
//! Each node owns one path segment. Static children are kept sorted for
//! binary search; a node has at most one parameter child and one wildcard
//! child.

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::PathParams;

/// Type of path segment in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "users", "api")
    Static,
    /// Named parameter (e.g., "{id}", "{userId}")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the segment tree.
///
/// Nodes at route boundaries carry a [`MethodRouter`].
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static, param, or wildcard)
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter<T>>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node<T>>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node<T>>>,

    /// Wildcard child (at most one per node, must be leaf)
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a new static node.
    #[must_use]
    pub fn new_static(segment: impl Into<String>) -> Self {
        Self::with_kind(segment.into(), SegmentKind::Static)
    }

    /// Creates a new parameter node.
    #[must_use]
    pub fn new_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(format!("{{{name}}}"), SegmentKind::Param(name))
    }

    /// Creates a new wildcard node.
    #[must_use]
    pub fn new_wildcard(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(format!("*{name}"), SegmentKind::Wildcard(name))
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new_static("")
    }

    /// Inserts a route into the tree.
    ///
    /// # Errors
    ///
    /// Fails when the template is malformed, when a method is already
    /// registered for the same template, or when a parameter at the same
    /// position was registered under another name.
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        let segments = parse_path(path)?;
        self.insert_segments(path, &segments, methods)
    }

    fn insert_segments(
        &mut self,
        path: &str,
        segments: &[(String, SegmentKind)],
        methods: MethodRouter<T>,
    ) -> Result<(), RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self.attach(path, methods);
        };

        match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(i) => i,
                    Err(i) => {
                        self.static_children.insert(i, Node::new_static(segment.clone()));
                        i
                    }
                };
                self.static_children[index].insert_segments(path, remaining, methods)
            }
            SegmentKind::Param(name) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Node::new_param(name.clone())));
                if let SegmentKind::Param(existing) = &child.kind {
                    if existing != name {
                        return Err(RouteError::ParamNameMismatch {
                            path: path.to_string(),
                            existing: existing.clone(),
                            new: name.clone(),
                        });
                    }
                }
                child.insert_segments(path, remaining, methods)
            }
            SegmentKind::Wildcard(name) => {
                let child = self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Node::new_wildcard(name.clone())));
                child.attach(path, methods)
            }
        }
    }

    fn attach(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        match &mut self.methods {
            Some(existing) => existing.merge(methods).map_err(|method| RouteError::Conflict {
                method,
                path: path.to_string(),
            }),
            None => {
                self.methods = Some(methods);
                Ok(())
            }
        }
    }

    /// Matches a path against the tree.
    ///
    /// Returns the method router and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, PathParams)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = PathParams::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments(&self, segments: &[&str], params: &mut PathParams) -> Option<&MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        // Static first, then parameter, then wildcard.
        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push_segment(name, segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                params.push_catch_all(name, segments);
                return child.methods.as_ref();
            }
        }

        None
    }

    /// Finds a static child by segment using binary search.
    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Parses a template into segments.
pub(crate) fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, s) in raw.iter().enumerate() {
        let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if name.is_empty() || name.contains(['{', '}']) {
                return Err(malformed(path, s));
            }
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = s.strip_prefix('*') {
            if i + 1 != raw.len() {
                return Err(RouteError::WildcardNotLast {
                    path: path.to_string(),
                });
            }
            SegmentKind::Wildcard(name.to_string())
        } else if s.contains(['{', '}']) {
            return Err(malformed(path, s));
        } else {
            SegmentKind::Static
        };
        segments.push(((*s).to_string(), kind));
    }
    Ok(segments)
}

fn malformed(path: &str, segment: &str) -> RouteError {
    RouteError::MalformedSegment {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn value<'a>(root: &'a Node<&'static str>, method: &Method, path: &str) -> Option<(&'a str, PathParams)> {
        let (methods, params) = root.match_path(path)?;
        methods.get_value(method).map(|v| (*v, params))
    }

    #[test]
    fn test_node_constructors() {
        let node = Node::<()>::new_param("id");
        assert_eq!(node.segment, "{id}");
        assert_eq!(node.kind, SegmentKind::Param("id".to_string()));

        let node = Node::<()>::new_wildcard("path");
        assert_eq!(node.segment, "*path");
    }

    #[test]
    fn test_parse_path_param() {
        let segments = parse_path("/users/{id}").unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], ("users".to_string(), SegmentKind::Static));
        assert_eq!(
            segments[1],
            ("{id}".to_string(), SegmentKind::Param("id".to_string()))
        );
    }

    #[test]
    fn test_parse_path_rejects_bad_templates() {
        assert!(matches!(
            parse_path("/files/*rest/more"),
            Err(RouteError::WildcardNotLast { .. })
        ));
        assert!(matches!(
            parse_path("/users/{id"),
            Err(RouteError::MalformedSegment { .. })
        ));
        assert!(matches!(
            parse_path("/users/{}"),
            Err(RouteError::MalformedSegment { .. })
        ));
    }

    #[test]
    fn test_insert_and_match_param() {
        let mut root = Node::root();
        root.insert("/users/{id}", MethodRouter::new().get("getUser")).unwrap();

        let (v, params) = value(&root, &Method::GET, "/users/123").unwrap();
        assert_eq!(v, "getUser");
        assert_eq!(params.get("id"), Some("123"));
    }

    #[test]
    fn test_insert_and_match_wildcard() {
        let mut root = Node::root();
        root.insert("/files/*path", MethodRouter::new().get("serveFile")).unwrap();

        let (_, params) = value(&root, &Method::GET, "/files/images/logo.png").unwrap();
        assert_eq!(params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/users/me", MethodRouter::new().get("me")).unwrap();
        root.insert("/users/{id}", MethodRouter::new().get("one")).unwrap();

        assert_eq!(value(&root, &Method::GET, "/users/me").unwrap().0, "me");
        assert_eq!(value(&root, &Method::GET, "/users/7").unwrap().0, "one");
    }

    #[test]
    fn test_backtracking_drops_stale_params() {
        let mut root = Node::root();
        root.insert("/a/{x}/b", MethodRouter::new().get("xb")).unwrap();
        root.insert("/a/*rest", MethodRouter::new().get("rest")).unwrap();

        let (v, params) = value(&root, &Method::GET, "/a/1/c").unwrap();
        assert_eq!(v, "rest");
        assert_eq!(params.get("x"), None);
        assert_eq!(params.get("rest"), Some("1/c"));
    }

    #[test]
    fn test_duplicate_method_conflicts() {
        let mut root = Node::root();
        root.insert("/users", MethodRouter::new().get("a")).unwrap();
        root.insert("/users", MethodRouter::new().post("b")).unwrap();

        let err = root.insert("/users/", MethodRouter::new().get("c")).unwrap_err();
        assert_eq!(
            err,
            RouteError::Conflict {
                method: Method::GET,
                path: "/users/".to_string()
            }
        );
    }

    #[test]
    fn test_param_name_mismatch() {
        let mut root = Node::root();
        root.insert("/users/{id}", MethodRouter::new().get("a")).unwrap();
        let err = root
            .insert("/users/{name}/posts", MethodRouter::new().get("b"))
            .unwrap_err();
        assert!(matches!(err, RouteError::ParamNameMismatch { ref existing, .. } if existing == "id"));
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        root.insert("/users", MethodRouter::new().get("list")).unwrap();
        assert!(root.match_path("/posts").is_none());
        assert!(root.match_path("/users/1").is_none());
    }
}
