//! Route patterns and the segment matcher.
//!
//! A pattern such as `/api/v1/query/:query` is kept as the ordered list of its `/`-separated
//! segments. Splitting is exact: empty segments are preserved, so the leading slash produces
//! an empty first segment and a trailing slash produces an empty last one. A path only ever
//! matches a pattern with the same number of segments.

use crate::PathParams;
use std::fmt;

const PARAM_MARKER: char = ':';
const SEGMENT_SEPARATOR: char = '/';

/// One `/`-separated piece of a [`RoutePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment at the same index.
    Literal(String),
    /// Binds the path segment at the same index to the contained name.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix(PARAM_MARKER) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    #[inline]
    pub fn is_param(&self) -> bool {
        matches!(self, Segment::Param(_))
    }
}

/// An immutable route template made of literal and named-parameter segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a pattern string. Every segment starting with `:` is a parameter.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw.split(SEGMENT_SEPARATOR).map(Segment::parse).collect();
        Self { raw, segments }
    }

    /// The pattern exactly as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Checks this pattern against already split path segments.
    ///
    /// Literal segments are compared index by index and the first mismatch rejects the
    /// pattern. Parameter segments are never compared; a parameter only confirms the match
    /// when it is the final segment, otherwise the decision is left to the segments after it.
    fn matches_segments(&self, path_segments: &[&str]) -> bool {
        if self.segments.len() != path_segments.len() {
            return false;
        }

        let last = self.segments.len() - 1;
        for (index, segment) in self.segments.iter().enumerate() {
            let is_last = index == last;
            match segment {
                Segment::Param(_) if is_last => return true,
                Segment::Param(_) => continue,
                Segment::Literal(literal) if literal != path_segments[index] => return false,
                Segment::Literal(_) if is_last => return true,
                Segment::Literal(_) => {}
            }
        }

        false
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for RoutePattern {
    fn from(raw: &str) -> Self {
        RoutePattern::parse(raw)
    }
}

/// Drops the query string, if any.
#[inline]
fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _query)| path)
}

fn split_path(url: &str) -> Vec<&str> {
    strip_query(url).split(SEGMENT_SEPARATOR).collect()
}

/// Returns the first pattern, in iteration order, that structurally matches `url`.
///
/// `url` may carry a query string, it is ignored. Patterns whose segment count differs from
/// the path's are skipped without inspection. When several patterns share a shape the first
/// one wins, there is no specificity ranking.
pub fn find_matching_route<'p, I>(url: &str, patterns: I) -> Option<&'p RoutePattern>
where
    I: IntoIterator<Item = &'p RoutePattern>,
{
    let path_segments = split_path(url);
    patterns.into_iter().find(|pattern| pattern.matches_segments(&path_segments))
}

/// Binds every parameter segment of `pattern` to the path segment at the same index.
///
/// Values are returned raw, percent-encoding included. `pattern` is expected to have been
/// selected by [`find_matching_route`] for this `url`; a path that is shorter than the
/// pattern simply leaves the missing parameters unbound.
pub fn extract_route_params(url: &str, pattern: &RoutePattern) -> PathParams {
    let path_segments = split_path(url);

    pattern
        .segments()
        .iter()
        .zip(path_segments)
        .filter_map(|(segment, value)| match segment {
            Segment::Param(name) => Some((name.clone(), value.to_string())),
            Segment::Literal(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RoutePattern, Segment, extract_route_params, find_matching_route};

    const READ_ROUTE: &str = "/comp4537/lab5/api/v1/query/:query";
    const WRITE_ROUTE: &str = "/comp4537/lab5/api/v1/query";

    fn patterns(raw: &[&str]) -> Vec<RoutePattern> {
        raw.iter().map(|r| RoutePattern::parse(*r)).collect()
    }

    #[test]
    fn test_parse_segments() {
        let pattern = RoutePattern::parse("/users/:id");
        assert_eq!(
            pattern.segments(),
            &[Segment::Literal(String::new()), Segment::Literal("users".into()), Segment::Param("id".into())]
        );
        assert_eq!(pattern.as_str(), "/users/:id");
        assert_eq!(pattern.to_string(), "/users/:id");
    }

    #[test]
    fn test_trailing_param_matches() {
        let routes = patterns(&[READ_ROUTE]);
        let matched = find_matching_route("/comp4537/lab5/api/v1/query/SELECT%201", &routes);
        assert_eq!(matched.map(RoutePattern::as_str), Some(READ_ROUTE));
    }

    #[test]
    fn test_literal_route_matches() {
        let routes = patterns(&[READ_ROUTE, WRITE_ROUTE]);
        let matched = find_matching_route(WRITE_ROUTE, &routes);
        assert_eq!(matched.map(RoutePattern::as_str), Some(WRITE_ROUTE));
    }

    #[test]
    fn test_query_string_is_ignored() {
        let routes = patterns(&[WRITE_ROUTE]);
        let matched = find_matching_route("/comp4537/lab5/api/v1/query?debug=1&x=2", &routes);
        assert_eq!(matched.map(RoutePattern::as_str), Some(WRITE_ROUTE));
    }

    #[test]
    fn test_segment_count_must_be_equal() {
        let routes = patterns(&[READ_ROUTE]);
        assert!(find_matching_route("/comp4537/lab5/api/v1/query", &routes).is_none());
        assert!(find_matching_route("/comp4537/lab5/api/v1/query/a/b", &routes).is_none());
        // a trailing slash adds an empty segment
        assert!(find_matching_route("/comp4537/lab5/api/v1/query/", &routes).is_some());
        assert!(find_matching_route("/comp4537/lab5/api/v1/query/", &patterns(&[WRITE_ROUTE])).is_none());
    }

    #[test]
    fn test_literal_mismatch_rejects_despite_trailing_param() {
        let routes = patterns(&[READ_ROUTE]);
        assert!(find_matching_route("/comp4537/lab6/api/v1/query/SELECT", &routes).is_none());
        assert!(find_matching_route("/other/lab5/api/v1/query/SELECT", &routes).is_none());
    }

    #[test]
    fn test_interior_param_is_skipped() {
        let routes = patterns(&["/users/:id/posts"]);
        assert!(find_matching_route("/users/42/posts", &routes).is_some());
        assert!(find_matching_route("/users/42/comments", &routes).is_none());

        let routes = patterns(&["/users/:id/:post"]);
        assert!(find_matching_route("/users/42/7", &routes).is_some());
    }

    #[test]
    fn test_first_registered_wins() {
        let routes = patterns(&["/items/:a", "/items/:b", "/items/special"]);
        let matched = find_matching_route("/items/special", &routes);
        assert_eq!(matched.map(RoutePattern::as_str), Some("/items/:a"));
    }

    #[test]
    fn test_no_patterns() {
        let routes: Vec<RoutePattern> = vec![];
        assert!(find_matching_route("/", &routes).is_none());
    }

    #[test]
    fn test_extract_trailing_param() {
        let pattern = RoutePattern::parse(READ_ROUTE);
        let params = extract_route_params("/comp4537/lab5/api/v1/query/SELECT%20*%20FROM%20patient", &pattern);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("query"), Some("SELECT%20*%20FROM%20patient"));
    }

    #[test]
    fn test_extract_ignores_query_string() {
        let pattern = RoutePattern::parse("/users/:id");
        let params = extract_route_params("/users/42?verbose=true", &pattern);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_extract_multiple_params() {
        let pattern = RoutePattern::parse("/users/:user/posts/:post");
        let params = extract_route_params("/users/alice/posts/9", &pattern);
        assert_eq!(params.get("user"), Some("alice"));
        assert_eq!(params.get("post"), Some("9"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_extract_without_params() {
        let pattern = RoutePattern::parse(WRITE_ROUTE);
        assert!(extract_route_params(WRITE_ROUTE, &pattern).is_empty());
    }
}
