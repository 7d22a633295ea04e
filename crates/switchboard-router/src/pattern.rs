//! Route-pattern compilation and matching.
//!
//! Two grammars share one template syntax:
//!
//! - *terminal* patterns match the entire remaining path, anchored at
//!   both ends, case-insensitively. `{name}` captures one path segment
//!   (no `/` or `?`); the reserved `{queryString}` optionally captures
//!   everything after the first `?`. A trailing `/` is required at the
//!   end of the matched text — the dispatcher normalizes incoming paths
//!   to end with `/` before any matching happens.
//! - *prefix* patterns match a literal at the start of the input without
//!   consuming it; the caller strips the literal. A prefix only matches
//!   when what remains still ends in `/`, i.e. the prefix is a strict
//!   ancestor of a deeper path, never the whole of it.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use switchboard_core::QUERY_STRING_PARAM;

/// `{name}` tokens in a route template.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("token pattern is valid"));

/// Which grammar a template compiles under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Matches the entire remaining path; owned by terminal handlers.
    Terminal,
    /// Matches (and is stripped as) a literal prefix; owned by routers.
    Prefix,
}

/// Failure to compile a route template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The template did not produce a valid matcher.
    #[error("invalid route template `{template}`: {source}")]
    Invalid {
        /// The offending template.
        template: String,
        /// The underlying matcher error.
        source: regex::Error,
    },
}

/// A compiled, immutable route pattern.
///
/// For terminal patterns, capture index `i` always corresponds to the
/// parameter name at index `i` — template order is the only ordering
/// contract.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    kind: PatternKind,
    matcher: Option<Regex>,
    parameter_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a template under the given grammar.
    ///
    /// # Errors
    ///
    /// [`PatternError::Invalid`] when the template cannot be turned into
    /// a matcher.
    pub fn compile(template: &str, kind: PatternKind) -> Result<Self, PatternError> {
        match kind {
            PatternKind::Prefix => Ok(Self {
                template: template.to_string(),
                kind,
                matcher: None,
                parameter_names: Vec::new(),
            }),
            PatternKind::Terminal => {
                let mut names = Vec::new();
                let source = if template == "/" {
                    String::from("(?i)^/$")
                } else {
                    let mut built = String::from("(?i)^");
                    let mut last = 0;
                    for caps in TOKEN.captures_iter(template) {
                        let token = caps.get(0).expect("token match");
                        let name = &caps[1];
                        built.push_str(&regex::escape(&template[last..token.start()]));
                        if name == QUERY_STRING_PARAM {
                            built.push_str(r"(?:\?(.+))?");
                        } else {
                            built.push_str("([^?/]+)");
                        }
                        names.push(name.to_string());
                        last = token.end();
                    }
                    built.push_str(&regex::escape(&template[last..]));
                    built.push_str("/$");
                    built
                };
                let matcher = Regex::new(&source).map_err(|source| PatternError::Invalid {
                    template: template.to_string(),
                    source,
                })?;
                Ok(Self {
                    template: template.to_string(),
                    kind,
                    matcher: Some(matcher),
                    parameter_names: names,
                })
            }
        }
    }

    /// The original template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The grammar this pattern was compiled under.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Parameter names in template order.
    #[must_use]
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Whether this pattern matches `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            PatternKind::Terminal => self
                .matcher
                .as_ref()
                .is_some_and(|matcher| matcher.is_match(path)),
            PatternKind::Prefix => self.strip_prefix(path).is_some(),
        }
    }

    /// Strip this prefix from `path`, returning the remainder.
    ///
    /// The root `"/"` prefix always matches and strips zero characters.
    /// Returns `None` for terminal patterns and for non-matching paths.
    #[must_use]
    pub fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.kind != PatternKind::Prefix {
            return None;
        }
        if self.template == "/" {
            return path.ends_with('/').then_some(path);
        }
        let head = path.get(..self.template.len())?;
        if !head.eq_ignore_ascii_case(&self.template) {
            return None;
        }
        let rest = &path[self.template.len()..];
        (!rest.is_empty() && rest.ends_with('/')).then_some(rest)
    }

    /// Extract named captures from `path` (terminal patterns only).
    ///
    /// Returns `None` when the path does not match. Captures that did
    /// not participate (an absent `{queryString}`) are omitted.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let matcher = self.matcher.as_ref()?;
        let caps = matcher.captures(path)?;
        let mut out = Vec::with_capacity(self.parameter_names.len());
        for (index, name) in self.parameter_names.iter().enumerate() {
            if let Some(group) = caps.get(index + 1) {
                out.push((name.clone(), group.as_str().to_string()));
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(template: &str) -> RoutePattern {
        RoutePattern::compile(template, PatternKind::Terminal).unwrap()
    }

    fn prefix(template: &str) -> RoutePattern {
        RoutePattern::compile(template, PatternKind::Prefix).unwrap()
    }

    #[test]
    fn plain_terminal_matches_exactly_one_path() {
        let pattern = terminal("/x");
        assert!(pattern.matches("/x/"));
        assert!(pattern.matches("/X/"));
        assert!(!pattern.matches("/x"));
        assert!(!pattern.matches("/x/y/"));
        assert!(!pattern.matches("/xx/"));
        assert!(pattern.parameter_names().is_empty());
    }

    #[test]
    fn root_terminal_matches_only_the_slash() {
        let pattern = terminal("/");
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("//"));
        assert!(!pattern.matches("/a/"));
    }

    #[test]
    fn segment_captures_in_template_order() {
        let pattern = terminal("/{username}/{pagetype}");
        assert_eq!(pattern.parameter_names(), ["username", "pagetype"]);

        let captures = pattern.captures("/alice/posts/").unwrap();
        assert_eq!(
            captures,
            vec![
                ("username".to_string(), "alice".to_string()),
                ("pagetype".to_string(), "posts".to_string()),
            ]
        );
    }

    #[test]
    fn segment_capture_excludes_slash_and_question_mark() {
        let pattern = terminal("/{name}");
        assert!(!pattern.matches("/a/b/"));
        assert!(!pattern.matches("/a?b/"));
        assert!(pattern.matches("/a.b/"));
    }

    #[test]
    fn query_string_capture_is_optional() {
        let pattern = terminal("/x{queryString}");
        assert!(pattern.matches("/x/"));
        assert!(pattern.matches("/x?a=1&b=2/"));

        assert_eq!(pattern.captures("/x/").unwrap(), vec![]);
        assert_eq!(
            pattern.captures("/x?a=1&b=2/").unwrap(),
            vec![("queryString".to_string(), "a=1&b=2".to_string())]
        );
    }

    #[test]
    fn capture_and_query_string_compose() {
        let pattern = terminal("/{username}{queryString}");
        let captures = pattern.captures("/ada?tab=drafts/").unwrap();
        assert_eq!(
            captures,
            vec![
                ("username".to_string(), "ada".to_string()),
                ("queryString".to_string(), "tab=drafts".to_string()),
            ]
        );
    }

    #[test]
    fn round_trip_extraction() {
        let pattern = terminal("/users/{id}/files/{file}");
        let rendered = "/users/42/files/report.pdf/";
        let captures = pattern.captures(rendered).unwrap();
        assert_eq!(
            captures,
            vec![
                ("id".to_string(), "42".to_string()),
                ("file".to_string(), "report.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn literal_spans_are_escaped() {
        let pattern = terminal("/index.html");
        assert!(pattern.matches("/index.html/"));
        assert!(!pattern.matches("/indexXhtml/"));
    }

    #[test]
    fn prefix_requires_trailing_content() {
        let pattern = prefix("/r");
        assert_eq!(pattern.strip_prefix("/r/sub/"), Some("/sub/"));
        assert_eq!(pattern.strip_prefix("/r/"), Some("/"));
        assert_eq!(pattern.strip_prefix("/r"), None);
        assert_eq!(pattern.strip_prefix("/other/"), None);
        assert!(pattern.matches("/R/sub/"));
        assert!(!pattern.matches("/r"));
    }

    #[test]
    fn root_prefix_strips_nothing() {
        let pattern = prefix("/");
        assert_eq!(pattern.strip_prefix("/anything/"), Some("/anything/"));
        assert_eq!(pattern.strip_prefix("/"), Some("/"));
        assert_eq!(pattern.strip_prefix("/no-slash"), None);
    }

    #[test]
    fn terminal_pattern_never_strips() {
        assert_eq!(terminal("/x").strip_prefix("/x/"), None);
    }
}
