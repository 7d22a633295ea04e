//! Per-call handler state.
//!
//! Every dispatch into a terminal handler builds a fresh [`CallState`];
//! nothing carries over between invocations, so concurrent requests to
//! the same handler instance can never observe each other's parameters
//! or cookies.

use std::collections::HashMap;

use crate::cookies::CookieLedger;
use crate::request::Request;

/// Mapping from parameter name to extracted string value.
///
/// Always replaced wholesale at the start of a dispatch, never merged.
pub type ParameterStore = HashMap<String, String>;

/// The reserved template token that captures everything after the first
/// `?` as one opaque blob.
pub const QUERY_STRING_PARAM: &str = "queryString";

/// Request-scoped state threaded through a terminal handler's entry and
/// exit phases.
#[derive(Debug, Default)]
pub struct CallState {
    route_params: ParameterStore,
    query_params: ParameterStore,
    cookies: CookieLedger,
}

impl CallState {
    /// Build fresh state for one dispatch, with the cookie baseline
    /// parsed from the request's cookie header.
    #[must_use]
    pub fn new(request: &Request) -> Self {
        let cookies = match request.cookie_header() {
            Some(raw) => CookieLedger::from_header(raw),
            None => CookieLedger::new(),
        };
        Self {
            route_params: ParameterStore::new(),
            query_params: ParameterStore::new(),
            cookies,
        }
    }

    /// Replace the route parameters with the captures from a pattern
    /// match, then decompose the reserved query-string capture if it is
    /// present.
    ///
    /// Query entries that do not split on `=` into exactly two parts
    /// with a non-empty key are discarded.
    pub fn populate(&mut self, captures: Vec<(String, String)>) {
        self.route_params = captures.into_iter().collect();
        self.query_params = ParameterStore::new();

        let Some(query) = self.route_params.get(QUERY_STRING_PARAM) else {
            return;
        };
        for entry in query.split('&') {
            let parts: Vec<&str> = entry.split('=').collect();
            if parts.len() != 2 || parts[0].is_empty() {
                continue;
            }
            self.query_params
                .insert(parts[0].to_string(), parts[1].to_string());
        }
    }

    /// A route parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route_params.get(name).map(String::as_str)
    }

    /// A query parameter by name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// All route parameters.
    #[must_use]
    pub fn route_params(&self) -> &ParameterStore {
        &self.route_params
    }

    /// All query parameters.
    #[must_use]
    pub fn query_params(&self) -> &ParameterStore {
        &self.query_params
    }

    /// The cookie ledger.
    #[must_use]
    pub fn cookies(&self) -> &CookieLedger {
        &self.cookies
    }

    /// Mutable access to the cookie ledger.
    pub fn cookies_mut(&mut self) -> &mut CookieLedger {
        &mut self.cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookies_initialized_from_request_header() {
        let req = Request::get("/").with_header("cookie", "token=abc");
        let call = CallState::new(&req);
        assert_eq!(call.cookies().get("token"), Some("abc"));
    }

    #[test]
    fn populate_replaces_previous_parameters() {
        let req = Request::get("/");
        let mut call = CallState::new(&req);
        call.populate(vec![("first".into(), "1".into())]);
        call.populate(vec![("second".into(), "2".into())]);
        assert_eq!(call.param("first"), None);
        assert_eq!(call.param("second"), Some("2"));
    }

    #[test]
    fn query_string_capture_is_decomposed() {
        let req = Request::get("/");
        let mut call = CallState::new(&req);
        call.populate(vec![(
            QUERY_STRING_PARAM.to_string(),
            "a=1&b=2&malformed&=nokey&c=x=y".to_string(),
        )]);
        assert_eq!(call.query_param("a"), Some("1"));
        assert_eq!(call.query_param("b"), Some("2"));
        assert_eq!(call.query_param("malformed"), None);
        assert_eq!(call.query_param(""), None);
        // `c=x=y` splits into three parts and is discarded.
        assert_eq!(call.query_param("c"), None);
        assert_eq!(call.query_params().len(), 2);
    }

    #[test]
    fn empty_value_entries_are_kept() {
        let req = Request::get("/");
        let mut call = CallState::new(&req);
        call.populate(vec![(QUERY_STRING_PARAM.to_string(), "flag=".to_string())]);
        assert_eq!(call.query_param("flag"), Some(""));
    }
}
