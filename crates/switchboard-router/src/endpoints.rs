//! Built-in terminal handlers.
//!
//! These implement [`Routable`] directly rather than going through the
//! endpoint lifecycle: they have no parameters, no cookies, and no
//! entry/exit split — just a route and a canned behavior.

use async_trait::async_trait;
use regex::Regex;

use switchboard_core::{DefaultResponse, DispatchError, RequestContext, Response};

use crate::pattern::{PatternError, PatternKind, RoutePattern};
use crate::routable::Routable;

/// A terminal route that always produces the same response.
#[derive(Debug)]
pub struct StaticResponse {
    pattern: RoutePattern,
    response: DefaultResponse,
}

impl StaticResponse {
    /// Bind `route` to a fixed response or factory.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the route template fails to compile.
    pub fn new(route: &str, response: impl Into<DefaultResponse>) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::compile(route, PatternKind::Terminal)?,
            response: response.into(),
        })
    }
}

#[async_trait]
impl Routable for StaticResponse {
    fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    async fn dispatch(&self, _ctx: &RequestContext) -> Result<Response, DispatchError> {
        Ok(self.response.produce())
    }
}

/// A terminal route that redirects to a fixed location.
#[derive(Debug)]
pub struct GlobalRedirect {
    pattern: RoutePattern,
    to: String,
}

impl GlobalRedirect {
    /// Redirect `route` to the absolute location `to`.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the route template fails to compile.
    pub fn new(route: &str, to: impl Into<String>) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::compile(route, PatternKind::Terminal)?,
            to: to.into(),
        })
    }
}

#[async_trait]
impl Routable for GlobalRedirect {
    fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    async fn dispatch(&self, _ctx: &RequestContext) -> Result<Response, DispatchError> {
        Ok(Response::redirect(self.to.clone()))
    }
}

/// A terminal route that rewrites the tail of the original request path.
///
/// The matched route suffix (with its trailing slash) is replaced by the
/// target, so the redirect lands next to wherever the route was mounted:
/// a `LocalRedirect::new("/about", "/about.html")` mounted under a
/// `/site` router sends `/site/about` to `/site/about.html`.
#[derive(Debug)]
pub struct LocalRedirect {
    pattern: RoutePattern,
    filter: Regex,
    to: String,
}

impl LocalRedirect {
    /// Redirect `route` to the sibling location `to`.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the route template fails to compile.
    pub fn new(route: &str, to: impl Into<String>) -> Result<Self, PatternError> {
        let suffix = if route == "/" { "$" } else { "/$" };
        let filter = Regex::new(&format!("(?i){}{}", regex::escape(route), suffix)).map_err(
            |source| PatternError::Invalid {
                template: route.to_string(),
                source,
            },
        )?;
        Ok(Self {
            pattern: RoutePattern::compile(route, PatternKind::Terminal)?,
            filter,
            to: to.into(),
        })
    }
}

#[async_trait]
impl Routable for LocalRedirect {
    fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response, DispatchError> {
        let mut path = ctx.request().target().to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        let location = self
            .filter
            .replace(&path, regex::NoExpand(&self.to))
            .into_owned();
        Ok(Response::redirect(location))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use switchboard_core::{Registry, Request, StatusCode};

    use super::*;

    fn ctx(target: &str) -> RequestContext {
        RequestContext::new(Request::get(target), Arc::new(Registry::new()))
    }

    #[tokio::test]
    async fn static_response_produces_its_value() {
        let routable =
            StaticResponse::new("/home", Response::ok().body_text("home page")).unwrap();
        assert!(routable.pattern().matches("/home/"));

        let response = routable.dispatch(&ctx("/home")).await.unwrap();
        assert_eq!(response.body(), b"home page");
    }

    #[tokio::test]
    async fn global_redirect_points_at_the_fixed_target() {
        let routable = GlobalRedirect::new("/docs", "https://docs.example.com").unwrap();
        let response = routable.dispatch(&ctx("/docs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get("location"),
            Some("https://docs.example.com")
        );
    }

    #[tokio::test]
    async fn local_redirect_rewrites_the_path_tail() {
        let routable = LocalRedirect::new("/about", "/about.html").unwrap();
        let response = routable.dispatch(&ctx("/site/about")).await.unwrap();
        assert_eq!(response.headers().get("location"), Some("/site/about.html"));
    }

    #[tokio::test]
    async fn local_redirect_from_root_lands_on_the_target() {
        let routable = LocalRedirect::new("/", "/index.html").unwrap();
        let response = routable.dispatch(&ctx("/site/")).await.unwrap();
        assert_eq!(response.headers().get("location"), Some("/site/index.html"));
    }
}
