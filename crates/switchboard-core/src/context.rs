//! Per-invocation dispatch context and the collaborator registry.
//!
//! A [`RequestContext`] is created once at the root per inbound request.
//! Each router produces a new, narrowed context when recursing — same
//! request, remainder path — and discards it when that call returns; a
//! child never mutates its parent's context.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{SessionError, TemplateError};
use crate::request::Request;
use crate::response::Response;
use crate::session::Sessions;
use crate::template::TemplateEngine;

/// App-level collaborators, passed explicitly through the context rather
/// than through process-wide state.
#[derive(Clone, Default)]
pub struct Registry {
    templates: Option<Arc<dyn TemplateEngine>>,
    sessions: Option<Sessions>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a template engine (builder style).
    #[must_use]
    pub fn with_templates(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.templates = Some(Arc::new(engine));
        self
    }

    /// Attach a sessions handle (builder style).
    #[must_use]
    pub fn with_sessions(mut self, sessions: Sessions) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// The configured template engine, if any.
    #[must_use]
    pub fn templates(&self) -> Option<&dyn TemplateEngine> {
        self.templates.as_deref()
    }

    /// The configured sessions handle, if any.
    #[must_use]
    pub fn sessions(&self) -> Option<&Sessions> {
        self.sessions.as_ref()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("templates", &self.templates.is_some())
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}

/// Per-invocation dispatch context.
///
/// Carries the (shared, immutable) inbound request, the override path
/// used for matching at the current level, and the collaborator
/// registry.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request: Arc<Request>,
    path: String,
    registry: Arc<Registry>,
}

impl RequestContext {
    /// Create the root context for an inbound request.
    ///
    /// The match path is the request target normalized to end with `/`,
    /// which the route grammar requires.
    #[must_use]
    pub fn new(request: Request, registry: Arc<Registry>) -> Self {
        let mut path = request.target().to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        Self {
            request: Arc::new(request),
            path,
            registry,
        }
    }

    /// A new context for a child dispatch: same request, narrowed path.
    #[must_use]
    pub fn narrowed(&self, path: impl Into<String>) -> Self {
        Self {
            request: Arc::clone(&self.request),
            path: path.into(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// A new context carrying a transformed request (produced by an
    /// entry-modifier chain) and a narrowed path.
    #[must_use]
    pub fn with_request(&self, request: Request, path: impl Into<String>) -> Self {
        Self {
            request: Arc::new(request),
            path: path.into(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// The inbound request as seen at this level.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The path being matched at this level.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The collaborator registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The sessions handle.
    ///
    /// # Errors
    ///
    /// [`SessionError::Unconfigured`] when no store was attached.
    pub fn sessions(&self) -> Result<&Sessions, SessionError> {
        self.registry.sessions().ok_or(SessionError::Unconfigured)
    }

    /// Render a template through the registry's engine.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Unconfigured`] when no engine was attached;
    /// engine errors pass through.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        let engine = self.registry.templates().ok_or(TemplateError::Unconfigured)?;
        engine.render(name, context)
    }

    /// Render a template into an HTML response.
    pub fn render_response(&self, name: &str, context: &Value) -> Result<Response, TemplateError> {
        Ok(Response::html(self.render(name, context)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateSet;
    use serde_json::json;

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::new())
    }

    #[test]
    fn root_context_normalizes_trailing_slash() {
        let ctx = RequestContext::new(Request::get("/admin/home"), registry());
        assert_eq!(ctx.path(), "/admin/home/");

        let ctx = RequestContext::new(Request::get("/admin/home/"), registry());
        assert_eq!(ctx.path(), "/admin/home/");
    }

    #[test]
    fn narrowed_context_shares_the_request() {
        let ctx = RequestContext::new(Request::get("/admin/home"), registry());
        let child = ctx.narrowed("/home/");
        assert_eq!(child.path(), "/home/");
        assert_eq!(child.request().target(), "/admin/home");
        // Parent is untouched.
        assert_eq!(ctx.path(), "/admin/home/");
    }

    #[test]
    fn unconfigured_collaborators_error() {
        let ctx = RequestContext::new(Request::get("/"), registry());
        assert!(matches!(ctx.sessions(), Err(SessionError::Unconfigured)));
        assert!(matches!(
            ctx.render("t", &json!({})),
            Err(TemplateError::Unconfigured)
        ));
    }

    #[test]
    fn render_response_produces_html() {
        let reg = Arc::new(
            Registry::new().with_templates(TemplateSet::new().with("hello", "<p>{{who}}</p>")),
        );
        let ctx = RequestContext::new(Request::get("/"), reg);
        let res = ctx.render_response("hello", &json!({"who": "world"})).unwrap();
        assert_eq!(res.headers().get("content-type"), Some("text/html"));
        assert_eq!(res.body(), b"<p>world</p>");
    }
}
