//! Application wiring and top-level dispatch.

use std::sync::Arc;

use switchboard_core::{
    DefaultResponse, DispatchError, EntryModifier, ExitModifier, Registry, Request, RequestContext,
    Response, SessionStore, Sessions, StatusCode, TemplateEngine,
};
use switchboard_router::{PatternError, Routable, Router};

/// The assembled application: a root router, the collaborator registry,
/// and the top-level substitution rules for failures.
///
/// `App` is the whole collaborator-facing surface — a serving loop only
/// ever calls [`App::handle`].
#[derive(Debug)]
pub struct App {
    root: Router,
    registry: Arc<Registry>,
    not_found: Option<DefaultResponse>,
    error: Option<DefaultResponse>,
    propagate_errors: bool,
}

impl App {
    /// Start building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Dispatch one request through the routing tree.
    ///
    /// The request target is normalized to end with `/` before any
    /// matching happens. An unmatched route produces the configured
    /// not-found response (or a minimal built-in 404). Any other
    /// dispatch failure produces the configured error response (or a
    /// minimal built-in 500) — unless error propagation is enabled, in
    /// which case it is returned to the caller.
    ///
    /// # Errors
    ///
    /// Only when `propagate_errors` is set, and only for failures other
    /// than not-found.
    pub async fn handle(&self, request: Request) -> Result<Response, DispatchError> {
        let ctx = RequestContext::new(request, Arc::clone(&self.registry));
        match self.root.dispatch(&ctx).await {
            Ok(response) => Ok(response),
            Err(DispatchError::NotFound) => {
                tracing::debug!(path = ctx.path(), "no route matched");
                Ok(self.not_found.as_ref().map_or_else(
                    || Response::new(StatusCode::NOT_FOUND).body_text("404: not found"),
                    DefaultResponse::produce,
                ))
            }
            Err(error) if self.propagate_errors => Err(error),
            Err(error) => {
                tracing::warn!(path = ctx.path(), %error, "dispatch failed");
                Ok(self.error.as_ref().map_or_else(
                    || Response::new(StatusCode::INTERNAL_SERVER_ERROR)
                        .body_text("500: server error"),
                    DefaultResponse::produce,
                ))
            }
        }
    }

    /// The collaborator registry this app dispatches with.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Builder for [`App`].
///
/// Mounts, modifiers, and collaborators are fixed at build time; the
/// resulting app is immutable and freely shareable.
#[derive(Default)]
pub struct AppBuilder {
    prefix: String,
    mounts: Vec<Box<dyn Routable>>,
    entry_modifiers: Vec<Box<dyn EntryModifier>>,
    exit_modifiers: Vec<Box<dyn ExitModifier>>,
    registry: Registry,
    not_found: Option<DefaultResponse>,
    error: Option<DefaultResponse>,
    propagate_errors: bool,
}

impl AppBuilder {
    /// Start with an empty configuration rooted at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::from("/"),
            ..Self::default()
        }
    }

    /// Root the application under a path prefix instead of `/`.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Mount a routable at the root.
    #[must_use]
    pub fn mount(mut self, routable: impl Routable + 'static) -> Self {
        self.mounts.push(Box::new(routable));
        self
    }

    /// Mount an already-boxed routable at the root.
    #[must_use]
    pub fn mount_boxed(mut self, routable: Box<dyn Routable>) -> Self {
        self.mounts.push(routable);
        self
    }

    /// Append a root-level entry modifier.
    #[must_use]
    pub fn entry_modifier(mut self, modifier: impl EntryModifier + 'static) -> Self {
        self.entry_modifiers.push(Box::new(modifier));
        self
    }

    /// Append a root-level exit modifier.
    #[must_use]
    pub fn exit_modifier(mut self, modifier: impl ExitModifier + 'static) -> Self {
        self.exit_modifiers.push(Box::new(modifier));
        self
    }

    /// Attach a template engine to the registry.
    #[must_use]
    pub fn templates(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.registry = self.registry.with_templates(engine);
        self
    }

    /// Attach a session store to the registry.
    #[must_use]
    pub fn sessions(mut self, store: impl SessionStore + 'static) -> Self {
        self.registry = self.registry.with_sessions(Sessions::new(store));
        self
    }

    /// The response substituted for unmatched routes.
    #[must_use]
    pub fn not_found(mut self, response: impl Into<DefaultResponse>) -> Self {
        self.not_found = Some(response.into());
        self
    }

    /// The response substituted for dispatch failures.
    #[must_use]
    pub fn on_error(mut self, response: impl Into<DefaultResponse>) -> Self {
        self.error = Some(response.into());
        self
    }

    /// Return dispatch failures from [`App::handle`] instead of
    /// substituting a response, letting the embedder decide whether to
    /// terminate its serving loop.
    #[must_use]
    pub fn propagate_errors(mut self, propagate: bool) -> Self {
        self.propagate_errors = propagate;
        self
    }

    /// Assemble the application.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the root prefix fails to compile.
    pub fn build(self) -> Result<App, PatternError> {
        let mut root = Router::new(&self.prefix)?;
        for routable in self.mounts {
            root = root.mount_boxed(routable);
        }
        for modifier in self.entry_modifiers {
            root = root.entry_modifier_boxed(modifier);
        }
        for modifier in self.exit_modifiers {
            root = root.exit_modifier_boxed(modifier);
        }
        Ok(App {
            root,
            registry: Arc::new(self.registry),
            not_found: self.not_found,
            error: self.error,
            propagate_errors: self.propagate_errors,
        })
    }
}

impl std::fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBuilder")
            .field("prefix", &self.prefix)
            .field("mounts", &self.mounts.len())
            .finish_non_exhaustive()
    }
}
