//! Recursive router dispatch.

use async_trait::async_trait;

use switchboard_core::{
    DispatchError, EntryModifier, ExitModifier, Flow, Request, RequestContext, Response,
};

use crate::pattern::{PatternError, PatternKind, RoutePattern};
use crate::routable::Routable;

/// A routable that owns child routables under a path prefix.
///
/// Children are tried in registration order; the child list and modifier
/// lists are fixed once dispatch begins, so a router is freely shareable
/// across concurrent requests.
pub struct Router {
    pattern: RoutePattern,
    children: Vec<Box<dyn Routable>>,
    entry_modifiers: Vec<Box<dyn EntryModifier>>,
    exit_modifiers: Vec<Box<dyn ExitModifier>>,
}

impl Router {
    /// Create a router owning the given prefix.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the prefix template fails to compile.
    pub fn new(prefix: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::compile(prefix, PatternKind::Prefix)?,
            children: Vec::new(),
            entry_modifiers: Vec::new(),
            exit_modifiers: Vec::new(),
        })
    }

    /// Mount a child routable (builder style). Registration order is
    /// dispatch order.
    #[must_use]
    pub fn mount(mut self, child: impl Routable + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Mount an already-boxed child routable (builder style).
    #[must_use]
    pub fn mount_boxed(mut self, child: Box<dyn Routable>) -> Self {
        self.children.push(child);
        self
    }

    /// Append an entry modifier (builder style).
    #[must_use]
    pub fn entry_modifier(mut self, modifier: impl EntryModifier + 'static) -> Self {
        self.entry_modifiers.push(Box::new(modifier));
        self
    }

    /// Append an exit modifier (builder style).
    #[must_use]
    pub fn exit_modifier(mut self, modifier: impl ExitModifier + 'static) -> Self {
        self.exit_modifiers.push(Box::new(modifier));
        self
    }

    /// Append an already-boxed entry modifier (builder style).
    #[must_use]
    pub fn entry_modifier_boxed(mut self, modifier: Box<dyn EntryModifier>) -> Self {
        self.entry_modifiers.push(modifier);
        self
    }

    /// Append an already-boxed exit modifier (builder style).
    #[must_use]
    pub fn exit_modifier_boxed(mut self, modifier: Box<dyn ExitModifier>) -> Self {
        self.exit_modifiers.push(modifier);
        self
    }

    /// Number of mounted children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when no children are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Run the entry chain over a copy of the context's request.
    ///
    /// Returns either the transformed request to dispatch with, or the
    /// short-circuit response.
    async fn run_entry_modifiers(&self, ctx: &RequestContext) -> Flow {
        let mut request = ctx.request().clone();
        for modifier in &self.entry_modifiers {
            match modifier.apply(request).await {
                Flow::Continue(transformed) => request = transformed,
                short_circuit @ Flow::Respond(_) => return short_circuit,
            }
        }
        Flow::Continue(request)
    }
}

#[async_trait]
impl Routable for Router {
    fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response, DispatchError> {
        // 1. Strip this router's prefix; an empty remainder is the root
        //    of this subtree.
        let rest = self
            .pattern
            .strip_prefix(ctx.path())
            .ok_or(DispatchError::NotFound)?;
        let rest = if rest.is_empty() { "/" } else { rest };

        // 2. Select candidates. With no structural match anywhere below,
        //    fail before any modifier runs — an ancestor's access
        //    control must not fire for paths it does not own.
        let candidates: Vec<&dyn Routable> = self
            .children
            .iter()
            .map(|child| child.as_ref())
            .filter(|child| child.pattern().matches(rest))
            .collect();
        if candidates.is_empty() {
            tracing::debug!(prefix = self.pattern.template(), path = rest, "no matching child");
            return Err(DispatchError::NotFound);
        }

        // 3. Entry chain, now that a match is confirmed.
        let modified: Option<Request> = if self.entry_modifiers.is_empty() {
            None
        } else {
            match self.run_entry_modifiers(ctx).await {
                Flow::Continue(request) => Some(request),
                Flow::Respond(response) => {
                    // Short-circuit: skip dispatch, keep the exit chain.
                    let mut response = response;
                    for modifier in &self.exit_modifiers {
                        response = modifier.apply(response).await;
                    }
                    return Ok(response);
                }
            }
        };

        // 4. Try candidates in registration order.
        let child_ctx = match modified {
            Some(request) => ctx.with_request(request, rest),
            None => ctx.narrowed(rest),
        };
        let mut outcome: Option<Response> = None;
        for candidate in candidates {
            if candidate.intercept(ctx).await {
                tracing::trace!(
                    route = candidate.pattern().template(),
                    "candidate intercepted, trying next"
                );
                continue;
            }
            match candidate.dispatch(&child_ctx).await {
                Ok(response) => {
                    outcome = Some(response);
                    break;
                }
                Err(DispatchError::NotFound) => continue,
                Err(error) => return Err(error),
            }
        }

        // 5. Exhausted candidates.
        let Some(mut response) = outcome else {
            return Err(DispatchError::NotFound);
        };

        // 6. Exit chain.
        for modifier in &self.exit_modifiers {
            response = modifier.apply(response).await;
        }
        Ok(response)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.pattern.template())
            .field("children", &self.children.len())
            .field("entry_modifiers", &self.entry_modifiers.len())
            .field("exit_modifiers", &self.exit_modifiers.len())
            .finish()
    }
}
