//! The dispatch contract shared by routers and terminal handlers.

use async_trait::async_trait;

use switchboard_core::{DispatchError, RequestContext, Response};

use crate::pattern::RoutePattern;

/// Anything a router can own and dispatch into: another router or a
/// terminal handler.
#[async_trait]
pub trait Routable: Send + Sync {
    /// The compiled pattern a parent tests against its remainder path.
    fn pattern(&self) -> &RoutePattern;

    /// Attempt to produce a response for the context's path.
    ///
    /// # Errors
    ///
    /// `DispatchError::NotFound` when nothing at or below this routable
    /// matches — the parent recovers by trying the next sibling. Any
    /// other error propagates immediately.
    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response, DispatchError>;

    /// Interception hook consulted by the owning router before dispatch.
    ///
    /// Only terminal handlers meaningfully implement this; the default
    /// never intercepts. Returning `true` skips this routable and lets
    /// the router continue with the next matching sibling. The hook sees
    /// the original request, before any entry-modifier transforms.
    async fn intercept(&self, _ctx: &RequestContext) -> bool {
        false
    }
}
