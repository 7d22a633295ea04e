//! The terminal-handler contract.
//!
//! An [`Endpoint`] is the user-supplied logic behind a leaf route: an
//! `entry` phase that inspects the request and produces intermediate
//! data, and an `exit` phase that turns that data into a response. The
//! surrounding lifecycle (pattern matching, parameter population, cookie
//! diffing) is driven by the routing layer; endpoints only see their
//! per-call [`CallState`].

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{DispatchError, SessionError, TemplateError};
use crate::response::Response;
use crate::state::CallState;

/// Early termination of the entry phase.
#[derive(Debug)]
pub enum Interrupt {
    /// Skip the exit phase and use this response directly. This is the
    /// conventional channel for validation failures.
    Respond(Response),
    /// Abort the request with an error. `DispatchError::NotFound` makes
    /// the owning router try the next sibling.
    Abort(DispatchError),
}

impl From<Response> for Interrupt {
    fn from(response: Response) -> Self {
        Self::Respond(response)
    }
}

impl From<DispatchError> for Interrupt {
    fn from(error: DispatchError) -> Self {
        Self::Abort(error)
    }
}

impl From<SessionError> for Interrupt {
    fn from(error: SessionError) -> Self {
        Self::Abort(error.into())
    }
}

impl From<TemplateError> for Interrupt {
    fn from(error: TemplateError) -> Self {
        Self::Abort(error.into())
    }
}

/// User logic for a terminal route.
///
/// Implementations are stateless: both phases take `&self`, and any
/// number of requests may be in flight against one instance. Per-request
/// data belongs in [`CallState`] or in `Data`.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Value produced by `entry` and consumed by `exit`.
    type Data: Send;

    /// Inspect the request and produce intermediate data, or interrupt.
    async fn entry(
        &self,
        ctx: &RequestContext,
        call: &mut CallState,
    ) -> Result<Self::Data, Interrupt>;

    /// Turn the entry data into a response.
    async fn exit(
        &self,
        ctx: &RequestContext,
        call: &mut CallState,
        data: Self::Data,
    ) -> Result<Response, DispatchError>;

    /// Interception hook, consulted by the owning router before this
    /// endpoint is dispatched. Returning `true` skips this endpoint and
    /// lets the router try the next matching sibling.
    async fn intercept(&self, _ctx: &RequestContext) -> bool {
        false
    }
}
