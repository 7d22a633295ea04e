//! Router-scoped request and response stages.
//!
//! Modifiers are stateless. A router runs its entry modifiers only after
//! a structural match is confirmed somewhere in its subtree, and its exit
//! modifiers over whatever response results — including a short-circuit
//! response produced by its own entry chain.

use async_trait::async_trait;

use crate::request::Request;
use crate::response::Response;

/// Outcome of an entry modifier.
#[derive(Debug)]
pub enum Flow {
    /// Keep dispatching with this (possibly transformed) request.
    Continue(Request),
    /// Stop here: skip the remaining entry chain and descendant dispatch
    /// and use this response, still subject to the owning router's exit
    /// chain.
    Respond(Response),
}

/// A pre-processing stage applied to the request once a match within the
/// owning router is confirmed.
#[async_trait]
pub trait EntryModifier: Send + Sync {
    /// Transform the request or short-circuit with a response.
    async fn apply(&self, request: Request) -> Flow;
}

/// A post-processing stage applied to the response as dispatch unwinds
/// through the owning router.
#[async_trait]
pub trait ExitModifier: Send + Sync {
    /// Transform the response.
    async fn apply(&self, response: Response) -> Response;
}
