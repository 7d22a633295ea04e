//! Core types and contracts for the switchboard dispatch engine.
//!
//! This crate provides the fundamental building blocks:
//! - [`Request`] and [`Response`] types
//! - [`RequestContext`] carrying the request, the match path, and the
//!   collaborator [`Registry`]
//! - [`Endpoint`] — the entry/exit contract for terminal handlers
//! - [`EntryModifier`] / [`ExitModifier`] — router-scoped request and
//!   response stages
//! - [`CookieLedger`] — diff-based cookie tracking
//! - Collaborator interfaces for sessions and template rendering
//!
//! # Design Principles
//!
//! - Handler instances are stateless; all per-request state lives in a
//!   [`CallState`] built fresh for every dispatch
//! - Control flow is expressed with tagged results ([`Flow`],
//!   [`Interrupt`]), never with panics or sentinel responses
//! - Collaborators are passed explicitly through the context — there is
//!   no process-wide registry
//! - All types support `Send + Sync`

#![forbid(unsafe_code)]

mod context;
mod cookies;
mod endpoint;
mod error;
mod modifier;
mod request;
mod response;
mod session;
mod state;
mod template;

pub use context::{Registry, RequestContext};
pub use cookies::{CookieAttributes, CookieLedger, SameSite};
pub use endpoint::{Endpoint, Interrupt};
pub use error::{DispatchError, SessionError, TemplateError};
pub use modifier::{EntryModifier, ExitModifier, Flow};
pub use request::{Headers, Method, Request};
pub use response::{DefaultResponse, Response, StatusCode, mime_type_for_extension};
pub use session::{MemorySessionStore, SessionData, SessionStore, Sessions};
pub use state::{CallState, ParameterStore, QUERY_STRING_PARAM};
pub use template::{TemplateEngine, TemplateSet};
