//! A request-routing and dispatch engine for HTTP-style traffic.
//!
//! switchboard locates the most specific registered handler among a tree
//! of path-prefixed routers and terminal handlers, extracts path and
//! query parameters, and drives an entry/exit handler lifecycle that
//! produces a response. Cookie state is tracked per request as a diff
//! against the inbound set, and pre/post-processing modifier stages can
//! be scoped to any router subtree.
//!
//! # Quick Start
//!
//! ```ignore
//! use switchboard::prelude::*;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Endpoint for Hello {
//!     type Data = String;
//!
//!     async fn entry(&self, _ctx: &RequestContext, call: &mut CallState)
//!         -> Result<String, Interrupt>
//!     {
//!         Ok(call.param("name").unwrap_or("world").to_string())
//!     }
//!
//!     async fn exit(&self, _ctx: &RequestContext, _call: &mut CallState, name: String)
//!         -> Result<Response, DispatchError>
//!     {
//!         Ok(Response::html(format!("<h1>Hello {name}</h1>")))
//!     }
//! }
//!
//! let app = App::builder()
//!     .mount(Terminal::new("/{name}", Hello)?)
//!     .build()?;
//!
//! app.serve("127.0.0.1:3000").await?;
//! ```
//!
//! # Crate Structure
//!
//! - [`switchboard_core`] — requests, responses, cookies, per-call
//!   state, endpoint/modifier contracts, collaborator interfaces
//! - [`switchboard_router`] — pattern compiler, routers, built-in
//!   terminal handlers, asset catalog
//! - this crate — [`App`] wiring, the serving loop, and a synchronous
//!   [`testing::TestClient`]

#![forbid(unsafe_code)]

mod app;
mod server;
pub mod testing;

pub use app::{App, AppBuilder};

// Re-export crates
pub use switchboard_core as core;
pub use switchboard_router as router;

// Re-export commonly used types
pub use switchboard_core::{
    CallState, CookieAttributes, CookieLedger, DefaultResponse, DispatchError, Endpoint,
    EntryModifier, ExitModifier, Flow, Headers, Interrupt, MemorySessionStore, Method,
    ParameterStore, Registry, Request, RequestContext, Response, SameSite, SessionData,
    SessionError, SessionStore, Sessions, StatusCode, TemplateEngine, TemplateError, TemplateSet,
    mime_type_for_extension,
};
pub use switchboard_router::{
    AssetError, GlobalRedirect, LocalRedirect, PatternError, PatternKind, Routable, RoutePattern,
    Router, StaticResponse, Terminal, asset_router,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        App, AppBuilder, CallState, CookieAttributes, DefaultResponse, DispatchError, Endpoint,
        EntryModifier, ExitModifier, Flow, GlobalRedirect, Interrupt, LocalRedirect, Method,
        Registry, Request, RequestContext, Response, Routable, Router, SameSite, SessionStore,
        Sessions, StaticResponse, StatusCode, TemplateEngine, Terminal, asset_router,
    };
    pub use async_trait::async_trait;
}
