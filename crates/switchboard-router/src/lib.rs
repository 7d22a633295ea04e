//! Route-pattern compiler and recursive dispatch.
//!
//! This crate turns route templates into matchers and drives requests
//! through a tree of routers down to terminal handlers.
//!
//! # Features
//!
//! - `{name}` segment captures and the reserved `{queryString}` capture
//! - Case-insensitive, both-ends-anchored terminal matching
//! - Prefix routers that strip their literal and recurse
//! - Entry/exit modifier chains scoped to confirmed matches
//! - Not-found propagation with sibling fallback
//! - A static asset catalog builder
//!
//! # Example
//!
//! ```ignore
//! use switchboard_router::{Router, StaticResponse};
//! use switchboard_core::Response;
//!
//! let admin = Router::new("/admin")?
//!     .mount(StaticResponse::new("/login", Response::ok().body_text("login"))?);
//! ```

#![forbid(unsafe_code)]

mod assets;
mod endpoints;
mod pattern;
mod routable;
mod router;
mod terminal;

pub use assets::{AssetError, asset_router};
pub use endpoints::{GlobalRedirect, LocalRedirect, StaticResponse};
pub use pattern::{PatternError, PatternKind, RoutePattern};
pub use routable::Routable;
pub use router::Router;
pub use terminal::Terminal;
