//! A small site: static assets, a templated user page, and a guarded
//! admin subtree.
//!
//! Run with:
//! ```sh
//! cargo run --example getting_started
//! ```

use switchboard::prelude::*;
use switchboard::{MemorySessionStore, TemplateSet};

/// Greets the captured user name, remembering the visit in a cookie.
struct UserPage;

#[async_trait]
impl Endpoint for UserPage {
    type Data = String;

    async fn entry(&self, _ctx: &RequestContext, call: &mut CallState) -> Result<String, Interrupt> {
        let name = call.param("username").unwrap_or("friend").to_string();
        if call.cookies().get("seen").is_none() {
            call.cookies_mut().set("seen", "1");
        }
        Ok(name)
    }

    async fn exit(
        &self,
        ctx: &RequestContext,
        _call: &mut CallState,
        name: String,
    ) -> Result<Response, DispatchError> {
        Ok(ctx.render_response("user-homepage", &serde_json::json!({ "user": name }))?)
    }
}

/// Lets requests through only when a token cookie is present.
struct RequireToken;

#[async_trait]
impl EntryModifier for RequireToken {
    async fn apply(&self, request: Request) -> Flow {
        if request.headers().get("cookie").is_some_and(|c| c.contains("token=")) {
            Flow::Continue(request)
        } else {
            Flow::Respond(Response::new(StatusCode::FORBIDDEN).body_text("403: forbidden"))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let admin = Router::new("/admin")?
        .mount(StaticResponse::new(
            "/status",
            Response::ok().body_text("all systems nominal"),
        )?)
        .entry_modifier(RequireToken);

    let app = App::builder()
        .mount(admin)
        .mount(Terminal::new("/{username}{queryString}", UserPage)?)
        .templates(TemplateSet::new().with("user-homepage", "<h1>Hello {{user}}</h1>"))
        .sessions(MemorySessionStore::new())
        .not_found(Response::new(StatusCode::NOT_FOUND).body_text("nothing here"))
        .build()?;

    app.serve("127.0.0.1:3000").await?;
    Ok(())
}
