//! The terminal-handler lifecycle.

use async_trait::async_trait;

use switchboard_core::{CallState, DispatchError, Endpoint, Interrupt, RequestContext, Response};

use crate::pattern::{PatternError, PatternKind, RoutePattern};
use crate::routable::Routable;

/// A leaf route: a compiled terminal pattern wrapping an [`Endpoint`].
///
/// Each dispatch runs the full lifecycle against fresh state:
///
/// 1. Build a [`CallState`] — the cookie baseline comes from the
///    request's cookie header; both parameter stores start empty.
/// 2. Match the pattern against the context path and populate the
///    stores from the captures (including query decomposition).
/// 3. Run `entry`; a `Respond` interrupt becomes the response directly.
/// 4. Run `exit` over the entry data.
/// 5. Attach the cookie diff, if any, and return.
///
/// Endpoints are stateless, so any number of requests may run this
/// lifecycle against one `Terminal` instance concurrently.
pub struct Terminal<E: Endpoint> {
    pattern: RoutePattern,
    endpoint: E,
}

impl<E: Endpoint> Terminal<E> {
    /// Compile `route` as a terminal pattern around `endpoint`.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when the route template fails to compile.
    pub fn new(route: &str, endpoint: E) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: RoutePattern::compile(route, PatternKind::Terminal)?,
            endpoint,
        })
    }

    /// The wrapped endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }
}

#[async_trait]
impl<E: Endpoint> Routable for Terminal<E> {
    fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<Response, DispatchError> {
        let mut call = CallState::new(ctx.request());
        if let Some(captures) = self.pattern.captures(ctx.path()) {
            call.populate(captures);
        }

        let data = match self.endpoint.entry(ctx, &mut call).await {
            Ok(data) => data,
            Err(Interrupt::Respond(response)) => return Ok(response),
            Err(Interrupt::Abort(error)) => return Err(error),
        };

        let mut response = self.endpoint.exit(ctx, &mut call, data).await?;

        if let Some(header) = call.cookies().stringify(true) {
            response.headers_mut().insert("set-cookie", header);
        }
        Ok(response)
    }

    async fn intercept(&self, ctx: &RequestContext) -> bool {
        self.endpoint.intercept(ctx).await
    }
}

impl<E: Endpoint> std::fmt::Debug for Terminal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("route", &self.pattern.template())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use switchboard_core::{Registry, Request, StatusCode};

    use super::*;

    fn ctx(target: &str) -> RequestContext {
        RequestContext::new(Request::get(target), Arc::new(Registry::new()))
    }

    /// Echoes its route and query parameters back in the body.
    struct EchoParams;

    #[async_trait]
    impl Endpoint for EchoParams {
        type Data = String;

        async fn entry(
            &self,
            _ctx: &RequestContext,
            call: &mut CallState,
        ) -> Result<String, Interrupt> {
            let user = call.param("username").unwrap_or("-").to_string();
            let tab = call.query_param("tab").unwrap_or("-").to_string();
            Ok(format!("{user}:{tab}"))
        }

        async fn exit(
            &self,
            _ctx: &RequestContext,
            _call: &mut CallState,
            data: String,
        ) -> Result<Response, DispatchError> {
            Ok(Response::ok().body_text(data))
        }
    }

    /// Rejects requests without a token cookie.
    struct RequiresToken;

    #[async_trait]
    impl Endpoint for RequiresToken {
        type Data = ();

        async fn entry(
            &self,
            _ctx: &RequestContext,
            call: &mut CallState,
        ) -> Result<(), Interrupt> {
            if call.cookies().get("token").is_none() {
                return Err(Response::new(StatusCode::BAD_REQUEST)
                    .body_text("missing token")
                    .into());
            }
            Ok(())
        }

        async fn exit(
            &self,
            _ctx: &RequestContext,
            _call: &mut CallState,
            _data: (),
        ) -> Result<Response, DispatchError> {
            Ok(Response::ok().body_text("authorized"))
        }
    }

    /// Marks the visitor with a cookie.
    struct SetsCookie;

    #[async_trait]
    impl Endpoint for SetsCookie {
        type Data = ();

        async fn entry(
            &self,
            _ctx: &RequestContext,
            call: &mut CallState,
        ) -> Result<(), Interrupt> {
            call.cookies_mut().set("seen", "1");
            Ok(())
        }

        async fn exit(
            &self,
            _ctx: &RequestContext,
            _call: &mut CallState,
            _data: (),
        ) -> Result<Response, DispatchError> {
            Ok(Response::ok().body_text("welcome"))
        }
    }

    /// Reads a parameter in exit only, with a pause in entry long enough
    /// for a concurrent request to overlap.
    struct SlowReader;

    #[async_trait]
    impl Endpoint for SlowReader {
        type Data = ();

        async fn entry(
            &self,
            _ctx: &RequestContext,
            _call: &mut CallState,
        ) -> Result<(), Interrupt> {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(())
        }

        async fn exit(
            &self,
            _ctx: &RequestContext,
            call: &mut CallState,
            _data: (),
        ) -> Result<Response, DispatchError> {
            Ok(Response::ok().body_text(call.param("id").unwrap_or("-").to_string()))
        }
    }

    #[tokio::test]
    async fn populates_route_and_query_parameters() {
        let terminal = Terminal::new("/{username}{queryString}", EchoParams).unwrap();
        let response = terminal.dispatch(&ctx("/ada?tab=drafts")).await.unwrap();
        assert_eq!(response.body(), b"ada:drafts");
    }

    #[tokio::test]
    async fn parameters_default_when_absent() {
        let terminal = Terminal::new("/{username}{queryString}", EchoParams).unwrap();
        let response = terminal.dispatch(&ctx("/ada")).await.unwrap();
        assert_eq!(response.body(), b"ada:-");
    }

    #[tokio::test]
    async fn respond_interrupt_becomes_the_response() {
        let terminal = Terminal::new("/private", RequiresToken).unwrap();

        let response = terminal.dispatch(&ctx("/private")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.body(), b"missing token");
    }

    #[tokio::test]
    async fn cookie_baseline_comes_from_the_request() {
        let terminal = Terminal::new("/private", RequiresToken).unwrap();
        let request = Request::get("/private").with_header("cookie", "token=abc");
        let ctx = RequestContext::new(request, Arc::new(Registry::new()));

        let response = terminal.dispatch(&ctx).await.unwrap();
        assert_eq!(response.body(), b"authorized");
        // Nothing changed relative to the baseline: no cookie header out.
        assert_eq!(response.headers().get("set-cookie"), None);
    }

    #[tokio::test]
    async fn cookie_diff_is_attached_to_the_response() {
        let terminal = Terminal::new("/", SetsCookie).unwrap();
        let response = terminal.dispatch(&ctx("/")).await.unwrap();
        assert_eq!(
            response.headers().get("set-cookie"),
            Some(r#"{"seen":"1"}; Secure"#)
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overlapping_requests_keep_their_own_parameters() {
        let terminal = Arc::new(Terminal::new("/widgets/{id}", SlowReader).unwrap());

        let first = {
            let terminal = Arc::clone(&terminal);
            tokio::spawn(async move { terminal.dispatch(&ctx("/widgets/alpha")).await })
        };
        let second = {
            let terminal = Arc::clone(&terminal);
            tokio::spawn(async move { terminal.dispatch(&ctx("/widgets/beta")).await })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.body(), b"alpha");
        assert_eq!(second.body(), b"beta");
    }
}
