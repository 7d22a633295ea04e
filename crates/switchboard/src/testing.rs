//! Synchronous test client.
//!
//! Drives [`App::handle`] to completion on the current thread so tests
//! can make assertions without standing up a runtime or a listener.

use futures_executor::block_on;

use switchboard_core::{DispatchError, Request, Response};

use crate::app::App;

/// A synchronous wrapper around an [`App`] for tests.
#[derive(Debug)]
pub struct TestClient {
    app: App,
}

impl TestClient {
    /// Wrap an app.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Dispatch a GET request for `target`.
    ///
    /// # Errors
    ///
    /// Only when the app was built with error propagation enabled.
    pub fn get(&self, target: &str) -> Result<Response, DispatchError> {
        self.request(Request::get(target))
    }

    /// Dispatch an arbitrary request.
    ///
    /// # Errors
    ///
    /// Only when the app was built with error propagation enabled.
    pub fn request(&self, request: Request) -> Result<Response, DispatchError> {
        block_on(self.app.handle(request))
    }

    /// The wrapped app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }
}
