//! Error taxonomy for dispatch and collaborators.
//!
//! `NotFound` is the one recoverable variant: routers catch it and try
//! the next sibling, and only the top level converts it into a response.
//! Everything else aborts the request and propagates to the top level,
//! where it is substituted with the configured error response (or allowed
//! to terminate the serving loop, depending on configuration).

use thiserror::Error;

/// Failure of a dispatch attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No routable matched at this level or any descendant.
    #[error("no route matched the requested path")]
    NotFound,

    /// A session collaborator failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A template collaborator failure.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A handler-specific failure with no finer-grained classification.
    #[error("handler failure: {0}")]
    Handler(String),
}

impl DispatchError {
    /// True if this is the recoverable not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Session store failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session store was configured in the registry.
    #[error("no session store is configured")]
    Unconfigured,

    /// The stored value for this session id is not the expected shape.
    #[error("stored session `{id}` has an incompatible shape")]
    TypeConflict {
        /// The offending session id.
        id: String,
    },

    /// The backing store failed.
    #[error("session backend failure: {0}")]
    Backend(String),
}

/// Template rendering failures. Fatal for the request that triggered them.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template engine was configured in the registry.
    #[error("no template engine is configured")]
    Unconfigured,

    /// The named template does not exist.
    #[error("unknown template `{0}`")]
    Unknown(String),

    /// The engine failed while rendering.
    #[error("template `{name}` failed to render: {message}")]
    Render {
        /// The template name.
        name: String,
        /// Engine-supplied detail.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recoverable() {
        assert!(DispatchError::NotFound.is_not_found());
        assert!(!DispatchError::Handler("boom".into()).is_not_found());
    }

    #[test]
    fn session_error_converts() {
        let err: DispatchError = SessionError::TypeConflict { id: "abc".into() }.into();
        assert_eq!(
            err.to_string(),
            "stored session `abc` has an incompatible shape"
        );
    }
}
