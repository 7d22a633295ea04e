//! HTTP response types.

use std::sync::Arc;

use serde::Serialize;

use crate::request::Headers;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// 200 OK
    pub const OK: Self = Self(200);
    /// 302 Found
    pub const FOUND: Self = Self(302);
    /// 400 Bad Request
    pub const BAD_REQUEST: Self = Self(400);
    /// 403 Forbidden
    pub const FORBIDDEN: Self = Self(403);
    /// 404 Not Found
    pub const NOT_FOUND: Self = Self(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// The numeric code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The canonical reason phrase for common codes.
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// An opaque response value produced by dispatch.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Create an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Create an empty 200 OK response.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// A 200 response with an HTML body.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("content-type", "text/html")
            .body_text(body)
    }

    /// A 200 response with a JSON body serialized from `value`.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error if `value` cannot be
    /// encoded.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(Self::ok()
            .with_header("content-type", "application/json")
            .body_text(body))
    }

    /// A 302 redirect to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(StatusCode::FOUND).with_header("location", location.into())
    }

    /// Set the status (builder style).
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attach a header (builder style).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set a text body (builder style).
    #[must_use]
    pub fn body_text(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Set a byte body (builder style).
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// A response that can be produced repeatedly: either a fixed value that
/// is cloned per use, or a factory closure invoked per use.
///
/// Used by the fixed-response terminal handler and by the configurable
/// not-found/error responses at the top level.
#[derive(Clone)]
pub enum DefaultResponse {
    /// A fixed response, cloned on each production.
    Fixed(Response),
    /// A factory invoked on each production.
    Factory(Arc<dyn Fn() -> Response + Send + Sync>),
}

impl DefaultResponse {
    /// Wrap a factory closure.
    pub fn from_fn(f: impl Fn() -> Response + Send + Sync + 'static) -> Self {
        Self::Factory(Arc::new(f))
    }

    /// Produce a fresh response.
    #[must_use]
    pub fn produce(&self) -> Response {
        match self {
            Self::Fixed(response) => response.clone(),
            Self::Factory(f) => f(),
        }
    }
}

impl From<Response> for DefaultResponse {
    fn from(response: Response) -> Self {
        Self::Fixed(response)
    }
}

impl std::fmt::Debug for DefaultResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(response) => f.debug_tuple("Fixed").field(response).finish(),
            Self::Factory(_) => f.debug_struct("Factory").finish_non_exhaustive(),
        }
    }
}

/// Look up the MIME type for a file extension (without the leading dot).
///
/// Returns `None` for unknown extensions; callers typically fall back to
/// `application/octet-stream`.
#[must_use]
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "aac" => "audio/aac",
        "avif" => "image/avif",
        "bin" => "application/octet-stream",
        "bmp" => "image/bmp",
        "css" => "text/css",
        "csv" => "text/csv",
        "gif" => "image/gif",
        "gz" => "application/gzip",
        "htm" | "html" => "text/html",
        "ico" => "image/vnd.microsoft.icon",
        "jpeg" | "jpg" => "image/jpeg",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "md" => "text/markdown",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "otf" => "font/otf",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "tar" => "application/x-tar",
        "ttf" => "font/ttf",
        "txt" => "text/plain",
        "wasm" => "application/wasm",
        "wav" => "audio/wav",
        "webm" => "video/webm",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}
