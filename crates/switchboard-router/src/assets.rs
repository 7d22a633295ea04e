//! Static asset catalog builder.
//!
//! Walks a directory at wiring time and emits a router per directory and
//! a fixed-response terminal per file. Bodies are read once, up front —
//! the catalog serves from memory.

use std::fs;
use std::path::Path;

use thiserror::Error;

use switchboard_core::{Response, mime_type_for_extension};

use crate::endpoints::{LocalRedirect, StaticResponse};
use crate::pattern::PatternError;
use crate::router::Router;

/// Failure while building an asset catalog.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Directory enumeration or file read failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A file name produced an uncompilable route.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Build a router serving the contents of `directory` under `route`.
///
/// Subdirectories become nested routers. Every file gets a terminal
/// route with its extension's MIME type (`application/octet-stream`
/// fallback). `.html` files additionally get an extensionless-alias
/// redirect, and `index.html` gets a redirect from the directory root.
/// Entries are registered in name order so the catalog is deterministic.
///
/// # Errors
///
/// [`AssetError`] when the walk, a file read, or a route compile fails.
pub fn asset_router(route: &str, directory: impl AsRef<Path>) -> Result<Router, AssetError> {
    let mut router = Router::new(route)?;

    let mut entries: Vec<fs::DirEntry> =
        fs::read_dir(directory.as_ref())?.collect::<Result<_, _>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            router = router.mount(asset_router(&format!("/{name}"), &path)?);
            continue;
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());
        let content_type = extension
            .as_deref()
            .and_then(mime_type_for_extension)
            .unwrap_or("application/octet-stream");
        let body = fs::read(&path)?;
        tracing::debug!(file = %path.display(), content_type, "cataloged asset");

        router = router.mount(StaticResponse::new(
            &format!("/{name}"),
            Response::ok()
                .with_header("content-type", content_type)
                .body_bytes(body),
        )?);

        if extension.as_deref() == Some("html") {
            let stem = name.strip_suffix(".html").unwrap_or(&name);
            router = router.mount(LocalRedirect::new(&format!("/{stem}"), format!("/{name}"))?);
        }
        if name == "index.html" {
            router = router.mount(LocalRedirect::new("/", "/index.html")?);
        }
    }

    Ok(router)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use switchboard_core::{Registry, Request, RequestContext, StatusCode};

    use super::*;
    use crate::routable::Routable;

    fn ctx(target: &str) -> RequestContext {
        RequestContext::new(Request::get(target), Arc::new(Registry::new()))
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>index</h1>").unwrap();
        fs::write(dir.path().join("about.html"), "<h1>about</h1>").unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        fs::write(dir.path().join("data.qqq"), "opaque").unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.svg"), "<svg/>").unwrap();
        dir
    }

    #[tokio::test]
    async fn serves_files_with_their_mime_types() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let response = router.dispatch(&ctx("/style.css")).await.unwrap();
        assert_eq!(response.headers().get("content-type"), Some("text/css"));
        assert_eq!(response.body(), b"body {}");
    }

    #[tokio::test]
    async fn unknown_extensions_fall_back_to_octet_stream() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let response = router.dispatch(&ctx("/data.qqq")).await.unwrap();
        assert_eq!(
            response.headers().get("content-type"),
            Some("application/octet-stream")
        );
    }

    #[tokio::test]
    async fn subdirectories_become_nested_routers() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let response = router.dispatch(&ctx("/img/logo.svg")).await.unwrap();
        assert_eq!(response.headers().get("content-type"), Some("image/svg+xml"));
        assert_eq!(response.body(), b"<svg/>");
    }

    #[tokio::test]
    async fn html_files_get_extensionless_aliases() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let response = router.dispatch(&ctx("/about")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get("location"), Some("/about.html"));
    }

    #[tokio::test]
    async fn index_html_aliases_the_directory_root() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let response = router.dispatch(&ctx("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get("location"), Some("/index.html"));
    }

    #[tokio::test]
    async fn missing_assets_are_not_found() {
        let dir = fixture();
        let router = asset_router("/", dir.path()).unwrap();

        let err = router.dispatch(&ctx("/missing.png")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
