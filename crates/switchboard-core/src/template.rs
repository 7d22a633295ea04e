//! Template rendering collaborator.
//!
//! Rendering is injected: the engine only ever calls
//! `render(name, context)` while building a response body, and treats a
//! failure as unrecoverable for that request. [`TemplateSet`] is a small
//! built-in engine — preloaded text with `{{key}}` interpolation — meant
//! for tests and minimal deployments; anything richer goes behind the
//! [`TemplateEngine`] trait.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::TemplateError;

/// Renders a named template against a JSON context.
pub trait TemplateEngine: Send + Sync {
    /// Render `name` with `context`.
    fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError>;
}

/// A preloaded set of templates with `{{key}}` interpolation.
///
/// Keys are looked up in the top level of the context object; string
/// values are inserted verbatim, other values via their JSON encoding.
/// Placeholders with no matching key are left untouched.
#[derive(Debug, Default)]
pub struct TemplateSet {
    templates: HashMap<String, String>,
}

impl TemplateSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template (builder style).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }

    /// Load every `*.{extension}` file under `dir` (recursively).
    ///
    /// Template names are the file paths relative to `dir`, joined with
    /// `/`, without the extension — `views/user/home.tmpl` loads as
    /// `user/home`.
    pub fn load_dir(dir: impl AsRef<Path>, extension: &str) -> io::Result<Self> {
        let mut set = Self::new();
        Self::load_into(&mut set, dir.as_ref(), "", extension)?;
        Ok(set)
    }

    fn load_into(set: &mut Self, dir: &Path, prefix: &str, extension: &str) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                let nested = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}/{name}")
                };
                Self::load_into(set, &path, &nested, extension)?;
                continue;
            }
            let Some(stem) = name.strip_suffix(&format!(".{extension}")) else {
                continue;
            };
            let template_name = if prefix.is_empty() {
                stem.to_string()
            } else {
                format!("{prefix}/{stem}")
            };
            set.templates.insert(template_name, fs::read_to_string(&path)?);
        }
        Ok(())
    }

    fn interpolate(text: &str, context: &Value) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = after[..end].trim();
            match context.get(key) {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl TemplateEngine for TemplateSet {
    fn render(&self, name: &str, context: &Value) -> Result<String, TemplateError> {
        let text = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::Unknown(name.to_string()))?;
        Ok(Self::interpolate(text, context))
    }
}
