//! Page template loading for `GET /`.
//!
//! The template file is read from disk on every render so it can be edited
//! while the server runs.  Any read failure (missing file, permissions, I/O
//! error) is logged and the embedded fail-safe page is served instead; the
//! browser always gets a page, never an error.

use std::path::{Path, PathBuf};

use lanpaste_core::{substitute_placeholders, ServerConfig};
use thiserror::Error;
use tracing::warn;

/// Failure to read the template file.  Never leaves this module's caller:
/// [`TemplateRenderer::render`] recovers from it.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read HTML template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders the HTML page with the bound host and port filled in.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template_path: PathBuf,
    fail_safe_template: String,
}

impl TemplateRenderer {
    pub fn new(template_path: impl Into<PathBuf>, fail_safe_template: impl Into<String>) -> Self {
        Self {
            template_path: template_path.into(),
            fail_safe_template: fail_safe_template.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.template_path, &config.fail_safe_template)
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Reads the raw template file.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Read`] for any file-system failure.
    pub async fn load(&self) -> Result<String, TemplateError> {
        tokio::fs::read_to_string(&self.template_path)
            .await
            .map_err(|source| TemplateError::Read {
                path: self.template_path.clone(),
                source,
            })
    }

    /// Returns the page with `{{HOST}}` and `{{PORT}}` substituted, falling
    /// back to the fail-safe template if the file cannot be read.
    pub async fn render(&self, host: &str, port: u16) -> String {
        let template = match self.load().await {
            Ok(template) => template,
            Err(e) => {
                warn!("{e}; serving fail-safe template");
                self.fail_safe_template.clone()
            }
        };
        substitute_placeholders(&template, host, port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
