//! Core domain types shared between the pipeline and its adapters.

use std::path::{Path, PathBuf};

/// MIME type of documents produced by the PDF renderer.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// Handle to a rendered document on disk.
///
/// The handle stays valid until the renderer releases it; after that
/// [`Artifact::resolves`] returns `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the rendered file.
    pub path: PathBuf,
    /// Name presented to the recipient (e.g. `respuesta_ia.pdf`).
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
}

impl Artifact {
    /// Create a handle for a PDF written at `path`.
    pub fn pdf(path: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_name: file_name.into(),
            content_type: PDF_CONTENT_TYPE.to_string(),
        }
    }

    /// Filesystem location of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the handle still points at an existing file.
    pub fn resolves(&self) -> bool {
        self.path.is_file()
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.file_name, self.path.display())
    }
}
