//! PDF rendering of answers.
//!
//! [`PdfRenderer`] implements the pipeline's [`DocumentRenderer`]: each
//! render writes a uniquely named file so concurrent runs never collide,
//! while the attachment keeps the configured display name.

pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use askmail_core::DocumentRenderer;
use askmail_shared::{Artifact, AskmailError, OutputConfig, Result};

/// Writes answers as A4 PDFs into a directory.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    dir: PathBuf,
    file_name: String,
}

impl PdfRenderer {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Renderer configured from the `[output]` section.
    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(output.resolved_dir(), output.file_name.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unique_path(&self) -> PathBuf {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        self.dir.join(format!("{stem}-{}.pdf", uuid::Uuid::now_v7()))
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, title: &str, body: &str) -> Result<Artifact> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            AskmailError::Render(format!("create {}: {e}", self.dir.display()))
        })?;

        let pages = layout::layout(title, body);
        let path = self.unique_path();
        if let Err(e) = pdf::write_pdf(&path, title, &pages) {
            discard_partial(&path);
            return Err(e);
        }

        info!(path = %path.display(), pages = pages.len(), "PDF created");
        Ok(Artifact::pdf(path, self.file_name.clone()))
    }

    fn release(&self, artifact: &Artifact) -> Result<()> {
        let path = artifact.path();
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "temporary file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "artifact already gone");
                Ok(())
            }
            Err(e) => Err(AskmailError::io(path, e)),
        }
    }
}

/// Remove whatever a failed write left behind.
fn discard_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial PDF"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial PDF"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("askmail-artifacts-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn render_writes_loadable_pdf() {
        let dir = temp_dir();
        let renderer = PdfRenderer::new(&dir, "respuesta_ia.pdf");

        let artifact = renderer
            .render("Respuesta a: What is 2+2?...", "4\n\nFour, in words.")
            .unwrap();

        assert!(artifact.resolves());
        assert_eq!(artifact.file_name, "respuesta_ia.pdf");
        assert_eq!(artifact.content_type, "application/pdf");
        assert!(artifact.path.starts_with(&dir));

        let bytes = std::fs::read(&artifact.path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = lopdf::Document::load(&artifact.path).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_answers_span_pages() {
        let dir = temp_dir();
        let renderer = PdfRenderer::new(&dir, "respuesta_ia.pdf");
        let body = (1..=150).map(|i| format!("Línea {i}")).collect::<Vec<_>>().join("\n");

        let artifact = renderer.render("Respuesta a: larga...", &body).unwrap();
        let doc = lopdf::Document::load(&artifact.path).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }

    #[test]
    fn renders_get_distinct_paths() {
        let renderer = PdfRenderer::new(temp_dir(), "respuesta_ia.pdf");
        let a = renderer.render("t", "a").unwrap();
        let b = renderer.render("t", "b").unwrap();
        assert_ne!(a.path, b.path);
        assert_eq!(a.file_name, b.file_name);
    }

    #[test]
    fn release_deletes_and_tolerates_missing_file() {
        let renderer = PdfRenderer::new(temp_dir(), "respuesta_ia.pdf");
        let artifact = renderer.render("t", "body").unwrap();

        renderer.release(&artifact).unwrap();
        assert!(!artifact.resolves());

        renderer.release(&artifact).unwrap();
    }

    #[test]
    fn render_creates_missing_output_dir() {
        let dir = temp_dir().join("nested").join("out");
        let renderer = PdfRenderer::new(&dir, "respuesta_ia.pdf");
        let artifact = renderer.render("t", "body").unwrap();
        assert!(artifact.path.starts_with(&dir));
        assert!(artifact.resolves());
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = temp_dir();
        let blocked = dir.join("blocked.pdf");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep.txt"), b"x").unwrap();

        assert!(pdf::write_pdf(&blocked, "t", &layout::layout("t", "body")).is_err());
        discard_partial(&blocked);
        assert!(blocked.join("keep.txt").is_file());

        let partial = dir.join("partial.pdf");
        std::fs::write(&partial, b"%PDF-1.5 trunc").unwrap();
        discard_partial(&partial);
        assert!(!partial.exists());

        discard_partial(&partial);
    }

    #[test]
    fn render_into_unwritable_dir_reports_render_error() {
        let dir = temp_dir();
        let not_a_dir = dir.join("plain-file");
        std::fs::write(&not_a_dir, b"x").unwrap();

        let renderer = PdfRenderer::new(&not_a_dir, "respuesta_ia.pdf");
        let err = renderer.render("t", "body").unwrap_err();
        assert!(matches!(err, AskmailError::Render(_)));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn from_config_uses_output_section() {
        let output = OutputConfig {
            dir: "/srv/askmail/out".into(),
            file_name: "answer.pdf".into(),
        };
        let renderer = PdfRenderer::from_config(&output);
        assert_eq!(renderer.dir(), Path::new("/srv/askmail/out"));
        assert!(
            renderer
                .unique_path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("answer-") && n.ends_with(".pdf"))
        );
    }
}
