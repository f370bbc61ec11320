//! Failure diagnostics capture.
//!
//! Capture is best-effort by contract: a sink failure is logged and
//! swallowed so it can never mask the stage failure that triggered it.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::browser::BrowserPage;

/// Accepts a visual snapshot and the rendered document on failure.
pub trait DiagnosticSink: Send + Sync {
    fn capture<'a>(
        &'a self,
        page: &'a dyn BrowserPage,
        label: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Writes `<label>.png` and `<label>.html` under one directory.
#[derive(Debug, Clone)]
pub struct FsDiagnosticSink {
    dir: PathBuf,
}

impl FsDiagnosticSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write_artifacts(
        &self,
        page: &dyn BrowserPage,
        label: &str,
    ) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| e.to_string())?;

        let snapshot = page.screenshot().await.map_err(|e| e.to_string())?;
        let png_path = self.dir.join(format!("{label}.png"));
        tokio::fs::write(&png_path, &snapshot)
            .await
            .map_err(|e| e.to_string())?;

        let source = page.page_source().await.map_err(|e| e.to_string())?;
        let html_path = self.dir.join(format!("{label}.html"));
        tokio::fs::write(&html_path, source)
            .await
            .map_err(|e| e.to_string())?;

        tracing::info!(
            png = %png_path.display(),
            html = %html_path.display(),
            "diagnostics captured"
        );
        Ok(())
    }
}

impl DiagnosticSink for FsDiagnosticSink {
    fn capture<'a>(
        &'a self,
        page: &'a dyn BrowserPage,
        label: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if let Err(error) = self.write_artifacts(page, label).await {
                tracing::warn!(label, %error, "diagnostic capture failed");
            }
        })
    }
}

/// Discards captures; used where no diagnostics directory applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn capture<'a>(
        &'a self,
        _page: &'a dyn BrowserPage,
        _label: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}
