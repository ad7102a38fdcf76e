//! PDF rendering through a headless Chromium

use async_trait::async_trait;
use chrono::NaiveDate;
use smat_common::time::compact_date;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF workspace error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser exited with {status}: {stderr}")]
    Browser { status: String, stderr: String },

    #[error("PDF rendering timed out after {0} seconds")]
    Timeout(u64),

    #[error("browser produced an empty PDF")]
    Empty,
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Print a complete HTML document to PDF bytes
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, PdfError>;
}

/// Download filename for a company's report on a date
///
/// `"Apex Manufacturing, Inc."` on 2025-03-05 gives
/// `Sustainability_Report_Apex_Manufacturing_Inc._20250305.pdf`.
pub fn pdf_filename(company: &str, date: NaiveDate) -> String {
    let company: String = company
        .trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') => Some(c),
            _ => None,
        })
        .collect();
    format!("Sustainability_Report_{}_{}.pdf", company, compact_date(date))
}

pub struct ChromiumPdfRenderer {
    binary: PathBuf,
    timeout_secs: u64,
}

impl ChromiumPdfRenderer {
    pub fn new(binary: PathBuf, timeout_secs: u64) -> Self {
        Self {
            binary,
            timeout_secs,
        }
    }
}

#[async_trait]
impl PdfRenderer for ChromiumPdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>, PdfError> {
        // Removed with its contents when dropped
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("report.html");
        let output = workdir.path().join("report.pdf");
        tokio::fs::write(&input, html).await?;

        debug!(binary = %self.binary.display(), "Printing report to PDF");
        let run = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = timeout(Duration::from_secs(self.timeout_secs), run)
            .await
            .map_err(|_| PdfError::Timeout(self.timeout_secs))??;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!(status = %result.status, "Browser failed to print PDF");
            return Err(PdfError::Browser {
                status: result.status.to_string(),
                stderr,
            });
        }

        let bytes = tokio::fs::read(&output).await?;
        if bytes.is_empty() {
            return Err(PdfError::Empty);
        }
        debug!(bytes = bytes.len(), "PDF rendered");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(
            pdf_filename("Apex Manufacturing", date),
            "Sustainability_Report_Apex_Manufacturing_20250305.pdf"
        );
        assert_eq!(
            pdf_filename("Acme, Inc", date),
            "Sustainability_Report_Acme_Inc_20250305.pdf"
        );
        // Header-breaking characters never reach Content-Disposition
        assert_eq!(
            pdf_filename(r#"<iframe src="file:///etc/passwd"></iframe>"#, date),
            "Sustainability_Report_iframe_srcfileetcpasswdiframe_20250305.pdf"
        );
    }

    #[tokio::test]
    async fn test_missing_browser_is_io_error() {
        let renderer = ChromiumPdfRenderer::new(
            PathBuf::from("/nonexistent/smat-test-chromium"),
            5,
        );
        let err = renderer.render_pdf("<html></html>").await.unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
    }
}
