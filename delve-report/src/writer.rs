//! Report persistence into the reports directory

use crate::render::render_document;
use chrono::Local;
use delve_core::{DelveError, DelveResult, ErrorContext, OutputConfig, ReportFormat};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// On-disk form of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Markdown,
    Html,
}

impl ReportKind {
    /// Kinds written for a configured output format
    pub fn for_format(format: ReportFormat) -> &'static [ReportKind] {
        match format {
            ReportFormat::Markdown => &[ReportKind::Markdown],
            ReportFormat::Html => &[ReportKind::Html],
            ReportFormat::Both => &[ReportKind::Markdown, ReportKind::Html],
        }
    }

    fn file_name(&self, timestamp: &str) -> String {
        match self {
            ReportKind::Markdown => format!("research_report_{}.md", timestamp),
            ReportKind::Html => format!("report_{}.html", timestamp),
        }
    }
}

/// Writes timestamped report files into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_output_config(config: &OutputConfig) -> Self {
        Self::new(&config.reports_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `text` as-is; the directory is created on demand
    ///
    /// Two writes of the same kind within one second share a file name and the
    /// later one wins.
    pub async fn persist(&self, text: &str, kind: ReportKind) -> DelveResult<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| report_io_error("create reports directory", &self.dir, e))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.dir.join(kind.file_name(&timestamp));

        fs::write(&path, text)
            .await
            .map_err(|e| report_io_error("write report", &path, e))?;

        info!("Report saved to: {}", path.display());
        Ok(path)
    }

    /// Persist a markdown report in every form `format` asks for
    ///
    /// Paths come back in [`ReportKind::for_format`] order.
    pub async fn persist_report(
        &self,
        markdown: &str,
        format: ReportFormat,
    ) -> DelveResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for kind in ReportKind::for_format(format) {
            let path = match kind {
                ReportKind::Markdown => self.persist(markdown, *kind).await?,
                ReportKind::Html => {
                    debug!("Rendering report as HTML");
                    self.persist(&render_document(markdown), *kind).await?
                }
            };
            paths.push(path);
        }
        Ok(paths)
    }
}

fn report_io_error(operation: &str, path: &Path, error: std::io::Error) -> DelveError {
    DelveError::Report {
        message: format!("Failed to {}: {}", operation, error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("report_writer")
            .with_operation(operation)
            .with_metadata("path", &path.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_kind() {
        assert_eq!(
            ReportKind::Markdown.file_name("20240101_120000"),
            "research_report_20240101_120000.md"
        );
        assert_eq!(
            ReportKind::Html.file_name("20240101_120000"),
            "report_20240101_120000.html"
        );
    }

    #[test]
    fn both_writes_markdown_first() {
        assert_eq!(
            ReportKind::for_format(ReportFormat::Both),
            &[ReportKind::Markdown, ReportKind::Html]
        );
    }
}
