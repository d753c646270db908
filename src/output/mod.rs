//! Output module for rendering results
//!
//! This module handles:
//! - Pretty JSON for every result type
//! - Markdown reports for crawl and comparison results
//! - Writing the rendered text to stdout or a file

mod markdown;
mod traits;

pub use markdown::{format_comparison_report, format_crawl_report};
pub use traits::{OutputError, OutputResult, Report};

use std::io::Write;
use std::path::Path;

/// Output format selected by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// Renders a result in the requested format
///
/// # Returns
///
/// * `Ok(String)` - The rendered text
/// * `Err(OutputError)` - Serialization failed, or the result has no markdown form
pub fn render<R: Report>(report: &R, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Markdown => report
            .to_markdown()
            .ok_or_else(|| OutputError::Unsupported(report.kind())),
    }
}

/// Renders a result and writes it to `output_path`, or stdout when absent
pub fn write_report<R: Report>(
    report: &R,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> OutputResult<()> {
    let mut text = render(report, format)?;
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match output_path {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!("Wrote {} report to {}", report.kind(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
