//! Output module for scrape results
//!
//! This module handles:
//! - The aggregate [`ScrapeResult`] returned by every strategy
//! - Rendering results as plain text, markdown or JSON
//! - Writing rendered results to stdout or a file

mod markdown;
mod result;

pub use markdown::format_markdown;
pub use result::ScrapeResult;

use crate::extractor::Extracted;
use crate::ScrapeError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Output rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Renders a result in the requested format
pub fn render(result: &ScrapeResult, format: OutputFormat) -> Result<String, ScrapeError> {
    match format {
        OutputFormat::Text => Ok(format_text(result)),
        OutputFormat::Markdown => Ok(format_markdown(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}

/// Formats the result's payload as plain text
///
/// Shows the content when present; otherwise falls back to structured data,
/// crawl records and links, in that order. Failures print the error.
pub fn format_text(result: &ScrapeResult) -> String {
    if !result.success {
        return format!(
            "Error: {}\n",
            result.error.as_deref().unwrap_or("scrape failed")
        );
    }

    if !result.content.trim().is_empty() {
        return format!("{}\n", result.content.trim_end());
    }

    if !result.structured_data.is_empty() {
        return format!(
            "{}\n",
            serde_json::to_string_pretty(&result.structured_data).unwrap_or_default()
        );
    }

    if !result.pages.is_empty() {
        let sections: Vec<String> = result
            .pages
            .iter()
            .map(|record| {
                let body = match &record.data {
                    Extracted::Text(text) => text.trim().to_string(),
                    other => other.to_text(),
                };
                format!("[depth {}] {}\n{}", record.depth, record.url, body)
            })
            .collect();
        return format!("{}\n", sections.join("\n\n"));
    }

    result
        .links
        .iter()
        .map(|link| format!("{}\n", link))
        .collect()
}

/// Writes a rendered result to `path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(ScrapeError)` - Rendering or writing failed
pub fn write_result(result: &ScrapeResult, format: OutputFormat, path: &Path) -> Result<(), ScrapeError> {
    let rendered = render(result, format)?;

    let mut file = File::create(path)?;
    file.write_all(rendered.as_bytes())?;

    tracing::info!("Wrote result to {}", path.display());
    Ok(())
}
