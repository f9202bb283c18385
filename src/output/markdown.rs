//! Markdown report generation
//!
//! Renders a [`ScrapeResult`] as a human-readable markdown document with the
//! run information, the extracted content and any crawl records.

use crate::extractor::Extracted;
use crate::output::ScrapeResult;
use serde_json::Value;

/// Formats a scrape result as markdown
///
/// # Arguments
///
/// * `result` - The result to render
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown(result: &ScrapeResult) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Graph Scrape Result\n\n");

    // Run information
    md.push_str("## Run Information\n\n");
    if let Some(url) = &result.url {
        md.push_str(&format!("- **URL**: {}\n", url));
    }
    if let Some(strategy) = result.strategy() {
        md.push_str(&format!("- **Strategy**: {}\n", strategy));
    }
    md.push_str(&format!(
        "- **Status**: {}\n",
        if result.success { "success" } else { "failed" }
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        result.duration.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Extracted At**: {}\n",
        result.extracted_at.to_rfc3339()
    ));
    for key in ["pages", "failed"] {
        if let Some(count) = result.metadata.get(key).and_then(Value::as_u64) {
            md.push_str(&format!("- **{}**: {}\n", capitalize(key), count));
        }
    }
    md.push('\n');

    if let Some(error) = &result.error {
        md.push_str("## Error\n\n");
        md.push_str(&format!("{}\n\n", error));
    }

    if !result.content.trim().is_empty() {
        md.push_str("## Content\n\n");
        md.push_str(result.content.trim());
        md.push_str("\n\n");
    }

    if !result.structured_data.is_empty() {
        md.push_str("## Structured Data\n\n");
        md.push_str("| Field | Value |\n");
        md.push_str("|-------|-------|\n");
        for (key, value) in &result.structured_data {
            md.push_str(&format!("| {} | {} |\n", key, table_cell(value)));
        }
        md.push('\n');
    }

    if !result.pages.is_empty() {
        md.push_str("## Crawled Pages\n\n");
        for record in &result.pages {
            md.push_str(&format!("### {} (depth {})\n\n", record.url, record.depth));
            match &record.data {
                Extracted::Text(text) => {
                    md.push_str(text.trim());
                    md.push_str("\n\n");
                }
                Extracted::Structured(map) => {
                    md.push_str("```json\n");
                    md.push_str(&serde_json::to_string_pretty(map).unwrap_or_default());
                    md.push_str("\n```\n\n");
                }
                Extracted::Links(links) => {
                    for link in links {
                        md.push_str(&format!("- {}\n", link));
                    }
                    md.push('\n');
                }
            }
        }
    }

    if !result.links.is_empty() {
        md.push_str(&format!("## Links ({})\n\n", result.links.len()));
        for link in &result.links {
            md.push_str(&format!("- {}\n", link));
        }
        md.push('\n');
    }

    md
}

/// Renders a JSON value on one line, escaping table pipes
fn table_cell(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace('|', "\\|").replace('\n', " ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
