use crate::config::GraphConfig;
use crate::crawler::{select_text, PageContent};
use crate::extractor::{ContentExtractor, ExtractError, Extracted};
use async_trait::async_trait;

/// Returns the page's visible text, or the text under a CSS selector
///
/// The prompt is ignored; this extractor is deterministic and needs no
/// external service.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentExtractor for TextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn extract(
        &self,
        page: &PageContent,
        config: &GraphConfig,
    ) -> Result<Extracted, ExtractError> {
        let text = match config.css_selector() {
            Some(selector) => select_text(&page.html, selector)
                .ok_or_else(|| ExtractError::Selector(selector.to_string()))?,
            None => page.text.clone(),
        };

        Ok(Extracted::Text(text))
    }
}
