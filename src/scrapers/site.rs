//! Selector-driven scraper for a single site.

use crate::config::SiteRule;
use crate::error::{Error, Result};
use crate::scrapers::ExtractError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

/// Elements whose text starts on a new line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "section",
    "article", "header", "figure", "figcaption", "table", "tr",
];

/// A [`SiteRule`] with its selectors parsed.
#[derive(Debug)]
pub struct SiteScraper {
    host: String,
    containers: Vec<Selector>,
    remove: Vec<Selector>,
}

impl SiteScraper {
    pub fn compile(rule: &SiteRule) -> Result<Self> {
        let parse = |selector: &String| {
            Selector::parse(selector).map_err(|_| Error::Selector {
                host: rule.host.clone(),
                selector: selector.clone(),
            })
        };
        Ok(Self {
            host: rule.host.to_ascii_lowercase(),
            containers: rule.selectors.iter().map(parse).collect::<Result<_>>()?,
            remove: rule.remove.iter().map(parse).collect::<Result<_>>()?,
        })
    }

    /// `true` for the rule's host and any of its subdomains.
    pub fn handles_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.host
            || host
                .strip_suffix(&self.host)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    pub fn extract(&self, html: &str) -> std::result::Result<String, ExtractError> {
        let document = Html::parse_document(html);
        let Some(container) = self
            .containers
            .iter()
            .find_map(|selector| document.select(selector).next())
        else {
            debug!(host = %self.host, "Article container not found");
            return Err(ExtractError::NotRecognized);
        };

        let content = self.container_text(container);
        info!(host = %self.host, bytes = content.len(), "Parsed article");
        Ok(content)
    }

    fn container_text(&self, container: ElementRef<'_>) -> String {
        let dropped: HashSet<_> = self
            .remove
            .iter()
            .flat_map(|selector| container.select(selector))
            .map(|element| element.id())
            .collect();

        let mut content = String::new();
        let mut last_block = None;
        for node in container.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if node.ancestors().any(|a| dropped.contains(&a.id())) {
                continue;
            }
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let block = node
                .ancestors()
                .find(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|e| BLOCK_TAGS.contains(&e.name()))
                })
                .map(|a| a.id());
            if !content.is_empty() {
                content.push(if block == last_block { ' ' } else { '\n' });
            }
            last_block = block;
            content.push_str(text);
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(host: &str, selectors: &[&str], remove: &[&str]) -> SiteRule {
        SiteRule {
            host: host.to_string(),
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            remove: remove.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_handles_host() {
        let scraper = SiteScraper::compile(&rule("Example.com", &["main"], &[])).unwrap();
        assert!(scraper.handles_host("example.com"));
        assert!(scraper.handles_host("news.EXAMPLE.com"));
        assert!(!scraper.handles_host("badexample.com"));
        assert!(!scraper.handles_host("example.org"));
    }

    #[test]
    fn test_falls_back_to_second_selector() {
        let scraper = SiteScraper::compile(&rule("example.com", &["article.main", "main"], &[])).unwrap();
        let text = scraper.extract("<main><p>Текст</p></main>").unwrap();
        assert_eq!(text, "Текст");
    }

    #[test]
    fn test_nested_removed_text_is_dropped() {
        let scraper = SiteScraper::compile(&rule("example.com", &["main"], &[".ad"])).unwrap();
        let text = scraper
            .extract("<main><p>один</p><div class=\"ad\"><span><b>реклама</b></span></div><p>два</p></main>")
            .unwrap();
        assert_eq!(text, "один\nдва");
    }

    #[test]
    fn test_inline_text_joined_with_spaces_blocks_with_newlines() {
        let scraper = SiteScraper::compile(&rule("example.com", &["main"], &[])).unwrap();
        let text = scraper
            .extract("<main><h1>Заголовок</h1><p>Первый <b>жирный</b> абзац.</p><p>Второй.</p></main>")
            .unwrap();
        assert_eq!(text, "Заголовок\nПервый жирный абзац.\nВторой.");
    }

    #[test]
    fn test_empty_container_is_recognized() {
        let scraper = SiteScraper::compile(&rule("example.com", &["main"], &[])).unwrap();
        assert_eq!(scraper.extract("<main></main>").unwrap(), "");
    }
}
