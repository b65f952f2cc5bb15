//! Analysis configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```yaml
//! punctuation: "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~«»…“”„"
//! short_word_exceptions: ["не"]
//! max_urls_per_request: 10
//! sites:
//!   - host: inosmi.ru
//!     selectors: ["div.layout-article", "article.article"]
//!     remove: ["aside", "footer", "script", "style"]
//! urls:
//!   - https://inosmi.ru/20240629/assanzh-269370889.html
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// ASCII punctuation plus the typographic quotes and ellipsis common in news copy.
pub const DEFAULT_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~«»…“”„";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Characters stripped from both ends of every token before normalization.
    pub punctuation: String,
    /// Normalized words kept even though they are two characters or shorter.
    pub short_word_exceptions: Vec<String>,
    /// Upper bound on URLs in a single HTTP request.
    pub max_urls_per_request: usize,
    /// Site-specific extraction rules.
    pub sites: Vec<SiteRule>,
    /// URLs analyzed by `batch` when none are given on the command line.
    pub urls: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            punctuation: DEFAULT_PUNCTUATION.to_string(),
            short_word_exceptions: vec!["не".to_string()],
            max_urls_per_request: 10,
            sites: vec![SiteRule::inosmi()],
            urls: Vec::new(),
        }
    }
}

/// How to find the article body on one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRule {
    /// Host name; subdomains match too.
    pub host: String,
    /// Candidate selectors for the article container, tried in order.
    pub selectors: Vec<String>,
    /// Selectors for elements inside the container whose text is dropped.
    #[serde(default)]
    pub remove: Vec<String>,
}

impl SiteRule {
    pub fn inosmi() -> Self {
        Self {
            host: "inosmi.ru".to_string(),
            selectors: vec![
                "div.layout-article".to_string(),
                "article.article".to_string(),
            ],
            remove: vec![
                "aside".to_string(),
                "footer".to_string(),
                "script".to_string(),
                "style".to_string(),
                ".article-disclaimer".to_string(),
                ".article__info".to_string(),
            ],
        }
    }
}

impl AnalyzerConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            sites = config.sites.len(),
            urls = config.urls.len(),
            "Loaded analyzer config"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.short_word_exceptions, vec!["не"]);
        assert_eq!(config.max_urls_per_request, 10);
        assert!(config.punctuation.contains('«'));
        assert!(config.punctuation.contains('…'));
        assert_eq!(config.sites[0].host, "inosmi.ru");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = AnalyzerConfig::from_yaml("max_urls_per_request: 3\n").unwrap();
        assert_eq!(config.max_urls_per_request, 3);
        assert_eq!(config.punctuation, DEFAULT_PUNCTUATION);
        assert_eq!(config.sites, vec![SiteRule::inosmi()]);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AnalyzerConfig::from_yaml("  \n").unwrap(), AnalyzerConfig::default());
    }

    #[test]
    fn test_sites_without_remove() {
        let raw = "sites:\n  - host: example.com\n    selectors: [\"main\"]\n";
        let config = AnalyzerConfig::from_yaml(raw).unwrap();
        assert_eq!(config.sites.len(), 1);
        assert!(config.sites[0].remove.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "urls:\n  - https://example.com/a\nshort_word_exceptions: []").unwrap();
        let config = AnalyzerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.urls, vec!["https://example.com/a"]);
        assert!(config.short_word_exceptions.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalyzerConfig::load(Some(Path::new("/nonexistent/analyzer.yaml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_urls_per_request: [not a number]").unwrap();
        let err = AnalyzerConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }
}
