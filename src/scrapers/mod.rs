//! Article text extraction.
//!
//! Turning a fetched page into plain article text is site-specific. Each
//! supported site is described by a [`SiteRule`](crate::config::SiteRule)
//! (host, container selectors, selectors of noise to drop) and compiled into
//! a [`site::SiteScraper`]. [`SiteExtractor`] dispatches a page to the
//! scraper whose host matches the article URL.
//!
//! # Recognition
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | No rule for the URL host | [`ExtractError::NotRecognized`] |
//! | Rule found, no container selector matches | [`ExtractError::NotRecognized`] |
//! | Container found | Plain text of the container |

pub mod site;

use crate::config::SiteRule;
use crate::error::Result;
use site::SiteScraper;
use tracing::{debug, instrument};
use url::Url;

/// The page could not be turned into article text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("document layout not recognized")]
    NotRecognized,
}

/// Converts raw markup into plain article text.
pub trait Extractor: Send + Sync {
    fn extract(&self, url: &str, html: &str) -> std::result::Result<String, ExtractError>;
}

/// Host-dispatching extractor built from site rules.
#[derive(Debug)]
pub struct SiteExtractor {
    scrapers: Vec<SiteScraper>,
}

impl SiteExtractor {
    pub fn new(rules: &[SiteRule]) -> Result<Self> {
        let scrapers = rules
            .iter()
            .map(SiteScraper::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { scrapers })
    }

    fn scraper_for(&self, url: &str) -> Option<&SiteScraper> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        self.scrapers.iter().find(|s| s.handles_host(host))
    }
}

impl Extractor for SiteExtractor {
    #[instrument(level = "debug", skip_all, fields(%url))]
    fn extract(&self, url: &str, html: &str) -> std::result::Result<String, ExtractError> {
        let Some(scraper) = self.scraper_for(url) else {
            debug!("No site rule for URL host");
            return Err(ExtractError::NotRecognized);
        };
        scraper.extract(html)
    }
}
