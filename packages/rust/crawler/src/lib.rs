//! Documentation crawler and page text extraction.
//!
//! This crate provides:
//! - [`engine`] — breadth-first, page-capped crawler over one documentation site
//! - [`extract`] — title/text/link extraction from fetched HTML

pub mod engine;
pub mod extract;

pub use engine::{CrawlResult, Crawler, FetchedPage, scrape_page};
pub use extract::{ExtractedPage, extract_content, extract_links, extract_page, extract_title};
