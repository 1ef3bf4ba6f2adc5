//! Core domain logic for the CDP assistant.
//!
//! - [`intent`] — keyword checks for relevance and comparison questions
//! - [`respond`] — turns a question plus search hits into a chat reply
//! - [`scrape`] — crawls every configured platform into the document set
//!
//! [`Assistant`] wires a loaded document set to a search index and responder.

pub mod intent;
pub mod respond;
pub mod scrape;

use std::path::Path;

use cdp_assistant_search::SearchIndex;
use cdp_assistant_shared::{Result, SearchConfig};
use cdp_assistant_store::DocumentStore;

pub use respond::Responder;

/// Responder over an in-memory index of the loaded document set.
pub type Assistant = Responder<SearchIndex>;

/// Load `data_dir` (or the bundled sample set) and build an [`Assistant`] over it.
pub fn load_assistant(data_dir: &Path, search: &SearchConfig) -> Result<(Assistant, DocumentStore)> {
    let store = DocumentStore::load_or_bundled(data_dir)?;
    let index = SearchIndex::build(&store, search)?;
    Ok((Responder::new(index), store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_assistant_shared::{Platform, PlatformFilter};

    #[test]
    fn bundled_assistant_answers_end_to_end() {
        let missing = std::env::temp_dir().join(format!("cdp-core-{}", uuid::Uuid::now_v7()));
        let (assistant, store) = load_assistant(&missing, &SearchConfig::default()).unwrap();
        assert_eq!(store.len(), 8);

        let reply = assistant.generate_response(
            "How do I set up a new source in Segment?",
            PlatformFilter::All,
        );
        assert!(reply.message.content.starts_with("To set up a new source in Segment:"));
        assert!(reply.message.content.ends_with(
            "Source: [Setting up a new source in Segment](https://segment.com/docs/connections/sources/)"
        ));
        assert!(!reply.results.is_empty());
        assert!(reply.results.len() <= 5);
    }

    #[test]
    fn bundled_assistant_compares_platforms() {
        let missing = std::env::temp_dir().join(format!("cdp-core-{}", uuid::Uuid::now_v7()));
        let (assistant, _) = load_assistant(&missing, &SearchConfig::default()).unwrap();

        let reply = assistant.generate_response(
            "How does Segment's audience creation compare to Lytics'?",
            PlatformFilter::All,
        );
        assert!(reply.message.content.starts_with("Based on the documentation:"));
        assert!(reply.message.content.contains("**Lytics**:"));
        assert!(reply.results.iter().any(|r| r.platform == Platform::Lytics));
    }
}
