//! Static document set: the crawler's JSON output, loaded at start-up.
//!
//! Each platform has one `<platform>.json` file holding an array of
//! [`DocumentEntry`] values. [`DocumentStore`] concatenates them in canonical
//! platform order; the position of a document in that list is its stable ref
//! for the search index.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cdp_assistant_shared::{AssistantError, DocumentEntry, Platform, PlatformFilter, Result};
use tracing::{debug, info, warn};

/// Sample documents compiled into the binary, used before the first scrape.
const BUNDLED_JSON: &str = include_str!("../data/bundled.json");

/// In-memory document set.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<DocumentEntry>,
}

impl DocumentStore {
    /// Wrap an existing list of documents.
    pub fn new(documents: Vec<DocumentEntry>) -> Self {
        Self { documents }
    }

    /// Load every `<platform>.json` present in `dir`. Missing files are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut documents = Vec::new();

        for platform in Platform::ALL {
            let path = platform_file(dir, platform);
            if !path.exists() {
                debug!(?path, "no document file for platform");
                continue;
            }

            let docs = read_platform_file(&path)?;
            if let Some(stray) = docs.iter().find(|d| d.platform != platform) {
                warn!(
                    ?path,
                    expected = %platform,
                    found = %stray.platform,
                    "document file contains entries for another platform"
                );
            }
            debug!(?path, count = docs.len(), "loaded document file");
            documents.extend(docs);
        }

        info!(dir = %dir.display(), count = documents.len(), "document set loaded");
        Ok(Self { documents })
    }

    /// The built-in sample set (two pages per platform).
    pub fn bundled() -> Result<Self> {
        let documents: Vec<DocumentEntry> = serde_json::from_str(BUNDLED_JSON)
            .map_err(|e| AssistantError::parse(format!("bundled document set: {e}")))?;
        Ok(Self { documents })
    }

    /// Load `dir`, falling back to the bundled sample set if it has no documents.
    pub fn load_or_bundled(dir: &Path) -> Result<Self> {
        let store = Self::load_dir(dir)?;
        if store.is_empty() {
            warn!(
                dir = %dir.display(),
                "no scraped documents found, using bundled sample set"
            );
            return Self::bundled();
        }
        Ok(store)
    }

    /// All documents, in load order.
    pub fn documents(&self) -> &[DocumentEntry] {
        &self.documents
    }

    /// Document at `idx` (the search index's ref).
    pub fn get(&self, idx: usize) -> Option<&DocumentEntry> {
        self.documents.get(idx)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents passing `filter`, in load order.
    pub fn by_platform(&self, filter: PlatformFilter) -> impl Iterator<Item = &DocumentEntry> {
        self.documents
            .iter()
            .filter(move |d| filter.matches(d.platform))
    }

    /// Number of documents per platform. Platforms with none are reported as 0.
    pub fn count_by_platform(&self) -> BTreeMap<Platform, usize> {
        let mut counts: BTreeMap<Platform, usize> =
            Platform::ALL.into_iter().map(|p| (p, 0)).collect();
        for doc in &self.documents {
            *counts.entry(doc.platform).or_insert(0) += 1;
        }
        counts
    }
}

/// Path of the document file for `platform` inside `dir`.
pub fn platform_file(dir: &Path, platform: Platform) -> PathBuf {
    dir.join(format!("{}.json", platform.as_str()))
}

/// Write `docs` as pretty-printed JSON to `<dir>/<platform>.json`.
/// Creates `dir` if needed and returns the written path.
pub fn write_platform(dir: &Path, platform: Platform, docs: &[DocumentEntry]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| AssistantError::io(dir, e))?;

    let path = platform_file(dir, platform);
    let json = serde_json::to_string_pretty(docs)
        .map_err(|e| AssistantError::parse(format!("serialize {platform} documents: {e}")))?;
    std::fs::write(&path, json).map_err(|e| AssistantError::io(&path, e))?;

    info!(?path, count = docs.len(), "saved document file");
    Ok(path)
}

fn read_platform_file(path: &Path) -> Result<Vec<DocumentEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| AssistantError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| AssistantError::parse(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cdp-store-{label}-{}", uuid::Uuid::now_v7()))
    }

    fn doc(title: &str, platform: Platform) -> DocumentEntry {
        DocumentEntry {
            title: title.into(),
            content: format!("{title} content"),
            url: format!("https://docs.example.com/{}", title.to_lowercase()),
            platform,
        }
    }

    #[test]
    fn bundled_set_covers_every_platform() {
        let store = DocumentStore::bundled().expect("bundled set parses");
        assert_eq!(store.len(), 8);
        let counts = store.count_by_platform();
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn write_then_load_keeps_platform_order() {
        let dir = temp_dir("order");

        // Written out of order; loading follows canonical platform order.
        write_platform(&dir, Platform::Zeotap, &[doc("Zeta", Platform::Zeotap)]).unwrap();
        write_platform(&dir, Platform::Segment, &[doc("Alpha", Platform::Segment)]).unwrap();

        let store = DocumentStore::load_dir(&dir).unwrap();
        let titles: Vec<&str> = store.documents().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Zeta"]);

        let counts = store.count_by_platform();
        assert_eq!(counts[&Platform::Mparticle], 0);
        assert_eq!(counts[&Platform::Zeotap], 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn written_file_is_pretty_json_array() {
        let dir = temp_dir("pretty");
        let path = write_platform(&dir, Platform::Lytics, &[doc("Streams", Platform::Lytics)])
            .unwrap();

        assert!(path.ends_with("lytics.json"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n"));
        assert!(raw.contains("\"platform\": \"lytics\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_dir_falls_back_to_bundled() {
        let dir = temp_dir("empty");
        let store = DocumentStore::load_or_bundled(&dir).unwrap();
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = temp_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("segment.json"), "{ not json").unwrap();

        let err = DocumentStore::load_dir(&dir).unwrap_err();
        assert!(matches!(err, AssistantError::Parse { .. }));
        assert!(err.to_string().contains("segment.json"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn by_platform_filters() {
        let store = DocumentStore::new(vec![
            doc("A", Platform::Segment),
            doc("B", Platform::Lytics),
            doc("C", Platform::Segment),
        ]);
        let segment: Vec<&str> = store
            .by_platform(PlatformFilter::Only(Platform::Segment))
            .map(|d| d.title.as_str())
            .collect();
        assert_eq!(segment, ["A", "C"]);
        assert_eq!(store.by_platform(PlatformFilter::All).count(), 3);
        assert_eq!(store.get(1).map(|d| d.title.as_str()), Some("B"));
    }
}
