//! Core domain types: platforms, documents, search hits, and chat messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssistantError;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A customer data platform whose documentation the assistant covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Segment,
    Mparticle,
    Lytics,
    Zeotap,
}

impl Platform {
    /// Every supported platform, in canonical order.
    pub const ALL: [Platform; 4] = [
        Platform::Segment,
        Platform::Mparticle,
        Platform::Lytics,
        Platform::Zeotap,
    ];

    /// Lowercase identifier, as used in file names and the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::Mparticle => "mparticle",
            Self::Lytics => "lytics",
            Self::Zeotap => "zeotap",
        }
    }

    /// Identifier with its first letter upper-cased (`Mparticle`).
    pub fn capitalized(&self) -> String {
        let id = self.as_str();
        let mut chars = id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                AssistantError::validation(format!(
                    "unknown platform '{s}': expected one of segment, mparticle, lytics, zeotap"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// PlatformFilter
// ---------------------------------------------------------------------------

/// Which platforms a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    /// Whether a document from `platform` passes this filter.
    pub fn matches(&self, platform: Platform) -> bool {
        match self {
            Self::All => true,
            Self::Only(p) => *p == platform,
        }
    }

    /// The next filter in selector order: `all → segment → … → zeotap → all`.
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Only(Platform::ALL[0]),
            Self::Only(p) => {
                let idx = Platform::ALL.iter().position(|x| x == p).unwrap_or(0);
                Platform::ALL
                    .get(idx + 1)
                    .map(|p| Self::Only(*p))
                    .unwrap_or(Self::All)
            }
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(p) => write!(f, "{p}"),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

// ---------------------------------------------------------------------------
// Documents and search results
// ---------------------------------------------------------------------------

/// One scraped documentation page, as stored in `<platform>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Page title (first `<h1>`, else `<title>`).
    pub title: String,
    /// Flattened page text.
    pub content: String,
    /// Source URL.
    pub url: String,
    /// Owning platform.
    pub platform: Platform,
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
    pub platform: Platform,
    /// Relevance score from the index (higher is better).
    pub score: f32,
}

impl SearchResult {
    /// Attach a score to a stored document.
    pub fn from_document(doc: &DocumentEntry, score: f32) -> Self {
        Self {
            title: doc.title.clone(),
            content: doc.content.clone(),
            url: doc.url.clone(),
            platform: doc.platform,
            score,
        }
    }

    /// The first `max_chars` characters of the content, with an ellipsis if cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.content.chars().take(max_chars).collect();
        if self.content.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A UUID v7 wrapper for message identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Markdown-flavoured text.
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// A message produced by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
        }
    }
}

/// The assistant's answer plus the ranked results it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: Message,
    pub results: Vec<SearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parsing_is_case_insensitive() {
        assert_eq!("mParticle".parse::<Platform>().unwrap(), Platform::Mparticle);
        assert_eq!(" zeotap ".parse::<Platform>().unwrap(), Platform::Zeotap);
        assert!("hubspot".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_capitalized_keeps_tail() {
        assert_eq!(Platform::Segment.capitalized(), "Segment");
        assert_eq!(Platform::Mparticle.capitalized(), "Mparticle");
    }

    #[test]
    fn platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Lytics).unwrap();
        assert_eq!(json, "\"lytics\"");
    }

    #[test]
    fn filter_parsing_and_matching() {
        let all: PlatformFilter = "ALL".parse().unwrap();
        assert_eq!(all, PlatformFilter::All);
        assert!(all.matches(Platform::Zeotap));

        let only: PlatformFilter = "segment".parse().unwrap();
        assert!(only.matches(Platform::Segment));
        assert!(!only.matches(Platform::Lytics));
        assert_eq!(only.to_string(), "segment");
    }

    #[test]
    fn filter_cycles_through_platforms() {
        let mut filter = PlatformFilter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            filter = filter.next();
            seen.push(filter.to_string());
        }
        assert_eq!(seen, ["segment", "mparticle", "lytics", "zeotap", "all"]);
    }

    #[test]
    fn document_entry_matches_scraped_json() {
        let json = r#"{
            "title": "Creating a destination in Segment",
            "content": "To create a destination in Segment...",
            "url": "https://segment.com/docs/connections/destinations/",
            "platform": "segment"
        }"#;
        let doc: DocumentEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(doc.platform, Platform::Segment);
    }

    #[test]
    fn preview_truncates_long_content() {
        let result = SearchResult {
            title: "t".into(),
            content: "abcdefghij".into(),
            url: "u".into(),
            platform: Platform::Segment,
            score: 1.0,
        };
        assert_eq!(result.preview(4), "abcd...");
        assert_eq!(result.preview(20), "abcdefghij");
    }

    #[test]
    fn message_constructors_set_role() {
        let user = Message::user("how do I add a source?");
        let bot = Message::assistant("like this");
        assert_eq!(user.role, Role::User);
        assert_eq!(bot.role, Role::Assistant);
        assert_ne!(user.id, bot.id);
    }
}
