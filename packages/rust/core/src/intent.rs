//! Keyword-based question classification.
//!
//! Plain substring containment on the lower-cased question; no tokenization.

use cdp_assistant_shared::Platform;

/// Terms that mark a question as CDP-related.
const CDP_KEYWORDS: &[&str] = &[
    "segment",
    "mparticle",
    "lytics",
    "zeotap",
    "cdp",
    "customer data platform",
    "source",
    "destination",
    "audience",
    "integration",
    "tracking",
    "event",
    "user profile",
    "data stream",
    "campaign",
    "identity",
];

/// Terms that mark a question as asking for a comparison.
const COMPARISON_KEYWORDS: &[&str] = &[
    "compare",
    "comparison",
    "versus",
    "vs",
    "difference",
    "different",
    "better",
    "best",
    "worse",
    "worst",
];

/// Whether the assistant should try to answer `question` at all.
///
/// Any CDP keyword qualifies, as does any "how"/"what" question.
pub fn is_relevant_question(question: &str) -> bool {
    let q = question.to_lowercase();
    CDP_KEYWORDS.iter().any(|k| q.contains(k)) || q.contains("how") || q.contains("what")
}

/// Platforms named in `question`, in canonical order.
pub fn mentioned_platforms(question: &str) -> Vec<Platform> {
    let q = question.to_lowercase();
    Platform::ALL
        .into_iter()
        .filter(|p| q.contains(p.as_str()))
        .collect()
}

/// A comparison keyword plus at least two platform names.
pub fn is_comparison_question(question: &str) -> bool {
    let q = question.to_lowercase();
    COMPARISON_KEYWORDS.iter().any(|k| q.contains(k)) && mentioned_platforms(&q).len() > 1
}
