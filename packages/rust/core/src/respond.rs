//! Response generation: relevance gate → search → answer text + sources.

use cdp_assistant_search::DocumentSearch;
use cdp_assistant_shared::{ChatReply, Message, Platform, PlatformFilter, SearchResult};
use tracing::{debug, instrument};

use crate::intent::{is_comparison_question, is_relevant_question};

pub const WELCOME_TEXT: &str = "Hi! I'm your CDP support assistant. I can help with questions \
about Segment, mParticle, Lytics, and Zeotap. How can I help you today?";

pub const REFUSAL_TEXT: &str = "I'm a CDP support chatbot and can only answer questions related \
to Customer Data Platforms like Segment, mParticle, Lytics, and Zeotap. Please ask me how to \
perform specific tasks in these platforms.";

pub const NOT_FOUND_TEXT: &str = "I couldn't find specific information about that. Could you \
rephrase your question or be more specific about what you're trying to do with the CDP?";

pub const ERROR_TEXT: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

const COMPARISON_INTRO: &str = "Based on the documentation:\n\n";

const COMPARISON_OUTRO: &str = "In comparison, the platforms differ in their user interface and \
specific steps, but the general process follows similar patterns across all CDPs.";

/// Answers questions from a search backend.
pub struct Responder<S> {
    search: S,
}

impl<S: DocumentSearch> Responder<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }

    /// The underlying search backend.
    pub fn search_backend(&self) -> &S {
        &self.search
    }

    /// Build the assistant's reply to `question`.
    ///
    /// Irrelevant questions get a refusal, questions with no hits get a
    /// "couldn't find" message; both carry no results. Otherwise the answer is
    /// the top hit's content (or a per-platform comparison) plus a source link.
    #[instrument(skip_all, fields(%filter))]
    pub fn generate_response(&self, question: &str, filter: PlatformFilter) -> ChatReply {
        if !is_relevant_question(question) {
            debug!("question not CDP-related");
            return ChatReply {
                message: Message::assistant(REFUSAL_TEXT),
                results: Vec::new(),
            };
        }

        let results = self.search.search(question, filter);
        let Some(top) = results.first() else {
            debug!("no matching documents");
            return ChatReply {
                message: Message::assistant(NOT_FOUND_TEXT),
                results: Vec::new(),
            };
        };

        let mut content = if is_comparison_question(question) {
            debug!("answering as comparison");
            generate_comparison_response(&results)
        } else {
            top.content.clone()
        };
        content.push_str(&source_line(top));

        ChatReply {
            message: Message::assistant(content),
            results,
        }
    }
}

/// One paragraph per platform (its best hit), in order of first appearance.
pub fn generate_comparison_response(results: &[SearchResult]) -> String {
    let mut best_per_platform: Vec<(Platform, &SearchResult)> = Vec::new();
    for result in results {
        if !best_per_platform.iter().any(|(p, _)| *p == result.platform) {
            best_per_platform.push((result.platform, result));
        }
    }

    let mut text = String::from(COMPARISON_INTRO);
    for (platform, result) in best_per_platform {
        text.push_str(&format!(
            "**{}**:\n{}\n\n",
            platform.capitalized(),
            result.content
        ));
    }
    text.push_str(COMPARISON_OUTRO);
    text
}

/// Post a result picked from the related-documents list as an assistant message.
pub fn select_result(result: &SearchResult) -> Message {
    Message::assistant(format!("{}{}", result.content, source_line(result)))
}

/// Greeting shown at the start of a conversation.
pub fn welcome_message() -> Message {
    Message::assistant(WELCOME_TEXT)
}

/// Shown when answering fails unexpectedly.
pub fn error_message() -> Message {
    Message::assistant(ERROR_TEXT)
}

fn source_line(result: &SearchResult) -> String {
    format!("\n\nSource: [{}]({})", result.title, result.url)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use cdp_assistant_shared::Role;

    /// Returns canned results and remembers what it was asked.
    struct CannedSearch {
        results: Vec<SearchResult>,
        calls: Mutex<Vec<(String, PlatformFilter)>>,
    }

    impl CannedSearch {
        fn new(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl DocumentSearch for CannedSearch {
        fn search(&self, query: &str, filter: PlatformFilter) -> Vec<SearchResult> {
            self.calls.lock().unwrap().push((query.to_string(), filter));
            self.results.clone()
        }
    }

    fn hit(title: &str, platform: Platform, score: f32) -> SearchResult {
        SearchResult {
            title: title.into(),
            content: format!("{title} steps."),
            url: format!("https://docs.example.com/{}", platform.as_str()),
            platform,
            score,
        }
    }

    #[test]
    fn irrelevant_question_is_refused_without_searching() {
        let responder = Responder::new(CannedSearch::new(vec![hit("A", Platform::Segment, 1.0)]));
        let reply = responder.generate_response("Tell me a joke", PlatformFilter::All);

        assert_eq!(reply.message.content, REFUSAL_TEXT);
        assert_eq!(reply.message.role, Role::Assistant);
        assert!(reply.results.is_empty());
        assert!(responder.search_backend().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn no_results_gives_not_found() {
        let responder = Responder::new(CannedSearch::new(Vec::new()));
        let reply = responder.generate_response(
            "How do I configure a destination?",
            PlatformFilter::Only(Platform::Zeotap),
        );

        assert_eq!(reply.message.content, NOT_FOUND_TEXT);
        assert!(reply.results.is_empty());

        let calls = responder.search_backend().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, PlatformFilter::Only(Platform::Zeotap));
    }

    #[test]
    fn answer_is_top_result_with_source() {
        let results = vec![
            hit("Creating a destination", Platform::Segment, 9.0),
            hit("Setting up an input", Platform::Mparticle, 2.0),
        ];
        let responder = Responder::new(CannedSearch::new(results));
        let reply =
            responder.generate_response("How do I add a destination?", PlatformFilter::All);

        assert_eq!(
            reply.message.content,
            "Creating a destination steps.\n\n\
             Source: [Creating a destination](https://docs.example.com/segment)"
        );
        assert_eq!(reply.results.len(), 2);
    }

    #[test]
    fn comparison_question_groups_by_platform() {
        let results = vec![
            hit("Lytics audiences", Platform::Lytics, 9.0),
            hit("Segment audiences", Platform::Segment, 8.0),
            hit("Lytics streams", Platform::Lytics, 7.0),
        ];
        let responder = Responder::new(CannedSearch::new(results));
        let reply = responder.generate_response(
            "How does Segment's audience creation compare to Lytics'?",
            PlatformFilter::All,
        );

        let expected = "Based on the documentation:\n\n\
            **Lytics**:\nLytics audiences steps.\n\n\
            **Segment**:\nSegment audiences steps.\n\n\
            In comparison, the platforms differ in their user interface and specific steps, \
            but the general process follows similar patterns across all CDPs.\n\n\
            Source: [Lytics audiences](https://docs.example.com/lytics)";
        assert_eq!(reply.message.content, expected);
    }

    #[test]
    fn comparison_text_capitalizes_first_letter_only() {
        let text = generate_comparison_response(&[hit("Inputs", Platform::Mparticle, 1.0)]);
        assert!(text.contains("**Mparticle**:\nInputs steps.\n\n"));
        assert!(text.starts_with(COMPARISON_INTRO));
        assert!(text.ends_with(COMPARISON_OUTRO));
    }

    #[test]
    fn selected_result_becomes_assistant_message() {
        let msg = select_result(&hit("Streams", Platform::Lytics, 1.0));
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(
            msg.content,
            "Streams steps.\n\nSource: [Streams](https://docs.example.com/lytics)"
        );
    }

    #[test]
    fn canned_messages() {
        assert!(welcome_message().content.starts_with("Hi! I'm your CDP support assistant."));
        assert_eq!(error_message().content, ERROR_TEXT);
    }
}
