//! Full-text search over the document set, backed by an in-memory Tantivy index.
//!
//! Title, content and platform are indexed. Title and platform matches are
//! boosted (10x and 5x by default), title/content go through an English
//! analyzer (lowercase, stop-words, stemming), and query terms are OR-ed.
//! A selected platform adds an optional boosted clause: its documents rank
//! higher, but strong matches from other platforms still come back.

mod analyzer;

use cdp_assistant_shared::{
    AssistantError, DocumentEntry, PlatformFilter, Result, SearchConfig, SearchResult,
};
use cdp_assistant_store::DocumentStore;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, Schema, TEXT, TextFieldIndexing, TextOptions, Value,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};
use tracing::{debug, info, warn};

/// Heap given to the one-shot index writer.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Characters the query parser reads as syntax (field prefixes, required and
/// excluded terms, boosts, phrases, ranges, fuzziness).
const QUERY_SYNTAX_CHARS: &[char] = &[
    ':', '+', '-', '^', '"', '\'', '(', ')', '[', ']', '{', '}', '~', '*', '!', '\\',
];

// ---------------------------------------------------------------------------
// DocumentSearch
// ---------------------------------------------------------------------------

/// Anything that can rank documents for a free-text question.
pub trait DocumentSearch: Send + Sync {
    /// Ranked results, best first. Failures are logged and yield no results.
    fn search(&self, query: &str, filter: PlatformFilter) -> Vec<SearchResult>;
}

// ---------------------------------------------------------------------------
// SearchIndex
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Fields {
    id: Field,
    title: Field,
    content: Field,
    platform: Field,
}

/// Inverted index over a [`DocumentStore`] snapshot.
pub struct SearchIndex {
    documents: Vec<DocumentEntry>,
    fields: Fields,
    reader: IndexReader,
    parser: QueryParser,
    platform_boost: f32,
    max_results: usize,
}

impl SearchIndex {
    /// Index every document in `store`.
    pub fn build(store: &DocumentStore, config: &SearchConfig) -> Result<Self> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        index
            .tokenizers()
            .register(analyzer::ENGLISH, analyzer::english());

        let mut writer: IndexWriter = index
            .writer(WRITER_HEAP_BYTES)
            .map_err(AssistantError::search)?;

        for (idx, entry) in store.documents().iter().enumerate() {
            writer
                .add_document(doc!(
                    fields.id => idx as u64,
                    fields.title => entry.title.as_str(),
                    fields.content => entry.content.as_str(),
                    fields.platform => entry.platform.as_str()
                ))
                .map_err(AssistantError::search)?;
        }
        writer.commit().map_err(AssistantError::search)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(AssistantError::search)?;

        let mut parser =
            QueryParser::for_index(&index, vec![fields.title, fields.content, fields.platform]);
        parser.set_field_boost(fields.title, config.title_boost);
        parser.set_field_boost(fields.platform, config.platform_boost);

        info!(documents = store.len(), "search index built");

        Ok(Self {
            documents: store.documents().to_vec(),
            fields,
            reader,
            parser,
            platform_boost: config.platform_boost,
            max_results: config.max_results,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Run `query`, favouring `filter`'s platform, returning at most `max_results` hits.
    pub fn try_search(&self, query: &str, filter: PlatformFilter) -> Result<Vec<SearchResult>> {
        if self.max_results == 0 {
            return Ok(Vec::new());
        }

        let (text_query, errors) = self.parser.parse_query_lenient(&plain_terms(query));
        if !errors.is_empty() {
            debug!(query, ?errors, "query parsed leniently");
        }

        let query: Box<dyn Query> = match filter {
            PlatformFilter::All => text_query,
            PlatformFilter::Only(platform) => {
                let term = Term::from_field_text(self.fields.platform, platform.as_str());
                let platform_query: Box<dyn Query> = Box::new(BoostQuery::new(
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
                    self.platform_boost,
                ));
                Box::new(BooleanQuery::new(vec![
                    (Occur::Should, text_query),
                    (Occur::Should, platform_query),
                ]))
            }
        };

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(query.as_ref(), &TopDocs::with_limit(self.max_results))
            .map_err(AssistantError::search)?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let stored: TantivyDocument = searcher.doc(address).map_err(AssistantError::search)?;
            let entry = stored
                .get_first(self.fields.id)
                .and_then(|v| v.as_u64())
                .and_then(|idx| self.documents.get(idx as usize));

            match entry {
                Some(entry) => results.push(SearchResult::from_document(entry, score)),
                None => warn!(?address, "indexed document has no matching store entry"),
            }
        }

        Ok(results)
    }
}

impl DocumentSearch for SearchIndex {
    fn search(&self, query: &str, filter: PlatformFilter) -> Vec<SearchResult> {
        match self.try_search(query, filter) {
            Ok(results) => {
                debug!(query, %filter, hits = results.len(), "search completed");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "search failed");
                Vec::new()
            }
        }
    }
}

/// Blank out query-syntax characters so a question is read as plain terms.
fn plain_terms(query: &str) -> String {
    query.replace(QUERY_SYNTAX_CHARS, " ")
}

fn build_schema() -> (Schema, Fields) {
    let mut builder = Schema::builder();

    let english = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(analyzer::ENGLISH)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );

    let fields = Fields {
        id: builder.add_u64_field("id", STORED),
        title: builder.add_text_field("title", english.clone()),
        content: builder.add_text_field("content", english),
        platform: builder.add_text_field("platform", TEXT),
    };

    (builder.build(), fields)
}
