//! In-memory document store with naive term-overlap ranking.

use mcommon::BoxFuture;

use crate::{ContextDocument, DocumentStore, RetrieveError};

/// Deterministic store for tests and local runs.
///
/// Ranks documents by how many distinct query terms they contain;
/// documents with no overlapping term are not returned. Ties keep corpus
/// order, so results are stable across calls.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    corpus: Vec<ContextDocument>,
}

impl InMemoryDocumentStore {
    pub fn new(corpus: Vec<ContextDocument>) -> Self {
        Self { corpus }
    }

    pub fn add(&mut self, document: ContextDocument) {
        self.corpus.push(document);
    }

    fn score(query_terms: &[String], content: &str) -> usize {
        let haystack = content.to_lowercase();
        query_terms
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .count()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ContextDocument>, RetrieveError>> {
        Box::pin(async move {
            let query_terms = query
                .split_whitespace()
                .map(|term| term.to_lowercase())
                .collect::<Vec<_>>();

            let mut scored = self
                .corpus
                .iter()
                .enumerate()
                .map(|(position, document)| {
                    (Self::score(&query_terms, &document.content), position, document)
                })
                .filter(|(score, _, _)| *score > 0)
                .collect::<Vec<_>>();

            scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

            Ok(scored
                .into_iter()
                .take(limit)
                .map(|(_, _, document)| document.clone())
                .collect())
        })
    }
}
