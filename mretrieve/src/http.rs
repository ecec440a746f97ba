//! HTTP client for an external vector-search service.
//!
//! The embedding and approximate-nearest-neighbor machinery lives behind
//! the service; this client only posts the query text and parses the
//! ordered document list.

use mcommon::{BoxFuture, MetadataMap};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{ContextDocument, DocumentStore, RetrieveError};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    content: String,
    #[serde(default)]
    metadata: MetadataMap,
}

impl From<WireDocument> for ContextDocument {
    fn from(value: WireDocument) -> Self {
        Self {
            content: value.content,
            metadata: value.metadata,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
}

impl HttpDocumentStore {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

impl DocumentStore for HttpDocumentStore {
    fn search<'a>(
        &'a self,
        query: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<ContextDocument>, RetrieveError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.endpoint())
                .json(&SearchRequest { query, limit })
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        RetrieveError::timeout(err.to_string())
                    } else {
                        RetrieveError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(RetrieveError::transport(format!(
                    "search endpoint returned status {}",
                    response.status()
                )));
            }

            let parsed = response
                .json::<SearchResponse>()
                .await
                .map_err(|err| RetrieveError::transport(err.to_string()))?;

            Ok(parsed
                .documents
                .into_iter()
                .take(limit)
                .map(ContextDocument::from)
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_documents_map_to_context_documents() {
        let raw = r#"{
            "documents": [
                {"content": "Paris is the capital of France", "metadata": {"source": "geo.pdf"}},
                {"content": "No metadata here"}
            ]
        }"#;

        let parsed: SearchResponse = serde_json::from_str(raw).expect("response should parse");
        let documents = parsed
            .documents
            .into_iter()
            .map(ContextDocument::from)
            .collect::<Vec<_>>();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].metadata.get("source"), Some(&"geo.pdf".to_string()));
        assert!(documents[1].metadata.is_empty());
    }

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let store = HttpDocumentStore::new(Client::new(), "http://localhost:6333/");
        assert_eq!(store.endpoint(), "http://localhost:6333/search");
    }
}
