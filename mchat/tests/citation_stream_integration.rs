use std::sync::Arc;

use futures_util::StreamExt;
use mchat::prelude::*;
use mprovider::{
    BoxedFragmentStream, CompletionRequest, CompletionSource, ProviderError, ProviderFuture,
    VecFragmentStream,
};
use mretrieve::{ContextDocument, InMemoryDocumentStore};
use serde_json::Value;

#[derive(Debug)]
struct SplitFragmentProvider {
    fragments: Vec<&'static str>,
}

impl CompletionSource for SplitFragmentProvider {
    fn id(&self) -> &'static str {
        "split-fragments"
    }

    fn complete<'a>(
        &'a self,
        _request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move { Ok(self.fragments.concat()) })
    }

    fn stream<'a>(
        &'a self,
        _request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            let items = self
                .fragments
                .iter()
                .map(|fragment| Ok(fragment.to_string()))
                .collect();
            Ok(Box::pin(VecFragmentStream::new(items)) as BoxedFragmentStream<'a>)
        })
    }
}

fn corpus_store() -> Arc<InMemoryDocumentStore> {
    Arc::new(InMemoryDocumentStore::new(vec![
        ContextDocument::new("Paris is the capital of France"),
        ContextDocument::new("The Seine flows through Paris"),
    ]))
}

fn parse_frame(frame: &str) -> Value {
    let body = frame
        .strip_prefix("data: ")
        .and_then(|rest| rest.strip_suffix("\n\n"))
        .expect("frame must be a data line terminated by a blank line");
    serde_json::from_str(body).expect("frame body must be JSON")
}

#[tokio::test]
async fn full_turn_streams_frames_and_persists_the_transcript() {
    // Citation markup split mid-tag across fragment boundaries.
    let provider = Arc::new(SplitFragmentProvider {
        fragments: vec![
            "The capital is <cit",
            "ation source_id=\"0\">Par",
            "is</cit",
            "ation>.",
        ],
    });

    let store = Arc::new(InMemoryConversationStore::new());
    let service = ChatService::builder(provider, corpus_store())
        .store(store.clone())
        .build();

    let session = ChatSession::new("integration-1", "gpt-4o-mini");
    let request = ChatTurnRequest::new(session.clone(), "What is the capital of France?");

    let mut stream = service.stream_turn(request).expect("turn should open");
    let mut sink = SseEventSink::new();
    let mut frames = Vec::new();

    while let Some(event) = stream.next().await {
        let event = event.expect("turn should not fail");
        frames.push(parse_frame(&sink.frame(&event)));
    }

    let kinds = frames
        .iter()
        .map(|frame| frame["type"].as_str().expect("frame type"))
        .collect::<Vec<_>>();
    assert_eq!(kinds.first(), Some(&"context"));
    assert_eq!(kinds.last(), Some(&"final"));
    assert!(kinds.contains(&"citation_start"));
    assert!(kinds.contains(&"citation_end"));

    let start_index = kinds.iter().position(|kind| *kind == "citation_start");
    let end_index = kinds.iter().position(|kind| *kind == "citation_end");
    assert!(start_index < end_index, "citation span must be ordered");

    assert_eq!(sink.transcript(), "The capital is Paris.");

    let final_frame = frames.last().expect("final frame");
    assert_eq!(final_frame["data"]["session_id"], "integration-1");
    assert_eq!(final_frame["data"]["content"], "The capital is Paris.");

    let saved = store
        .load_messages(&session.id)
        .await
        .expect("load transcript");
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[1].content, "The capital is Paris.");
}

#[tokio::test]
async fn dropping_the_stream_cancels_the_turn_without_persisting() {
    let provider = Arc::new(SplitFragmentProvider {
        fragments: vec!["first part ", "second part"],
    });
    let store = Arc::new(InMemoryConversationStore::new());
    let service = ChatService::builder(provider, corpus_store())
        .store(store.clone())
        .build();

    let session = ChatSession::new("integration-2", "gpt-4o-mini");
    let request = ChatTurnRequest::new(session.clone(), "capital of France");

    {
        let mut stream = service.stream_turn(request).expect("turn should open");
        // Consume the context event and one delta, then drop mid-turn.
        let _ = stream.next().await;
        let _ = stream.next().await;
    }

    let saved = store
        .load_messages(&session.id)
        .await
        .expect("load transcript");
    assert!(saved.is_empty(), "cancelled turns must not persist");
}

#[tokio::test]
async fn second_turn_sees_the_first_turn_in_history() {
    let provider = Arc::new(SplitFragmentProvider {
        fragments: vec!["answer"],
    });
    let store = Arc::new(InMemoryConversationStore::new());
    let service = ChatService::builder(provider, corpus_store())
        .store(store.clone())
        .build();

    let session = ChatSession::new("integration-3", "gpt-4o-mini");

    for question in ["first question", "second question"] {
        let mut stream = service
            .stream_turn(ChatTurnRequest::new(session.clone(), question))
            .expect("turn should open");
        while stream.next().await.is_some() {}
    }

    let saved = store
        .load_messages(&session.id)
        .await
        .expect("load transcript");
    assert_eq!(saved.len(), 4);
    assert_eq!(saved[0].content, "first question");
    assert_eq!(saved[2].content, "second question");
}
