//! Transport-side event sink: SSE framing and transcript accumulation.

use serde_json::{Value, json};

use crate::{ChatError, ChatEvent};

/// Serializes chat events as server-sent-events transmission units and
/// mirrors the visible answer text into a running transcript.
///
/// One event per frame, in emission order; the sink never batches or
/// reorders. Frames look like `data: {"type": ..., "data": ...}\n\n`.
#[derive(Debug, Default)]
pub struct SseEventSink {
    transcript: String,
}

impl SseEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible answer text accumulated so far (`delta` plus
    /// `citation_delta` payloads, markup stripped).
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn frame(&mut self, event: &ChatEvent) -> String {
        let body = match event {
            ChatEvent::Context(documents) => {
                let listed = documents
                    .iter()
                    .map(|document| {
                        json!({
                            "content": document.content,
                            "metadata": document.metadata,
                        })
                    })
                    .collect::<Vec<_>>();
                wire("context", json!({ "documents": listed }))
            }
            ChatEvent::Delta(text) => {
                self.transcript.push_str(text);
                wire("delta", json!({ "text": text }))
            }
            ChatEvent::CitationStart { source_index } => {
                wire("citation_start", json!({ "source_id": source_index }))
            }
            ChatEvent::CitationDelta(text) => {
                self.transcript.push_str(text);
                wire("citation_delta", json!({ "text": text }))
            }
            ChatEvent::CitationEnd => wire("citation_end", json!({})),
            ChatEvent::TurnComplete(result) => wire(
                "final",
                json!({
                    "session_id": result.session_id.as_str(),
                    "role": "assistant",
                    "content": result.assistant_message,
                    "documents_used": result.documents_used,
                }),
            ),
        };

        frame_line(&body)
    }

    /// Terminal error frame. Carries the coarse category, not internal
    /// error detail.
    pub fn error_frame(&self, error: &ChatError) -> String {
        frame_line(&wire("error", json!({ "category": error.category() })))
    }
}

fn wire(kind: &str, data: Value) -> Value {
    json!({ "type": kind, "data": data })
}

fn frame_line(body: &Value) -> String {
    format!("data: {body}\n\n")
}

#[cfg(test)]
mod tests {
    use mcommon::SessionId;
    use mretrieve::ContextDocument;
    use serde_json::Value;

    use super::SseEventSink;
    use crate::{ChatError, ChatEvent, ChatTurnResult};

    fn parse_frame(frame: &str) -> Value {
        let body = frame
            .strip_prefix("data: ")
            .and_then(|rest| rest.strip_suffix("\n\n"))
            .expect("frame must be a data line terminated by a blank line");
        serde_json::from_str(body).expect("frame body must be JSON")
    }

    #[test]
    fn events_serialize_with_their_wire_type() {
        let mut sink = SseEventSink::new();

        let context = parse_frame(&sink.frame(&ChatEvent::Context(vec![
            ContextDocument::new("Paris is the capital of France"),
        ])));
        assert_eq!(context["type"], "context");
        assert_eq!(
            context["data"]["documents"][0]["content"],
            "Paris is the capital of France"
        );

        let start = parse_frame(&sink.frame(&ChatEvent::CitationStart { source_index: 0 }));
        assert_eq!(start["type"], "citation_start");
        assert_eq!(start["data"]["source_id"], 0);

        let end = parse_frame(&sink.frame(&ChatEvent::CitationEnd));
        assert_eq!(end["type"], "citation_end");
    }

    #[test]
    fn sink_accumulates_visible_text_only() {
        let mut sink = SseEventSink::new();

        sink.frame(&ChatEvent::Delta("The capital is ".to_string()));
        sink.frame(&ChatEvent::CitationStart { source_index: 0 });
        sink.frame(&ChatEvent::CitationDelta("Paris".to_string()));
        sink.frame(&ChatEvent::CitationEnd);
        sink.frame(&ChatEvent::Delta(".".to_string()));

        assert_eq!(sink.transcript(), "The capital is Paris.");
    }

    #[test]
    fn final_frame_carries_the_persisted_record() {
        let mut sink = SseEventSink::new();

        let frame = parse_frame(&sink.frame(&ChatEvent::TurnComplete(ChatTurnResult {
            session_id: SessionId::from("s1"),
            assistant_message: "The capital is Paris.".to_string(),
            documents_used: 1,
        })));

        assert_eq!(frame["type"], "final");
        assert_eq!(frame["data"]["session_id"], "s1");
        assert_eq!(frame["data"]["content"], "The capital is Paris.");
    }

    #[test]
    fn error_frame_exposes_category_not_detail() {
        let sink = SseEventSink::new();
        let frame = parse_frame(
            &sink.error_frame(&ChatError::provider("socket closed by peer at 10.0.0.3")),
        );

        assert_eq!(frame["type"], "error");
        assert_eq!(frame["data"]["category"], "generation_failure");
        assert!(!frame.to_string().contains("10.0.0.3"));
    }
}
