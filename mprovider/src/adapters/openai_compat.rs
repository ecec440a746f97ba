//! Chat-completions adapter for OpenAI-compatible endpoints.
//!
//! The streaming path decodes the server-sent-events body incrementally:
//! byte chunks accumulate in a line buffer, complete `data:` lines are
//! drained as they appear, and each parsed delta is yielded as one opaque
//! fragment. The whole response is never buffered.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    BoxedFragmentStream, CompletionRequest, CompletionSource, Message, ProviderError,
    ProviderFuture,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl From<Message> for ApiMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.as_str().to_string(),
            content: value.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamResponse {
    choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    delta: ApiStreamDelta,
}

#[derive(Debug, Deserialize)]
struct ApiStreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Transport seam so providers can be exercised without a network.
pub trait ChatCompletionsTransport: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: ApiRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ApiRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
}

impl HttpChatTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        request: &ApiRequest,
        api_key: &str,
    ) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(err.to_string())
                } else {
                    ProviderError::transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let detail = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("endpoint returned status {status}"),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(detail)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(detail)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(detail)
            }
            _ => ProviderError::transport(detail),
        }
    }
}

impl ChatCompletionsTransport for HttpChatTransport {
    fn complete<'a>(
        &'a self,
        mut request: ApiRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let response = self.send(&request, api_key).await?;
            let parsed = response
                .json::<ApiResponse>()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            Ok(parsed
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default())
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: ApiRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.send(&request, api_key).await?;

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut decoder = SseFragmentDecoder::new();

                while let Some(item) = chunks.next().await {
                    let bytes =
                        item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;

                    for fragment in decoder.push(text)? {
                        yield fragment;
                    }

                    if decoder.is_done() {
                        break;
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedFragmentStream<'a>)
        })
    }
}

/// Incremental decoder for a chat-completions SSE body.
///
/// Chunk boundaries carry no meaning: a `data:` line may arrive split
/// across any number of chunks, and one chunk may carry several lines.
/// Only complete lines are decoded; the unterminated tail stays in the
/// buffer until the next `push`.
struct SseFragmentDecoder {
    buffer: String,
    done: bool,
}

impl SseFragmentDecoder {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            done: false,
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn push(&mut self, chunk: &str) -> Result<Vec<String>, ProviderError> {
        let mut fragments = Vec::new();
        if self.done {
            return Ok(fragments);
        }
        self.buffer.push_str(chunk);

        while let Some(newline_index) = self.buffer.find('\n') {
            let line = self.buffer.drain(..=newline_index).collect::<String>();
            let line = line.trim();

            if !line.starts_with("data:") {
                continue;
            }

            let payload = line.trim_start_matches("data:").trim();
            if payload == "[DONE]" {
                self.done = true;
                break;
            }

            if let Some(fragment) = fragment_from_payload(payload)? {
                fragments.push(fragment);
            }
        }

        Ok(fragments)
    }
}

fn fragment_from_payload(payload: &str) -> Result<Option<String>, ProviderError> {
    let parsed: ApiStreamResponse = serde_json::from_str(payload)
        .map_err(|err| ProviderError::transport(err.to_string()))?;

    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[derive(Clone)]
pub struct OpenAiCompatProvider {
    transport: Arc<dyn ChatCompletionsTransport>,
    api_key: String,
    fallback_model: String,
}

impl OpenAiCompatProvider {
    pub fn new(transport: Arc<dyn ChatCompletionsTransport>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            fallback_model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> HttpChatTransport {
        HttpChatTransport::new(client)
    }

    fn resolve_api_key(&self) -> Result<&str, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::authentication("no API key configured"));
        }

        Ok(self.api_key.as_str())
    }

    fn with_fallback_applied(&self, mut request: CompletionRequest) -> CompletionRequest {
        if request.model.trim().is_empty() {
            request.model = self.fallback_model.clone();
        }
        request
    }

    fn build_api_request(&self, request: CompletionRequest, stream: bool) -> ApiRequest {
        let request = self.with_fallback_applied(request);

        ApiRequest {
            model: request.model,
            messages: request.messages.into_iter().map(ApiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }
}

impl CompletionSource for OpenAiCompatProvider {
    fn id(&self) -> &'static str {
        "openai-compat"
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let request = self.with_fallback_applied(request);
            request.validate()?;
            let api_key = self.resolve_api_key()?;
            let api_request = self.build_api_request(request, false);
            self.transport.complete(api_request, api_key).await
        })
    }

    fn stream<'a>(
        &'a self,
        request: CompletionRequest,
    ) -> ProviderFuture<'a, Result<BoxedFragmentStream<'a>, ProviderError>> {
        Box::pin(async move {
            let request = self.with_fallback_applied(request);
            request.validate()?;
            let api_key = self.resolve_api_key()?;
            let api_request = self.build_api_request(request, true);
            self.transport.stream(api_request, api_key).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn payload_with_delta_content_becomes_fragment() {
        let payload = r#"{"choices":[{"delta":{"content":"Par"}}]}"#;

        let fragment = fragment_from_payload(payload).expect("payload should parse");
        assert_eq!(fragment, Some("Par".to_string()));
    }

    #[test]
    fn payload_without_content_is_skipped() {
        let payload = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;

        let fragment = fragment_from_payload(payload).expect("payload should parse");
        assert_eq!(fragment, None);
    }

    #[test]
    fn payload_with_empty_content_is_skipped() {
        let payload = r#"{"choices":[{"delta":{"content":""}}]}"#;

        let fragment = fragment_from_payload(payload).expect("payload should parse");
        assert_eq!(fragment, None);
    }

    #[test]
    fn malformed_payload_is_a_transport_error() {
        let error = fragment_from_payload("{not json").expect_err("parse should fail");
        assert_eq!(error.kind, crate::ProviderErrorKind::Transport);
    }

    #[test]
    fn data_line_split_across_chunks_decodes_once_complete() {
        let mut decoder = SseFragmentDecoder::new();

        let first = decoder
            .push("data: {\"choices\":[{\"delta\":{\"con")
            .expect("partial line should buffer");
        assert!(first.is_empty());

        let second = decoder
            .push("tent\":\"Par\"}}]}\n")
            .expect("completed line should decode");
        assert_eq!(second, vec!["Par".to_string()]);
    }

    #[test]
    fn one_chunk_may_carry_several_lines() {
        let mut decoder = SseFragmentDecoder::new();

        let fragments = decoder
            .push(concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"The \"}}]}\n",
                "\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"capital\"}}]}\n",
            ))
            .expect("chunk should decode");

        assert_eq!(fragments, vec!["The ".to_string(), "capital".to_string()]);
    }

    #[test]
    fn done_marker_terminates_and_later_lines_are_ignored() {
        let mut decoder = SseFragmentDecoder::new();

        let fragments = decoder
            .push(concat!(
                "data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}\n",
                "data: [DONE]\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
            ))
            .expect("chunk should decode");
        assert_eq!(fragments, vec!["end".to_string()]);
        assert!(decoder.is_done());

        let after = decoder
            .push("data: {\"choices\":[{\"delta\":{\"content\":\"more\"}}]}\n")
            .expect("pushes after the terminator are no-ops");
        assert!(after.is_empty());
    }

    #[test]
    fn non_data_lines_are_skipped() {
        let mut decoder = SseFragmentDecoder::new();

        let fragments = decoder
            .push(concat!(
                ": keep-alive comment\n",
                "event: message\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
            ))
            .expect("chunk should decode");

        assert_eq!(fragments, vec!["ok".to_string()]);
    }

    #[test]
    fn empty_request_model_falls_back_to_default() {
        let transport = Arc::new(HttpChatTransport::new(Client::new()));
        let provider = OpenAiCompatProvider::new(transport, "sk-test")
            .with_fallback_model("local-model");

        let request = CompletionRequest::new("", vec![Message::new(Role::User, "hi")]);
        let api_request = provider.build_api_request(request, true);

        assert_eq!(api_request.model, "local-model");
        assert!(api_request.stream);
        assert_eq!(api_request.messages[0].role, "user");
    }
}
