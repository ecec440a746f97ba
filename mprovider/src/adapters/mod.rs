mod openai_compat;

pub use openai_compat::{
    ApiMessage, ApiRequest, ChatCompletionsTransport, HttpChatTransport, OpenAiCompatProvider,
    OPENAI_BASE_URL,
};
