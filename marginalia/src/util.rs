//! Small convenience constructors for common types.

use crate::{ChatSession, ChatTurnRequest, Message, Role, SessionId};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn session(id: impl Into<SessionId>, model: impl Into<String>) -> ChatSession {
    ChatSession::new(id, model)
}

pub fn turn(session: ChatSession, user_input: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::new(session, user_input)
}
