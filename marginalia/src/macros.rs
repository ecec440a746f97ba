/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use marginalia::{Role, mg_msg};
///
/// let message = mg_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
/// ```
#[macro_export]
macro_rules! mg_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use marginalia::{Role, mg_messages};
///
/// let messages = mg_messages![
///     system => "You are concise.",
///     user => "What is the capital of France?",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! mg_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::mg_msg!($role => $content)),+]
    };
}

/// Creates a [`ChatSession`](crate::ChatSession), optionally with a system
/// prompt.
///
/// ```rust
/// use marginalia::mg_session;
///
/// let session = mg_session!("session-1", "gpt-4o-mini", "Be concise.");
/// assert_eq!(session.system_prompt.as_deref(), Some("Be concise."));
/// ```
#[macro_export]
macro_rules! mg_session {
    ($session_id:expr, $model:expr $(,)?) => {
        $crate::ChatSession::new($session_id, $model)
    };
    ($session_id:expr, $model:expr, $system_prompt:expr $(,)?) => {
        $crate::ChatSession::new($session_id, $model).with_system_prompt($system_prompt)
    };
}
