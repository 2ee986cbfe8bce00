//! Chat model access for the assistant.
//!
//! The rest of the workspace talks to the model through [`ChatBackend`], so
//! tests can swap the HTTP client for a scripted one.

pub mod client;
pub mod config;

pub use client::OllamaClient;
pub use config::LlmConfig;

use aied_core::{ChatMessage, Result};

/// Something that can answer a chat conversation.
pub trait ChatBackend {
    /// Send `messages` and return the assistant's reply text.
    fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl<B: ChatBackend + ?Sized> ChatBackend for &B {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).chat(messages)
    }
}

/// Build the single user message sent for `prompt`, wrapping it with
/// `context` when there is some.
pub fn context_prompt(prompt: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!(
            "Based on the following content, respond to this prompt: {}\n\nContent: {}",
            prompt, context
        ),
        None => prompt.to_string(),
    }
}

/// Ask `backend` a one-shot question, optionally grounded in `context`.
pub fn generate<B: ChatBackend + ?Sized>(
    backend: &B,
    prompt: &str,
    context: Option<&str>,
) -> Result<String> {
    let message = ChatMessage::user(context_prompt(prompt, context));
    backend.chat(std::slice::from_ref(&message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aied_core::Role;
    use std::cell::RefCell;

    struct Recorder {
        seen: RefCell<Vec<ChatMessage>>,
    }

    impl ChatBackend for Recorder {
        fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.borrow_mut().extend_from_slice(messages);
            Ok("ok".to_string())
        }
    }

    #[test]
    fn test_context_prompt() {
        assert_eq!(context_prompt("Summarize", None), "Summarize");
        assert_eq!(
            context_prompt("Summarize", Some("The water cycle.")),
            "Based on the following content, respond to this prompt: Summarize\n\nContent: The water cycle."
        );
    }

    #[test]
    fn test_generate_sends_one_user_message() {
        let backend = Recorder {
            seen: RefCell::new(Vec::new()),
        };
        let reply = generate(&backend, "Hello", Some("ctx")).unwrap();

        assert_eq!(reply, "ok");
        let seen = backend.seen.into_inner();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].role, Role::User);
        assert!(seen[0].content.ends_with("Content: ctx"));
    }
}
