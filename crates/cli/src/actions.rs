//! One-click transformations of the latest message.

use crate::session::{export_text, ExportedFile, Session};
use aied_core::{ChatMessage, Error, ExportFormat, Result};
use aied_llm::{generate, ChatBackend};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Translate to French
    TranslateFrench,
    /// Create a 50 minute lesson plan
    LessonPlan,
    /// Generate a vocabulary list
    VocabularyList,
    /// Add emojis without changing the text
    Sparkle,
    /// Create a PowerPoint presentation
    Presentation,
}

/// What an action produced.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Model reply, already appended to the transcript.
    Reply(String),
    /// A generated slide deck.
    File(ExportedFile),
}

impl Action {
    /// Prompt sent to the model for a text action, `None` for the deck.
    pub fn prompt(&self, text: &str) -> Option<String> {
        let prompt = match self {
            Self::TranslateFrench => {
                format!("Translate the following text to French: {}", text)
            }
            Self::LessonPlan => format!(
                "Produce a clear, single 50 minute lesson plan based on the following content. \
                 Provide 3 learning objectives and success criteria: {}",
                text
            ),
            Self::VocabularyList => {
                format!("Generate a vocabulary list based on the following content: {}", text)
            }
            Self::Sparkle => format!(
                "Take this, keep the text the same, but cover it in relevant emojis: {}",
                text
            ),
            Self::Presentation => return None,
        };
        Some(prompt)
    }

    /// Run the action against the session's latest message.
    ///
    /// Text actions ask the model without the uploaded context and append
    /// the answer as an assistant message.
    pub fn perform(&self, session: &mut Session, backend: &dyn ChatBackend) -> Result<ActionOutcome> {
        let latest = session.latest().ok_or(Error::EmptySession)?.to_string();
        log::debug!("Performing {:?} on {} chars", self, latest.len());

        match self.prompt(&latest) {
            Some(prompt) => {
                let reply = generate(backend, &prompt, None)?;
                session.push(ChatMessage::assistant(reply.clone()));
                Ok(ActionOutcome::Reply(reply))
            }
            None => Ok(ActionOutcome::File(export_text(
                &latest,
                ExportFormat::PowerPoint,
                backend,
            )?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::ScriptedBackend;

    #[test]
    fn test_prompts() {
        assert_eq!(
            Action::TranslateFrench.prompt("Hello").as_deref(),
            Some("Translate the following text to French: Hello")
        );
        assert_eq!(
            Action::LessonPlan.prompt("Tides").as_deref(),
            Some(
                "Produce a clear, single 50 minute lesson plan based on the following content. \
                 Provide 3 learning objectives and success criteria: Tides"
            )
        );
        assert!(Action::Presentation.prompt("x").is_none());
    }

    #[test]
    fn test_text_action_appends_reply() {
        let backend = ScriptedBackend::replying(&["Bonjour"]);
        let mut session = Session::new();
        session.push(ChatMessage::assistant("Hello"));

        let outcome = Action::TranslateFrench.perform(&mut session, &backend).unwrap();

        assert!(matches!(outcome, ActionOutcome::Reply(ref r) if r == "Bonjour"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.latest(), Some("Bonjour"));
    }

    #[test]
    fn test_presentation_action_leaves_transcript() {
        let backend = ScriptedBackend::replying(&["no template here"]);
        let mut session = Session::new();
        session.push(ChatMessage::assistant("Stars"));

        let outcome = Action::Presentation.perform(&mut session, &backend).unwrap();

        match outcome {
            ActionOutcome::File(file) => assert_eq!(file.file_name, "presentation.pptx"),
            other => panic!("expected a file, got {:?}", other),
        }
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_action_needs_history() {
        let backend = ScriptedBackend::replying(&[]);
        let mut session = Session::new();
        assert!(matches!(
            Action::Sparkle.perform(&mut session, &backend),
            Err(Error::EmptySession)
        ));
    }
}
