//! Chat transcript, uploaded context, and export of the latest message.

use aied_core::{ChatMessage, Error, ExportFormat, Result};
use aied_llm::{generate, ChatBackend};
use aied_pptx::SlideComposer;
use std::path::Path;

/// One conversation: the transcript plus an optional uploaded document.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<ChatMessage>,
    context: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Content of the most recent message, from either side.
    pub fn latest(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Send a user prompt, grounded in the uploaded document if any, and
    /// record both sides of the exchange.
    pub fn ask(&mut self, backend: &dyn ChatBackend, prompt: &str) -> Result<&str> {
        self.messages.push(ChatMessage::user(prompt));
        let reply = generate(backend, prompt, self.context.as_deref())?;
        self.messages.push(ChatMessage::assistant(reply));
        Ok(self.latest().unwrap_or_default())
    }

    /// Load a plain-text document as context for later prompts.
    pub fn attach_context(&mut self, path: &Path) -> Result<()> {
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !is_txt {
            return Err(Error::UnsupportedFormat(format!(
                "{} (only .txt uploads are accepted)",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| Error::InvalidUtf8(path.display().to_string()))?;
        log::debug!("Attached {} chars of context from {}", text.len(), path.display());
        self.context = Some(text);
        Ok(())
    }
}

/// A generated file ready to be saved.
#[derive(Debug)]
pub struct ExportedFile {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export the latest message in `format`.
///
/// The slide deck goes through the model; the Word document does not.
pub fn export(
    session: &Session,
    format: ExportFormat,
    backend: &dyn ChatBackend,
) -> Result<ExportedFile> {
    let latest = session.latest().ok_or(Error::EmptySession)?;
    export_text(latest, format, backend)
}

/// Export arbitrary text in `format`.
pub fn export_text(
    text: &str,
    format: ExportFormat,
    backend: &dyn ChatBackend,
) -> Result<ExportedFile> {
    let bytes = match format {
        ExportFormat::Word => aied_docx::export_markdown(text)?,
        ExportFormat::PowerPoint => {
            SlideComposer::new().compose(text, |prompt| generate(backend, prompt, None))?
        }
    };
    Ok(ExportedFile {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        bytes,
    })
}
