//! Builds a slide deck from free text with the help of the language model.

use crate::writer::PptxWriter;
use aied_core::{slide_prompt, DeckOutline, Result, SlideTemplateParser};

/// Asks the model to restructure text into slides, then writes the deck.
#[derive(Debug, Clone, Default)]
pub struct SlideComposer {
    parser: SlideTemplateParser,
    writer: PptxWriter,
}

impl SlideComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restructure `source` through `llm_call` and parse the answer.
    ///
    /// `llm_call` is invoked exactly once with the slide prompt. Its error is
    /// returned as-is; a malformed answer is never an error.
    pub fn outline<F>(&self, source: &str, llm_call: F) -> Result<DeckOutline>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let prompt = slide_prompt(source);
        log::debug!("Requesting slide template ({} chars of source)", source.len());
        let response = llm_call(&prompt)?;

        let deck = self.parser.parse(&response);
        if deck.skipped_segments > 0 {
            log::warn!(
                "{} slide segment(s) had no bullet section and were left out",
                deck.skipped_segments
            );
        }
        Ok(deck)
    }

    /// Restructure `source` and return the `.pptx` bytes.
    pub fn compose<F>(&self, source: &str, llm_call: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let deck = self.outline(source, llm_call)?;
        self.writer.write(&deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::PptxReader;
    use aied_core::Error;
    use std::cell::RefCell;
    use std::time::Duration;

    const TWO_SLIDES: &str =
        "title: Intro\nbullet points:\n- a\n- b\n---\n   \n---title: End\nbullet points:\n- done";

    #[test]
    fn test_compose_two_slides() {
        let prompts = RefCell::new(Vec::new());
        let bytes = SlideComposer::new()
            .compose("Some lesson text", |prompt| {
                prompts.borrow_mut().push(prompt.to_string());
                Ok(TWO_SLIDES.to_string())
            })
            .unwrap();

        let prompts = prompts.into_inner();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Some lesson text"));

        let slides = PptxReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title.as_deref(), Some("Intro"));
        assert_eq!(slides[0].body, vec!["a", "b"]);
        assert_eq!(slides[1].title.as_deref(), Some("End"));
        assert_eq!(slides[1].body, vec!["done"]);
    }

    #[test]
    fn test_compose_fallback_deck() {
        let bytes = SlideComposer::new()
            .compose("text", |_| Ok("I could not do that.".to_string()))
            .unwrap();

        let slides = PptxReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title.as_deref(), Some("Presentation"));
        assert_eq!(
            slides[0].body,
            vec!["No content was generated for this presentation."]
        );
    }

    #[test]
    fn test_compose_five_slides() {
        let response = (1..=5)
            .map(|n| format!("title: Part {n}\nbullet points:\n- idea {n}\n"))
            .collect::<Vec<_>>()
            .join("---\n");

        let bytes = SlideComposer::new()
            .compose("text", |_| Ok(response))
            .unwrap();

        let slides = PptxReader::new().read_bytes(&bytes).unwrap();
        assert_eq!(slides.len(), 5);
        for (idx, slide) in slides.iter().enumerate() {
            assert_eq!(slide.number, idx + 1);
            assert_eq!(slide.title.as_deref(), Some(format!("Part {}", idx + 1).as_str()));
        }
    }

    #[test]
    fn test_placeholder_bullet() {
        let deck = SlideComposer::new()
            .outline("text", |_| Ok("title: Empty\nbullet points:\n".to_string()))
            .unwrap();
        assert_eq!(deck.slides[0].body, vec!["No bullet points provided."]);
    }

    #[test]
    fn test_llm_error_propagates() {
        let timeout = Duration::from_secs(5);
        let result = SlideComposer::new().compose("text", |_| Err(Error::LlmTimeout { timeout }));
        assert!(matches!(result, Err(Error::LlmTimeout { timeout: t }) if t == timeout));
    }
}
