//! Slide-template prompting and parsing.
//!
//! The model is asked to answer in a fixed template:
//!
//! ```text
//! title: Introduction
//! bullet points:
//! - first point
//! - second point
//! ---
//! title: Next slide
//! ...
//! ```
//!
//! Parsing never fails. Blank segments and segments without a
//! `bullet points:` marker are skipped, and an empty result becomes a single
//! title slide.

use crate::markdown::{collapse_whitespace, MarkdownNormalizer};
use crate::types::{DeckOutline, SlideRecord};
use unicode_normalization::UnicodeNormalization;

/// Separator between slides in the model's answer.
pub const SLIDE_SEPARATOR: &str = "---";

/// Marker opening the bullet section of a slide.
pub const BULLET_MARKER: &str = "bullet points:";

/// Optional marker in front of the slide title.
pub const TITLE_MARKER: &str = "title:";

/// Body line used when a slide has no bullets.
pub const EMPTY_BULLETS_PLACEHOLDER: &str = "No bullet points provided.";

/// Title of the fallback slide.
pub const FALLBACK_TITLE: &str = "Presentation";

/// Subtitle of the fallback slide.
pub const FALLBACK_SUBTITLE: &str = "No content was generated for this presentation.";

/// Build the instruction that asks the model for a five-slide template.
pub fn slide_prompt(source: &str) -> String {
    format!(
        "Create a 5-slide PowerPoint presentation based on this content. \
         For each slide, provide a title prefixed with '{TITLE_MARKER}' and 3-5 bullet points \
         prefixed with '{BULLET_MARKER}'. Use markdown formatting. \
         Separate each slide with '{SLIDE_SEPARATOR}': {source}"
    )
}

/// Parser for the model's slide-template answer.
#[derive(Debug, Clone, Default)]
pub struct SlideTemplateParser {
    normalizer: MarkdownNormalizer,
}

impl SlideTemplateParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a templated answer into a deck of at least one slide.
    pub fn parse(&self, response: &str) -> DeckOutline {
        let response: String = response.nfc().collect();
        let mut slides = Vec::new();
        let mut skipped_segments = 0;

        for segment in response.split(SLIDE_SEPARATOR) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((title_part, bullet_part)) = segment.split_once(BULLET_MARKER) else {
                skipped_segments += 1;
                log::warn!(
                    "Skipping slide segment without '{}' marker: {:?}",
                    BULLET_MARKER,
                    preview(segment)
                );
                continue;
            };

            let mut title = self.parse_title(title_part);
            if title.is_empty() {
                title = format!("Slide {}", slides.len() + 1);
            }

            let mut bullets = self.parse_bullets(bullet_part);
            if bullets.is_empty() {
                bullets.push(EMPTY_BULLETS_PLACEHOLDER.to_string());
            }

            log::debug!("Parsed slide {:?} with {} bullets", title, bullets.len());
            slides.push(SlideRecord::content(title, bullets));
        }

        if slides.is_empty() {
            log::warn!("No usable slides in model output; using fallback slide");
            slides.push(SlideRecord::title_only(FALLBACK_TITLE, FALLBACK_SUBTITLE));
        }

        DeckOutline {
            slides,
            skipped_segments,
        }
    }

    fn parse_title(&self, part: &str) -> String {
        let part = part.trim();
        let part = part.strip_prefix(TITLE_MARKER).unwrap_or(part);
        let tree = self.normalizer.normalize(part.trim());
        collapse_whitespace(&tree.plain_text())
    }

    fn parse_bullets(&self, part: &str) -> Vec<String> {
        self.normalizer
            .normalize(part.trim())
            .list_item_texts()
            .iter()
            .map(|text| collapse_whitespace(text))
            .filter(|text| !text.is_empty())
            .collect()
    }
}

/// First line of a segment, shortened for log output.
fn preview(segment: &str) -> String {
    let line = segment.lines().next().unwrap_or_default();
    line.chars().take(60).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlideLayout;

    fn parse(text: &str) -> DeckOutline {
        SlideTemplateParser::new().parse(text)
    }

    fn titles(deck: &DeckOutline) -> Vec<&str> {
        deck.slides.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_prompt_mentions_template() {
        let prompt = slide_prompt("Photosynthesis basics");
        assert!(prompt.contains("5-slide"));
        assert!(prompt.contains("'title:'"));
        assert!(prompt.contains("'bullet points:'"));
        assert!(prompt.contains("'---'"));
        assert!(prompt.ends_with("Photosynthesis basics"));
    }

    #[test]
    fn test_two_slides_with_blank_segment() {
        let deck = parse(
            "title: Intro\nbullet points:\n- a\n- b\n---\n   \n---title: End\nbullet points:\n- done",
        );

        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0], SlideRecord::content("Intro", vec!["a".into(), "b".into()]));
        assert_eq!(deck.slides[1], SlideRecord::content("End", vec!["done".into()]));
        assert_eq!(deck.skipped_segments, 0);
        assert!(!deck.is_fallback());
    }

    #[test]
    fn test_no_separator_no_marker_falls_back() {
        let deck = parse("Sorry, I can't help with that.");

        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].layout, SlideLayout::Title);
        assert_eq!(deck.slides[0].title, FALLBACK_TITLE);
        assert_eq!(deck.slides[0].body, vec![FALLBACK_SUBTITLE.to_string()]);
        assert_eq!(deck.skipped_segments, 1);
        assert!(deck.is_fallback());
    }

    #[test]
    fn test_empty_response_falls_back() {
        let deck = parse("");
        assert!(deck.is_fallback());
        assert_eq!(deck.skipped_segments, 0);
    }

    #[test]
    fn test_five_well_formed_slides() {
        let response = (1..=5)
            .map(|n| format!("title: **Slide {n}**\nbullet points:\n- point {n}a\n- point {n}b\n"))
            .collect::<Vec<_>>()
            .join("---\n");

        let deck = parse(&response);

        assert_eq!(deck.slides.len(), 5);
        assert!(deck.slides.iter().all(|s| !s.title.is_empty()));
        assert_eq!(titles(&deck), vec!["Slide 1", "Slide 2", "Slide 3", "Slide 4", "Slide 5"]);
        assert_eq!(deck.slides[4].body, vec!["point 5a", "point 5b"]);
    }

    #[test]
    fn test_marker_without_list_items_gets_placeholder() {
        let deck = parse("title: Lonely\nbullet points:\nJust a sentence.");

        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].layout, SlideLayout::TitleAndContent);
        assert_eq!(deck.slides[0].body, vec![EMPTY_BULLETS_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_malformed_segment_is_skipped() {
        let deck = parse("title: Good\nbullet points:\n- ok\n---\ntitle: Bad\n- missing marker");

        assert_eq!(titles(&deck), vec!["Good"]);
        assert_eq!(deck.skipped_segments, 1);
    }

    #[test]
    fn test_ordered_and_nested_bullets() {
        let deck = parse("title: Steps\nbullet points:\n1. mix\n2. bake\n   - at *200C*\n");
        assert_eq!(deck.slides[0].body, vec!["mix", "bake", "at 200C"]);
    }

    #[test]
    fn test_heading_title_and_missing_title_marker() {
        let deck = parse("## Overview\nbullet points:\n- x");
        assert_eq!(deck.slides[0].title, "Overview");
    }

    #[test]
    fn test_empty_title_gets_numbered_name() {
        let deck = parse("title: Kept\nbullet points:\n- a\n---\ntitle:\nbullet points:\n- b");
        assert_eq!(titles(&deck), vec!["Kept", "Slide 2"]);
    }

    #[test]
    fn test_split_only_on_first_marker() {
        let deck = parse("title: Meta\nbullet points:\n- mentions bullet points: twice");
        assert_eq!(deck.slides[0].body, vec!["mentions bullet points: twice"]);
    }

    #[test]
    fn test_decomposed_text_is_composed() {
        let deck = parse("title: Cafe\u{301}\nbullet points:\n- re\u{301}sume\u{301}");
        assert_eq!(deck.slides[0].title, "Café");
        assert_eq!(deck.slides[0].body, vec!["résumé"]);
    }
}
