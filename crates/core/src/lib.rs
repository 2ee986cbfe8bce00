//! Core domain types, markdown normalization, and slide-template parsing
//! for the classroom assistant's document exports.

pub mod error;
pub mod markdown;
pub mod package;
pub mod slides;
pub mod types;

pub use error::{Error, Result};
pub use markdown::MarkdownNormalizer;
pub use slides::{slide_prompt, SlideTemplateParser};
pub use types::{
    Block, ChatMessage, DeckOutline, ElementTree, ExportFormat, InlineRun, List, ListItem, Role,
    SlideLayout, SlideRecord,
};
