//! PowerPoint (.pptx) export for chat content.
//!
//! Free text is restructured into slides by the language model, parsed into
//! slide records, and written as a PresentationML package in memory. Decks
//! can be read back for inspection.

pub mod composer;
pub mod reader;
pub mod template;
pub mod writer;

pub use composer::SlideComposer;
pub use reader::{PptxReader, SlideSummary};
pub use writer::PptxWriter;
