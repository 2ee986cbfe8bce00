//! Markdown normalization into an [`ElementTree`].
//!
//! Recognizes headings, paragraphs, ordered and unordered lists, and bold or
//! italic inline spans. Everything else degrades to plain text.

use crate::types::{Block, ElementTree, InlineRun, List, ListItem};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;

/// Regex to collapse runs of whitespace, newlines included, into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text, " ")
        .trim()
        .to_string()
}

/// Converts markdown text into an element tree.
#[derive(Debug, Clone, Default)]
pub struct MarkdownNormalizer;

impl MarkdownNormalizer {
    /// Create a normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Parse `markdown` into a fresh element tree. Never fails.
    pub fn normalize(&self, markdown: &str) -> ElementTree {
        let mut builder = TreeBuilder::new();
        for event in Parser::new_ext(markdown, Options::empty()) {
            builder.handle(event);
        }
        let tree = builder.finish();
        log::debug!("Normalized markdown into {} blocks", tree.blocks.len());
        tree
    }
}

/// Event-driven tree construction state.
struct TreeBuilder {
    tree: ElementTree,
    /// Open lists, innermost last.
    lists: Vec<List>,
    /// Open list items, innermost last.
    items: Vec<ListItem>,
    /// Inline runs of the block being read.
    runs: Vec<InlineRun>,
    heading: Option<u8>,
    bold_depth: usize,
    italic_depth: usize,
    /// Inside a code or HTML block whose text is kept verbatim and unstyled.
    raw_block: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            tree: ElementTree::new(),
            lists: Vec::new(),
            items: Vec::new(),
            runs: Vec::new(),
            heading: None,
            bold_depth: 0,
            italic_depth: 0,
            raw_block: false,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Code(text) => self.push_text(&text),
            Event::Html(html) if self.raw_block => self.push_text(&html),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            // Inline HTML tags, rules, footnotes and the like carry no text.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // Loose list items wrap each paragraph; keep them apart.
                self.separate_item_blocks();
            }
            Tag::Heading { level, .. } => {
                self.separate_item_blocks();
                self.heading = Some(heading_level(level));
            }
            Tag::List(start) => {
                self.attach_runs_to_item();
                self.lists.push(List::new(start.is_some()));
            }
            Tag::Item => {
                self.attach_runs_to_item();
                let (ordinal, prefix) = match self.lists.last() {
                    Some(list) => {
                        let ordinal = list.items.len() + 1;
                        (ordinal, list.prefix_for(ordinal))
                    }
                    None => (1, crate::types::BULLET_PREFIX.to_string()),
                };
                self.items.push(ListItem {
                    ordinal,
                    prefix,
                    runs: Vec::new(),
                    sublists: Vec::new(),
                });
            }
            Tag::Strong => self.bold_depth += 1,
            Tag::Emphasis => self.italic_depth += 1,
            Tag::CodeBlock(_) | Tag::HtmlBlock => {
                self.separate_item_blocks();
                self.raw_block = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.items.is_empty() {
                    let runs = std::mem::take(&mut self.runs);
                    if !runs.is_empty() {
                        self.tree.push(Block::Paragraph { runs });
                    }
                }
            }
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                if self.items.is_empty() {
                    let runs = std::mem::take(&mut self.runs);
                    self.tree.push(Block::Heading { level, runs });
                }
            }
            TagEnd::Item => {
                self.attach_runs_to_item();
                if let Some(item) = self.items.pop() {
                    if let Some(list) = self.lists.last_mut() {
                        list.items.push(item);
                    }
                }
            }
            TagEnd::List(_) => {
                if let Some(list) = self.lists.pop() {
                    match self.items.last_mut() {
                        Some(parent) => parent.sublists.push(list),
                        None => self.tree.push(Block::List(list)),
                    }
                }
            }
            TagEnd::Strong => self.bold_depth = self.bold_depth.saturating_sub(1),
            TagEnd::Emphasis => self.italic_depth = self.italic_depth.saturating_sub(1),
            TagEnd::CodeBlock | TagEnd::HtmlBlock => {
                self.raw_block = false;
                if let Some(last) = self.runs.last_mut() {
                    let trimmed = last.text.trim_end().len();
                    last.text.truncate(trimmed);
                }
                if self.items.is_empty() {
                    let runs = std::mem::take(&mut self.runs);
                    if runs.iter().any(|r| !r.text.is_empty()) {
                        self.tree.push(Block::Paragraph { runs });
                    }
                }
            }
            _ => {}
        }
    }

    /// Put a space before a new block inside a list item that already has
    /// text, whether that text is still buffered or was attached when a
    /// nested list opened.
    fn separate_item_blocks(&mut self) {
        let Some(item) = self.items.last() else {
            return;
        };
        if !self.runs.is_empty() || !item.runs.is_empty() {
            self.push_plain(" ");
        }
    }

    /// Move buffered runs into the innermost open list item.
    fn attach_runs_to_item(&mut self) {
        if let Some(item) = self.items.last_mut() {
            let runs = std::mem::take(&mut self.runs);
            for run in runs {
                append_run(&mut item.runs, run);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let run = if self.raw_block {
            InlineRun::plain(text)
        } else {
            InlineRun::styled(text, self.bold_depth > 0, self.italic_depth > 0)
        };
        append_run(&mut self.runs, run);
    }

    fn push_plain(&mut self, text: &str) {
        append_run(&mut self.runs, InlineRun::plain(text));
    }

    fn finish(mut self) -> ElementTree {
        // Unbalanced input can't come out of the parser, but don't lose text.
        while !self.items.is_empty() {
            self.end(TagEnd::Item);
        }
        while !self.lists.is_empty() {
            self.end(TagEnd::List(false));
        }
        if !self.runs.is_empty() {
            let runs = std::mem::take(&mut self.runs);
            self.tree.push(Block::Paragraph { runs });
        }
        self.tree
    }
}

/// Append a run, merging it into the previous one when the flags match.
fn append_run(runs: &mut Vec<InlineRun>, run: InlineRun) {
    match runs.last_mut() {
        Some(last) if last.bold == run.bold && last.italic == run.italic => {
            last.text.push_str(&run.text);
        }
        _ => runs.push(run),
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> ElementTree {
        MarkdownNormalizer::new().normalize(text)
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize("").is_empty());
        assert!(normalize("   \n\n").is_empty());
    }

    #[test]
    fn test_heading_and_unordered_list() {
        let tree = normalize("## Title\n\n- one\n- two");

        assert_eq!(tree.blocks.len(), 2);
        assert_eq!(
            tree.blocks[0],
            Block::Heading {
                level: 2,
                runs: vec![InlineRun::plain("Title")]
            }
        );
        match &tree.blocks[1] {
            Block::List(list) => {
                assert!(!list.ordered);
                assert_eq!(list.items.len(), 2);
                assert_eq!(list.items[0].prefix, "• ");
                assert_eq!(InlineRun::plain_text(&list.items[0].runs), "one");
                assert_eq!(InlineRun::plain_text(&list.items[1].runs), "two");
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_all_heading_levels() {
        let tree = normalize("# a\n## b\n### c\n#### d\n##### e\n###### f");
        let levels: Vec<u8> = tree
            .blocks
            .iter()
            .map(|b| match b {
                Block::Heading { level, .. } => *level,
                _ => 0,
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_ordered_numbering_restarts_per_list() {
        let tree = normalize("3. a\n4. b\n5. c\n\nBreak\n\n1. x\n2. y");

        let prefixes: Vec<Vec<String>> = tree
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::List(list) => Some(list.items.iter().map(|i| i.prefix.clone()).collect()),
                _ => None,
            })
            .collect();
        assert_eq!(
            prefixes,
            vec![
                vec!["1. ".to_string(), "2. ".to_string(), "3. ".to_string()],
                vec!["1. ".to_string(), "2. ".to_string()],
            ]
        );
    }

    #[test]
    fn test_nested_list_is_distinct() {
        let tree = normalize("1. first\n   1. inner a\n   2. inner b\n2. second");

        let Block::List(list) = &tree.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items.len(), 2);
        assert_eq!(InlineRun::plain_text(&list.items[0].runs), "first");
        assert_eq!(list.items[1].prefix, "2. ");
        let inner = &list.items[0].sublists[0];
        assert_eq!(inner.items[0].prefix, "1. ");
        assert_eq!(inner.items[1].prefix, "2. ");
        assert_eq!(InlineRun::plain_text(&inner.items[1].runs), "inner b");
    }

    #[test]
    fn test_inline_bold_and_italic() {
        let tree = normalize("Plain **bold** and *italic* and ***both***.");

        let Block::Paragraph { runs } = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(
            runs,
            &vec![
                InlineRun::plain("Plain "),
                InlineRun::styled("bold", true, false),
                InlineRun::plain(" and "),
                InlineRun::styled("italic", false, true),
                InlineRun::plain(" and "),
                InlineRun::styled("both", true, true),
                InlineRun::plain("."),
            ]
        );
    }

    #[test]
    fn test_other_inline_markup_is_plain_text() {
        let tree = normalize("Use `cargo` and [docs](https://example.com).");
        let Block::Paragraph { runs } = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(runs, &vec![InlineRun::plain("Use cargo and docs.")]);
    }

    #[test]
    fn test_code_block_degrades_to_plain_paragraph() {
        let tree = normalize("```\nlet x = **1**;\n```");
        assert_eq!(
            tree.blocks,
            vec![Block::Paragraph {
                runs: vec![InlineRun::plain("let x = **1**;")]
            }]
        );
    }

    #[test]
    fn test_block_quote_is_transparent() {
        let tree = normalize("> quoted *text*");
        assert_eq!(
            tree.blocks,
            vec![Block::Paragraph {
                runs: vec![
                    InlineRun::plain("quoted "),
                    InlineRun::styled("text", false, true)
                ]
            }]
        );
    }

    #[test]
    fn test_soft_breaks() {
        let tree = normalize("line one\nline two");
        assert_eq!(tree.plain_text(), "line one line two");

        let tree = normalize("line one  \nline two");
        let Block::Paragraph { runs } = &tree.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(InlineRun::plain_text(runs), "line one\nline two");
    }

    #[test]
    fn test_loose_list_items_keep_formatting() {
        let tree = normalize("- **Key**: value\n\n- second");
        let Block::List(list) = &tree.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(list.items[0].runs[0], InlineRun::styled("Key", true, false));
        assert_eq!(InlineRun::plain_text(&list.items[0].runs), "Key: value");
        assert_eq!(tree.list_item_texts(), vec!["Key: value", "second"]);
    }

    #[test]
    fn test_item_text_after_nested_list() {
        let tree = normalize("- alpha\n  - beta\n\n  gamma\n- delta");
        let Block::List(list) = &tree.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(InlineRun::plain_text(&list.items[0].runs), "alpha gamma");
        assert_eq!(
            InlineRun::plain_text(&list.items[0].sublists[0].items[0].runs),
            "beta"
        );
        assert_eq!(tree.list_item_texts(), vec!["alpha gamma", "beta", "delta"]);
    }

    #[test]
    fn test_block_order_preserved() {
        let tree = normalize("# H\n\npara\n\n- a\n\nafter");
        let kinds: Vec<&str> = tree
            .blocks
            .iter()
            .map(|b| match b {
                Block::Heading { .. } => "h",
                Block::Paragraph { .. } => "p",
                Block::List(_) => "l",
            })
            .collect();
        assert_eq!(kinds, vec!["h", "p", "l", "p"]);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }
}
