//! Markdown → Document
//!
//! The inverse of [`super::serializer`] for the constructs the editor
//! supports. Anything else is kept as verbatim source text so that a load
//! followed by a save never loses what the user typed:
//!
//! - unsupported blocks (h4-h6, tables, rules, HTML, nested lists, ordered
//!   lists not starting at 1, ...) become a paragraph holding their source
//!   slice
//! - unsupported inlines (links, images, strikethrough, HTML, ...) become a
//!   text run holding their source slice, with the surrounding marks
//!
//! Source slices are marked `raw` so the serializer writes them back as they
//! were typed. Backslash escapes in ordinary text are resolved.
//! - `$...$` and `$$...$$` math spans are kept with their delimiters and never
//!   interpreted as emphasis

use crate::models::{Block, Document, TextRun};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::ops::Range;

type Spanned<'a> = (Event<'a>, Range<usize>);

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Parse Markdown into a document
///
/// Never fails: unrecognized syntax degrades to plain paragraphs.
///
/// # Examples
///
/// ```
/// use problem_admin_core::markdown::deserialize;
/// use problem_admin_core::models::BlockKind;
///
/// let doc = deserialize("## Title\n\n**bold**");
/// assert_eq!(doc.blocks[0].kind, BlockKind::Heading2);
/// assert!(doc.blocks[1].children.len() == 1);
/// ```
pub fn deserialize(markdown: &str) -> Document {
    let events: Vec<Spanned<'_>> = Parser::new_ext(markdown, parser_options())
        .into_offset_iter()
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < events.len() {
        let (event, range) = &events[i];
        let block = match event {
            Event::Start(tag) => {
                let end = matching_end(&events, i);
                let inner = &events[i + 1..end.min(events.len())];
                i = end + 1;
                convert_block(markdown, tag, inner).or_else(|| verbatim_block(markdown, range))
            }
            _ => {
                i += 1;
                verbatim_block(markdown, range)
            }
        };
        if let Some(block) = block {
            blocks.push(block);
        }
    }

    Document::new(blocks)
}

/// Index of the `End` event closing the `Start` at `start`
///
/// Returns `events.len()` if the stream ends first.
fn matching_end(events: &[Spanned<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, (event, _)) in events[start..].iter().enumerate() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len()
}

fn verbatim_block(source: &str, range: &Range<usize>) -> Option<Block> {
    let text = source.get(range.clone())?.trim_end();
    if text.is_empty() {
        return None;
    }
    Some(Block::paragraph(vec![TextRun::plain(text).raw()]))
}

fn heading_level(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Convert one top-level construct, `None` when it has to stay verbatim
fn convert_block(source: &str, tag: &Tag<'_>, inner: &[Spanned<'_>]) -> Option<Block> {
    match tag {
        Tag::Paragraph => inline_runs(source, inner).map(Block::paragraph),
        Tag::Heading { level, .. } => {
            let level = heading_level(*level);
            if level > 3 {
                return None;
            }
            inline_runs(source, inner).map(|runs| Block::heading(level, runs))
        }
        Tag::BlockQuote { .. } => paragraphs_runs(source, inner).map(Block::blockquote),
        Tag::List(Some(start)) if *start != 1 => None,
        Tag::List(start) => list(source, start.is_some(), inner),
        Tag::CodeBlock(kind) => Some(code_block(kind, inner)),
        _ => None,
    }
}

fn list(source: &str, ordered: bool, inner: &[Spanned<'_>]) -> Option<Block> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < inner.len() {
        match &inner[i].0 {
            Event::Start(Tag::Item) => {
                let end = matching_end(inner, i);
                items.push(item_runs(source, &inner[i + 1..end.min(inner.len())])?);
                i = end + 1;
            }
            _ => return None,
        }
    }
    Some(Block::list(ordered, items))
}

/// Runs of a list item: inline content directly (tight lists) or wrapped
/// in paragraphs (loose lists)
fn item_runs(source: &str, events: &[Spanned<'_>]) -> Option<Vec<TextRun>> {
    let mut collector = InlineCollector::default();
    let mut i = 0;
    while i < events.len() {
        if let Event::Start(Tag::Paragraph) = &events[i].0 {
            let end = matching_end(events, i);
            collector.paragraph_break();
            collector.extend(inline_runs(source, &events[i + 1..end.min(events.len())])?);
            i = end + 1;
        } else {
            let next = events[i..]
                .iter()
                .position(|(event, _)| matches!(event, Event::Start(Tag::Paragraph)))
                .map_or(events.len(), |offset| i + offset);
            collector.paragraph_break();
            collector.extend(inline_runs(source, &events[i..next])?);
            i = next;
        }
    }
    Some(collector.runs)
}

/// Runs of a container that may only hold paragraphs (blockquotes),
/// paragraphs joined by a newline
fn paragraphs_runs(source: &str, inner: &[Spanned<'_>]) -> Option<Vec<TextRun>> {
    let mut collector = InlineCollector::default();
    let mut i = 0;
    while i < inner.len() {
        match &inner[i].0 {
            Event::Start(Tag::Paragraph) => {
                let end = matching_end(inner, i);
                collector.paragraph_break();
                collector.extend(inline_runs(source, &inner[i + 1..end.min(inner.len())])?);
                i = end + 1;
            }
            _ => return None,
        }
    }
    Some(collector.runs)
}

fn code_block(kind: &CodeBlockKind<'_>, inner: &[Spanned<'_>]) -> Block {
    let lang = match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
        CodeBlockKind::Indented => None,
    };

    let mut code = String::new();
    for (event, _) in inner {
        if let Event::Text(text) = event {
            code.push_str(text);
        }
    }
    if code.ends_with('\n') {
        code.pop();
    }

    Block::code_block(lang, &code)
}

fn is_inline_tag(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

/// Collect the text runs of an inline event sequence
///
/// Returns `None` if a block-level event shows up.
fn inline_runs(source: &str, events: &[Spanned<'_>]) -> Option<Vec<TextRun>> {
    let mut collector = InlineCollector::default();
    let mut i = 0;
    while i < events.len() {
        let (event, range) = &events[i];
        match event {
            Event::Text(text) => collector.push(text, false),
            Event::Html(text) | Event::InlineHtml(text) => collector.push_raw(text),
            Event::Code(text) => collector.push(text, true),
            Event::InlineMath(math) => collector.push(&format!("${}$", math), false),
            Event::DisplayMath(math) => collector.push(&format!("$${}$$", math), false),
            Event::SoftBreak | Event::HardBreak => collector.push("\n", false),
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {
                collector.push_raw(source.get(range.clone())?)
            }
            Event::Start(Tag::Strong) => collector.bold += 1,
            Event::End(TagEnd::Strong) => collector.bold = collector.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => collector.italic += 1,
            Event::End(TagEnd::Emphasis) => {
                collector.italic = collector.italic.saturating_sub(1)
            }
            Event::Start(tag) if is_inline_tag(tag) => {
                collector.push_raw(source.get(range.clone())?);
                i = matching_end(events, i) + 1;
                continue;
            }
            _ => return None,
        }
        i += 1;
    }
    Some(collector.runs)
}

#[derive(Default)]
struct InlineCollector {
    runs: Vec<TextRun>,
    bold: usize,
    italic: usize,
}

impl InlineCollector {
    fn push(&mut self, text: &str, code: bool) {
        self.push_run(TextRun {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code,
            raw: false,
        });
    }

    fn push_raw(&mut self, text: &str) {
        self.push_run(TextRun {
            text: text.to_string(),
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: false,
            raw: true,
        });
    }

    fn push_run(&mut self, run: TextRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.same_marks(&run) {
                last.text.push_str(&run.text);
                return;
            }
        }
        self.runs.push(run);
    }

    fn extend(&mut self, runs: Vec<TextRun>) {
        for run in runs {
            self.push_run(run);
        }
    }

    /// Separate a following paragraph from what was already collected
    fn paragraph_break(&mut self) {
        if !self.runs.is_empty() {
            self.push_run(TextRun::plain("\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockKind, Element};

    fn runs(block: &Block) -> Vec<TextRun> {
        block
            .children
            .iter()
            .filter_map(|c| match c {
                Element::Text(run) => Some(run.clone()),
                Element::Block(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_heading_and_bold() {
        let doc = deserialize("## Title\n\n**bold**");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].kind, BlockKind::Heading2);
        assert_eq!(runs(&doc.blocks[0]), vec![TextRun::plain("Title")]);
        assert_eq!(runs(&doc.blocks[1]), vec![TextRun::plain("bold").bold()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(deserialize("").is_empty());
        assert!(deserialize("\n\n  \n").is_empty());
    }

    #[test]
    fn test_mixed_inline_marks() {
        let doc = deserialize("plain **strong** and *soft* with `code`");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![
                TextRun::plain("plain "),
                TextRun::plain("strong").bold(),
                TextRun::plain(" and "),
                TextRun::plain("soft").italic(),
                TextRun::plain(" with "),
                TextRun::plain("code").code(),
            ]
        );
    }

    #[test]
    fn test_all_marks_stacked() {
        let doc = deserialize("***`x`***");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![TextRun::plain("x").bold().italic().code()]
        );
    }

    #[test]
    fn test_inline_math_kept_verbatim() {
        let doc = deserialize("Let $a*b*c$ be the product");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![TextRun::plain("Let $a*b*c$ be the product")]
        );
    }

    #[test]
    fn test_display_math_kept_verbatim() {
        let doc = deserialize("$$\\sum_{i=1}^{n} x_i$$");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].plain_text(), "$$\\sum_{i=1}^{n} x_i$$");
    }

    #[test]
    fn test_link_kept_as_source() {
        let doc = deserialize("see [docs](https://example.com) now");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![
                TextRun::plain("see "),
                TextRun::plain("[docs](https://example.com)").raw(),
                TextRun::plain(" now"),
            ]
        );
    }

    #[test]
    fn test_inline_html_kept_raw() {
        let doc = deserialize("a <br> b");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![
                TextRun::plain("a "),
                TextRun::plain("<br>").raw(),
                TextRun::plain(" b"),
            ]
        );
    }

    #[test]
    fn test_backslash_escapes_resolved() {
        let doc = deserialize("\\*not italic\\* and 2\\*3");
        assert_eq!(
            runs(&doc.blocks[0]),
            vec![TextRun::plain("*not italic* and 2*3")]
        );
    }

    #[test]
    fn test_ordered_list_not_starting_at_one_kept_as_source() {
        let source = "3. three\n4. four";
        let doc = deserialize(source);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(
            doc.blocks[0],
            Block::paragraph(vec![TextRun::plain(source).raw()])
        );
    }

    #[test]
    fn test_deep_heading_falls_back_to_paragraph() {
        let doc = deserialize("#### Deep");
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[0].plain_text(), "#### Deep");
    }

    #[test]
    fn test_table_falls_back_to_paragraph() {
        let source = "| a | b |\n|---|---|\n| 1 | 2 |";
        let doc = deserialize(source);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[0].plain_text(), source);
    }

    #[test]
    fn test_nested_list_falls_back_to_paragraph() {
        let source = "- outer\n  - inner";
        let doc = deserialize(source);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[0].plain_text(), source);
    }

    #[test]
    fn test_lists() {
        let doc = deserialize("* one\n* two\n\n1. first\n2. second");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0], Block::list(false, vec![
            vec![TextRun::plain("one")],
            vec![TextRun::plain("two")],
        ]));
        assert_eq!(doc.blocks[1], Block::list(true, vec![
            vec![TextRun::plain("first")],
            vec![TextRun::plain("second")],
        ]));
    }

    #[test]
    fn test_loose_list_items() {
        let doc = deserialize("- one\n\n- two");
        assert_eq!(doc.blocks[0], Block::list(false, vec![
            vec![TextRun::plain("one")],
            vec![TextRun::plain("two")],
        ]));
    }

    #[test]
    fn test_code_block() {
        let doc = deserialize("```rust\nfn main() {\n    println!(\"hi\");\n}\n```");
        assert_eq!(
            doc.blocks[0],
            Block::code_block(
                Some("rust".to_string()),
                "fn main() {\n    println!(\"hi\");\n}"
            )
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let doc = deserialize("```\nx = 1\n```");
        assert_eq!(doc.blocks[0], Block::code_block(None, "x = 1"));
    }

    #[test]
    fn test_blockquote() {
        let doc = deserialize("> quoted *text*");
        assert_eq!(
            doc.blocks[0],
            Block::blockquote(vec![TextRun::plain("quoted "), TextRun::plain("text").italic()])
        );
    }

    #[test]
    fn test_blockquote_with_list_falls_back() {
        let source = "> - a\n> - b";
        let doc = deserialize(source);
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[0].plain_text(), source);
    }

    #[test]
    fn test_soft_break_kept() {
        let doc = deserialize("line one\nline two");
        assert_eq!(runs(&doc.blocks[0]), vec![TextRun::plain("line one\nline two")]);
    }

    #[test]
    fn test_rule_kept_as_source() {
        let doc = deserialize("above\n\n---\n\nbelow");
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[1].plain_text(), "---");
    }
}
