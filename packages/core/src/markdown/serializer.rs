//! Document → Markdown
//!
//! Blocks are rendered independently and joined by a blank line. Blocks that
//! render to nothing are dropped before the join.
//!
//! Text is written literally when that parses back to the same document.
//! Otherwise the block is written with its Markdown metacharacters
//! backslash-escaped, so `2*3*4` stays plain text and a paragraph starting
//! with `# ` stays a paragraph. Math spans and raw runs are never escaped.
//!
//! Leading and trailing whitespace of a bold or italic run is moved outside
//! its delimiters; whitespace at the edges of a block is not preserved.

use crate::markdown::deserialize;
use crate::models::{Block, BlockKind, Document, Element, TextRun};
use pulldown_cmark::{Event, Options, Parser};
use std::ops::Range;

/// Escaped wherever they appear in text outside math spans
const INLINE_METACHARS: &[char] = &['\\', '*', '_', '`', '[', ']', '<', '&', '$', '~', '|'];

/// Escaped as the first character of a line
const LINE_START_MARKERS: &[char] = &['#', '>', '-', '+', '='];

/// Serialize a document to Markdown
///
/// Pure: the document is only read. An empty document yields an empty string.
///
/// # Examples
///
/// ```
/// use problem_admin_core::markdown::serialize;
/// use problem_admin_core::models::{Block, Document, TextRun};
///
/// let doc = Document::new(vec![
///     Block::heading(2, vec![TextRun::plain("Title")]),
///     Block::paragraph(vec![TextRun::plain("bold").bold()]),
///     Block::paragraph(vec![TextRun::plain("2*3*4")]),
/// ]);
/// assert_eq!(serialize(&doc), "## Title\n\n**bold**\n\n2\\*3\\*4");
/// ```
pub fn serialize(document: &Document) -> String {
    document
        .blocks
        .iter()
        .map(render_block)
        .filter(|rendered| !rendered.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    let literal = render_block_as(block, false);
    let escaped = render_block_as(block, true);
    if literal == escaped || deserialize(&literal) == deserialize(&escaped) {
        literal
    } else {
        escaped
    }
}

fn render_block_as(block: &Block, escape: bool) -> String {
    if let Some(level) = block.kind.heading_level() {
        let mut writer = InlineWriter::new(escape, true);
        writer.write_children(&block.children);
        return format!("{} {}", "#".repeat(level), writer.out);
    }

    match block.kind {
        BlockKind::BulletedList => list_items(block, escape)
            .map(|item| format!("* {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
        BlockKind::NumberedList => list_items(block, escape)
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n"),
        BlockKind::CodeBlock => render_code_block(block),
        BlockKind::Blockquote => format!("> {}", render_inline(&block.children, escape)),
        _ => render_inline(&block.children, escape),
    }
}

/// Rendered text of each list item
///
/// Items are usually `li` blocks; stray text directly under the list is
/// treated as an item of its own.
fn list_items(list: &Block, escape: bool) -> impl Iterator<Item = String> + '_ {
    list.children.iter().map(move |child| match child {
        Element::Block(item) => render_inline(&item.children, escape),
        Element::Text(_) => render_inline(std::slice::from_ref(child), escape),
    })
}

fn render_code_block(block: &Block) -> String {
    let lines: Vec<String> = block
        .children
        .iter()
        .map(|child| match child {
            Element::Block(line) => line.plain_text(),
            Element::Text(run) => run.text.clone(),
        })
        .collect();
    let code = lines.join("\n");

    // Longer than any backtick run in the code, so no line can close it
    let fence = "`".repeat(longest_run(&code, '`').max(2) + 1);
    let lang = block.lang.as_deref().unwrap_or_default();
    if lines.is_empty() {
        return format!("{}{}\n{}", fence, lang, fence);
    }
    format!("{}{}\n{}\n{}", fence, lang, code, fence)
}

fn render_inline(children: &[Element], escape: bool) -> String {
    let mut writer = InlineWriter::new(escape, false);
    writer.write_children(children);
    writer.out
}

/// Inline Markdown of one block
struct InlineWriter {
    out: String,
    escape: bool,
    heading: bool,
    line_start: bool,
}

impl InlineWriter {
    fn new(escape: bool, heading: bool) -> Self {
        Self {
            out: String::new(),
            escape,
            heading,
            line_start: true,
        }
    }

    /// Write the runs below `children`, descending through nested blocks
    fn write_children(&mut self, children: &[Element]) {
        for child in children {
            match child {
                Element::Text(run) => self.write_run(run),
                Element::Block(block) => self.write_children(&block.children),
            }
        }
    }

    /// Wrap a run in its marks: code innermost, then italic, then bold
    fn write_run(&mut self, run: &TextRun) {
        let delimiter = match (run.bold, run.italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        };

        let (lead, core, trail) = if delimiter.is_empty() || run.code {
            ("", run.text.as_str(), "")
        } else {
            split_outer_whitespace(&run.text)
        };
        if core.is_empty() {
            self.write_text(&run.text, run.raw);
            return;
        }

        self.write_text(lead, run.raw);
        self.write_markup(delimiter);
        if run.code {
            self.write_markup(&code_span(core));
        } else {
            self.write_text(core, run.raw);
        }
        self.write_markup(delimiter);
        self.write_text(trail, run.raw);
    }

    fn write_markup(&mut self, markup: &str) {
        if !markup.is_empty() {
            self.out.push_str(markup);
            self.line_start = false;
        }
    }

    fn write_text(&mut self, text: &str, raw: bool) {
        if raw || !self.escape {
            self.out.push_str(text);
            if let Some(last) = text.chars().last() {
                self.line_start = last == '\n';
            }
            return;
        }

        let mut pos = 0;
        for span in math_spans(text) {
            self.write_escaped(&text[pos..span.start]);
            self.out.push_str(&text[span.clone()]);
            self.line_start = false;
            pos = span.end;
        }
        self.write_escaped(&text[pos..]);
    }

    fn write_escaped(&mut self, text: &str) {
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            let len = c.len_utf8();

            // Dropped by the parser anyway; four spaces would open a code block
            if self.out.is_empty() && c.is_whitespace() {
                rest = &rest[len..];
                continue;
            }

            if self.line_start && !matches!(c, ' ' | '\t' | '\n') {
                self.line_start = false;
                if let Some(digits) = ordered_marker(rest) {
                    // `3.` or `3)`: the digits stay, the delimiter is escaped
                    self.out.push_str(&rest[..digits]);
                    self.out.push('\\');
                    self.out.push_str(&rest[digits..digits + 1]);
                    rest = &rest[digits + 1..];
                    continue;
                }
                if LINE_START_MARKERS.contains(&c) {
                    self.out.push('\\');
                    self.out.push(c);
                    rest = &rest[len..];
                    continue;
                }
            }

            if c == '\n' {
                self.line_start = true;
            }
            if INLINE_METACHARS.contains(&c) || (self.heading && c == '#') {
                self.out.push('\\');
            }
            self.out.push(c);
            rest = &rest[len..];
        }
    }
}

/// `(leading whitespace, rest, trailing whitespace)`
fn split_outer_whitespace(text: &str) -> (&str, &str, &str) {
    let trimmed_start = text.trim_start();
    let lead = &text[..text.len() - trimmed_start.len()];
    let core = trimmed_start.trim_end();
    let trail = &trimmed_start[core.len()..];
    (lead, core, trail)
}

/// Length of the digit run of an ordered-list marker (`12.`, `3)`) at the
/// start of `text`
fn ordered_marker(text: &str) -> Option<usize> {
    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    matches!(text.as_bytes().get(digits), Some(b'.') | Some(b')')).then_some(digits)
}

fn longest_run(text: &str, ch: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == ch {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// A code span whose backtick fence cannot occur inside `text`
fn code_span(text: &str) -> String {
    let fence = "`".repeat(longest_run(text, '`') + 1);
    // The parser strips one space from each side of padded content
    let padded = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.trim_matches(' ').is_empty());
    if padded {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

/// Byte ranges of the math spans in `text`, delimiters included
fn math_spans(text: &str) -> Vec<Range<usize>> {
    if !text.contains('$') {
        return Vec::new();
    }
    Parser::new_ext(text, Options::ENABLE_MATH)
        .into_offset_iter()
        .filter(|(event, _)| matches!(event, Event::InlineMath(_) | Event::DisplayMath(_)))
        .map(|(_, range)| range)
        .collect()
}
