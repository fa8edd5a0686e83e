//! Line-level rules: headers, horizontal rules, blockquotes and lists.
//!
//! Lines are classified on their raw Markdown first, so list markers and
//! header hashes are never mistaken for emphasis. The text content then goes
//! through the inline rules and the Jira prefix is put back around it.

use super::inline;
use super::mask::Masks;
use super::ConvertOptions;
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("heading pattern is valid"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|[0-9]+[.)])[ \t]+(.*)$").expect("list item pattern is valid")
});

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn marker(self) -> char {
        match self {
            ListKind::Unordered => '*',
            ListKind::Ordered => '#',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Blank(&'a str),
    Heading { level: usize, text: &'a str },
    Rule,
    Quote(&'a str),
    Item { indent: usize, kind: ListKind, text: &'a str },
    Text(&'a str),
}

/// Classify a single raw line.
pub(crate) fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank(line);
    }

    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len());
        let text = caps.get(2).map_or("", |m| m.as_str().trim());
        return Line::Heading { level, text };
    }

    if is_rule(line) {
        return Line::Rule;
    }

    if let Some(rest) = line.strip_prefix('>') {
        let text = rest.trim();
        if !text.is_empty() {
            return Line::Quote(text);
        }
    }

    if let Some(caps) = LIST_ITEM.captures(line) {
        let indent = caps.get(1).map_or(0, |m| indent_width(m.as_str()));
        let kind = match caps.get(2).map(|m| m.as_str()) {
            Some("-" | "*" | "+") => ListKind::Unordered,
            _ => ListKind::Ordered,
        };
        let text = caps.get(3).map_or("", |m| m.as_str().trim_end());
        return Line::Item { indent, kind, text };
    }

    Line::Text(line)
}

/// Render classified lines as Jira markup.
pub(crate) fn render(lines: &[Line<'_>], masks: &mut Masks, options: &ConvertOptions) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    let mut nesting = Nesting::default();

    for (i, line) in lines.iter().enumerate() {
        match *line {
            Line::Blank(raw) => {
                if options.compact_lists && nesting.is_open() && next_is_item(&lines[i + 1..]) {
                    continue;
                }
                output.push(raw.to_string());
            }
            Line::Heading { level, text } => {
                nesting.close();
                output.push(format!("h{level}. {}", inline::convert(text, masks, options)));
            }
            Line::Rule => {
                nesting.close();
                output.push("----".to_string());
            }
            Line::Quote(text) => {
                nesting.close();
                output.push(format!("{{quote}}{}{{quote}}", inline::convert(text, masks, options)));
            }
            Line::Item { indent, kind, text } => {
                let prefix = nesting.push(indent, kind);
                output.push(format!("{prefix} {}", inline::convert(text, masks, options)));
            }
            Line::Text(text) => {
                // Indented text under an item continues it.
                if !text.starts_with([' ', '\t']) {
                    nesting.close();
                }
                output.push(inline::convert(text, masks, options));
            }
        }
    }

    output
}

/// A line made only of three or more identical `-`, `*` or `_` characters.
fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first @ ('-' | '*' | '_')) => trimmed.len() >= 3 && chars.all(|c| c == first),
        _ => false,
    }
}

fn indent_width(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

fn next_is_item(rest: &[Line<'_>]) -> bool {
    rest.iter()
        .find(|line| !matches!(line, Line::Blank(_)))
        .is_some_and(|line| matches!(line, Line::Item { .. }))
}

/// Indentation stack of the list being rendered.
///
/// Each entry is the indentation of a nesting level and the Jira marker used
/// at that level, so an unordered item under an ordered one renders as `#*`.
#[derive(Debug, Default)]
struct Nesting {
    levels: Vec<(usize, char)>,
}

impl Nesting {
    fn push(&mut self, indent: usize, kind: ListKind) -> String {
        while self.levels.last().is_some_and(|&(top, _)| top > indent) {
            self.levels.pop();
        }

        match self.levels.last_mut() {
            Some(top) if top.0 == indent => top.1 = kind.marker(),
            _ => self.levels.push((indent, kind.marker())),
        }

        self.levels.iter().map(|&(_, marker)| marker).collect()
    }

    fn is_open(&self) -> bool {
        !self.levels.is_empty()
    }

    fn close(&mut self) {
        self.levels.clear();
    }
}
