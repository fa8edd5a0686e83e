//! Block-level rules: code fences, pre-existing Jira blocks and tables.
//!
//! Each rule takes the document as lines and returns it as lines, with every
//! converted block collapsed into a single placeholder line.

use super::inline;
use super::mask::Masks;
use super::ConvertOptions;
use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

const FENCE: &str = "```";

static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").expect("separator pattern is valid")
});

/// Replace fenced code blocks with `{code}` blocks and protect them.
///
/// A fence without a closing line is left in place as ordinary text.
pub(crate) fn mask_code_fences(lines: Vec<String>, masks: &mut Masks) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(lang) = fence_language(&lines[i]) else {
            output.push(lines[i].clone());
            i += 1;
            continue;
        };

        let Some(close) = (i + 1..lines.len()).find(|&j| is_closing_fence(&lines[j])) else {
            trace!("unterminated code fence at line {}", i + 1);
            output.push(lines[i].clone());
            i += 1;
            continue;
        };

        let open = match lang {
            "" => "{code}".to_string(),
            lang => format!("{{code:{lang}}}"),
        };

        let mut block = vec![open];
        block.extend(lines[i + 1..close].iter().cloned());
        block.push("{code}".to_string());

        debug!(
            "masked code fence at line {} ({} body lines)",
            i + 1,
            close - i - 1
        );
        output.push(masks.protect(block.join("\n")));
        i = close + 1;
    }

    output
}

/// Protect `{code}` and `{noformat}` blocks that are already Jira markup.
pub(crate) fn mask_jira_blocks(lines: Vec<String>, masks: &mut Masks) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(macro_name) = jira_block_macro(&lines[i]) else {
            output.push(lines[i].clone());
            i += 1;
            continue;
        };

        let closing = format!("{{{macro_name}}}");
        match (i + 1..lines.len()).find(|&j| lines[j].trim() == closing) {
            Some(close) => {
                trace!("protected existing {{{macro_name}}} block at line {}", i + 1);
                output.push(masks.protect_verbatim(lines[i..=close].join("\n")));
                i = close + 1;
            }
            None => {
                output.push(lines[i].clone());
                i += 1;
            }
        }
    }

    output
}

/// Convert pipe tables whose second row is a separator row.
pub(crate) fn convert_tables(
    lines: Vec<String>,
    masks: &mut Masks,
    options: &ConvertOptions,
) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let starts_table = is_table_row(&lines[i])
            && lines
                .get(i + 1)
                .is_some_and(|next| next.contains('|') && TABLE_SEPARATOR.is_match(next.trim()));

        if !starts_table {
            output.push(lines[i].clone());
            i += 1;
            continue;
        }

        let mut rows = vec![render_row(&lines[i], true, masks, options)];
        let mut end = i + 2;
        while end < lines.len() && is_table_row(&lines[end]) {
            rows.push(render_row(&lines[end], false, masks, options));
            end += 1;
        }

        debug!("converted table at line {} ({} rows)", i + 1, rows.len());
        output.push(masks.protect(rows.join("\n")));
        i = end;
    }

    output
}

fn fence_language(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(FENCE)?;
    let info = rest.trim();
    if info.contains('`') {
        return None;
    }
    Some(info.split_whitespace().next().unwrap_or(""))
}

fn is_closing_fence(line: &str) -> bool {
    line.trim() == FENCE
}

fn jira_block_macro(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    let is_opening = |name: &str| {
        trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_prefix(name))
            .is_some_and(|rest| rest == "}" || (rest.starts_with(':') && rest.ends_with('}')))
    };

    ["code", "noformat"]
        .into_iter()
        .find(|name| is_opening(*name))
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn render_row(line: &str, header: bool, masks: &mut Masks, options: &ConvertOptions) -> String {
    let delimiter = if header { "||" } else { "|" };
    let cells: Vec<String> = split_cells(line)
        .into_iter()
        .map(|cell| match cell.trim() {
            "" => " ".to_string(),
            text => inline::convert(text, masks, options),
        })
        .collect();

    format!("{delimiter}{}{delimiter}", cells.join(delimiter))
}

/// Split a table row on unescaped pipes outside inline code spans.
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_code = false;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '`' => {
                in_code = !in_code;
                current.push(c);
            }
            '|' if !in_code => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells
}
