//! Markdown to Jira Wiki Markup conversion.
//!
//! The conversion is an ordered pipeline of pure stages:
//!
//! 1. Normalize line endings and shield reserved placeholder characters.
//! 2. Mask fenced code blocks and existing Jira `{code}`/`{noformat}` blocks.
//! 3. Convert tables, masking each finished table.
//! 4. Classify every remaining line (header, rule, quote, list item, text).
//! 5. Run the inline rules over each line's text and render the Jira prefix.
//! 6. Restore every mask token.
//!
//! Masked text is opaque to every later stage, so code bodies and finished
//! blocks are never rewritten twice.

mod block;
mod inline;
mod line;
mod mask;

use log::debug;
use mask::Masks;
use serde::{Deserialize, Serialize};

/// Knobs for the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Escape Jira emoticon tokens such as `(y)` so they render literally.
    pub escape_emoticons: bool,
    /// Drop blank lines between list items so Jira keeps a single list.
    pub compact_lists: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            escape_emoticons: true,
            compact_lists: false,
        }
    }
}

/// Convert Markdown to Jira Wiki Markup with the default options.
pub fn markdown_to_jira(markdown: &str) -> String {
    convert(markdown, &ConvertOptions::default())
}

/// Convert Markdown to Jira Wiki Markup.
///
/// Never fails: syntax that matches no rule is copied through unchanged.
pub fn convert(markdown: &str, options: &ConvertOptions) -> String {
    let mut masks = Masks::default();

    let text = markdown.replace("\r\n", "\n");
    let text = masks.shield_reserved(&text);
    let lines: Vec<String> = text.split('\n').map(String::from).collect();

    let lines = block::mask_code_fences(lines, &mut masks);
    let lines = block::mask_jira_blocks(lines, &mut masks);
    let lines = block::convert_tables(lines, &mut masks, options);

    let classified: Vec<line::Line> = lines.iter().map(|l| line::classify(l)).collect();
    let rendered = line::render(&classified, &mut masks, options).join("\n");

    debug!(
        "converted {} lines with {} masked spans",
        classified.len(),
        masks.len()
    );

    masks.restore(&rendered)
}
