//! Placeholder tokens that shield converted text from later rules.
//!
//! Every protected span is swapped for `U+E000 <index> U+E001`. Private-use
//! code points never appear in the rule patterns, so no rule can match inside
//! a token. [`Masks::restore`] swaps the tokens back once the pipeline is done.

use regex::{Captures, Regex};
use std::sync::LazyLock;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").expect("token pattern is valid"));

#[derive(Debug)]
struct Entry {
    text: String,
    /// Verbatim entries are restored as-is, without looking for nested tokens.
    verbatim: bool,
}

/// Table of protected spans for a single conversion.
#[derive(Debug, Default)]
pub(crate) struct Masks {
    entries: Vec<Entry>,
}

impl Masks {
    /// Protect `text`; nested tokens inside it are restored too.
    pub(crate) fn protect(&mut self, text: impl Into<String>) -> String {
        self.push(text.into(), false)
    }

    /// Protect `text` exactly as given.
    pub(crate) fn protect_verbatim(&mut self, text: impl Into<String>) -> String {
        self.push(text.into(), true)
    }

    /// Protect token look-alikes already present in the input, so a stray
    /// private-use sequence survives the round trip unchanged.
    pub(crate) fn shield_reserved(&mut self, text: &str) -> String {
        if !text.contains(OPEN) {
            return text.to_string();
        }

        TOKEN
            .replace_all(text, |caps: &Captures| self.protect_verbatim(&caps[0]))
            .into_owned()
    }

    /// Replace every token in `text` with the text it stands for.
    pub(crate) fn restore(&self, text: &str) -> String {
        self.restore_below(text, self.entries.len())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn push(&mut self, text: String, verbatim: bool) -> String {
        let index = self.entries.len();
        self.entries.push(Entry { text, verbatim });
        format!("{OPEN}{index}{CLOSE}")
    }

    // An entry can only reference entries created before it, so bounding the
    // lookup by index guarantees termination.
    fn restore_below(&self, text: &str, limit: usize) -> String {
        if !text.contains(OPEN) {
            return text.to_string();
        }

        TOKEN
            .replace_all(text, |caps: &Captures| {
                let index = caps[1].parse::<usize>().ok().filter(|i| *i < limit);
                match index.map(|i| (i, &self.entries[i])) {
                    Some((_, entry)) if entry.verbatim => entry.text.clone(),
                    Some((i, entry)) => self.restore_below(&entry.text, i),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
