//! Inline rules applied to the text content of a line or table cell.
//!
//! Rules run in a fixed order. Anything that must not be seen by a later rule
//! (code spans, URLs, escapes, bold runs) is swapped for a mask token first.

use super::mask::Masks;
use super::ConvertOptions;
use regex::{Captures, Regex};
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!(stringify!($name), " pattern is valid")));
    };
}

pattern!(ESCAPE, r"\\[\\`*_{}\[\]()#+\-.!~|>]");
pattern!(MONOSPACE, r"\{\{.+?\}\}");
pattern!(DOUBLE_CODE, r"``(.+?)``");
pattern!(CODE, r"`([^`]+)`");
// URLs may hold one level of balanced parentheses, as in `Rust_(lang)`.
pattern!(IMAGE, r#"!\[([^\]]*)\]\(((?:[^()\s]|\([^()\s]*\))+)(?:\s+"[^"]*")?\)"#);
pattern!(LINK, r#"\[([^\]]*)\]\(((?:[^()\s]|\([^()\s]*\))+)(?:\s+"[^"]*")?\)"#);
pattern!(EMOTICON, r"\((?:flagoff|flag|off|on|\*[rgby]|[yni!?*+\-x/])\)");
pattern!(STRIKE, r"~~(.+?)~~");
pattern!(BOLD_ITALIC, r"\*\*\*([^*\s](?:[^*]*?[^*\s])?)\*\*\*");
pattern!(BOLD, r"\*\*(.+?)\*\*");
pattern!(ITALIC, r"\*([^*\s](?:[^*]*?[^*\s])?)\*");

/// Convert the inline Markdown in `text` to Jira markup.
///
/// The result may hold mask tokens; the caller restores them once the whole
/// document has been converted.
pub(crate) fn convert(text: &str, masks: &mut Masks, options: &ConvertOptions) -> String {
    let text = protect_escapes(text, masks);
    let text = protect_monospace(&text, masks);
    let text = code_spans(&text, masks);
    let text = images(&text, masks);
    let text = links(&text, masks);
    let text = if options.escape_emoticons {
        escape_emoticons(&text, masks)
    } else {
        text
    };
    let text = strikethrough(&text);
    let text = bold(&text, masks);

    italic(&text)
}

fn protect_escapes(text: &str, masks: &mut Masks) -> String {
    ESCAPE
        .replace_all(text, |caps: &Captures| masks.protect_verbatim(&caps[0]))
        .into_owned()
}

/// `{{…}}` is already Jira monospace.
fn protect_monospace(text: &str, masks: &mut Masks) -> String {
    MONOSPACE
        .replace_all(text, |caps: &Captures| masks.protect_verbatim(&caps[0]))
        .into_owned()
}

fn code_spans(text: &str, masks: &mut Masks) -> String {
    let text = DOUBLE_CODE.replace_all(text, |caps: &Captures| {
        masks.protect_verbatim(format!("{{{{{}}}}}", caps[1].trim()))
    });

    CODE.replace_all(&text, |caps: &Captures| {
        masks.protect_verbatim(format!("{{{{{}}}}}", &caps[1]))
    })
    .into_owned()
}

fn images(text: &str, masks: &mut Masks) -> String {
    IMAGE
        .replace_all(text, |caps: &Captures| {
            masks.protect_verbatim(format!("!{}!", &caps[2]))
        })
        .into_owned()
}

fn links(text: &str, masks: &mut Masks) -> String {
    LINK.replace_all(text, |caps: &Captures| {
        let url = masks.protect_verbatim(&caps[2]);
        match &caps[1] {
            "" => format!("[{url}]"),
            label => format!("[{label}|{url}]"),
        }
    })
    .into_owned()
}

/// Jira renders tokens such as `(y)` or `(x)` as icons unless escaped.
fn escape_emoticons(text: &str, masks: &mut Masks) -> String {
    EMOTICON
        .replace_all(text, |caps: &Captures| {
            masks.protect_verbatim(format!("\\{}", &caps[0]))
        })
        .into_owned()
}

fn strikethrough(text: &str) -> String {
    STRIKE.replace_all(text, "-$1-").into_owned()
}

/// Bold runs are masked so their asterisks are never read as italic markers.
fn bold(text: &str, masks: &mut Masks) -> String {
    let text = BOLD_ITALIC.replace_all(text, |caps: &Captures| {
        masks.protect(format!("*_{}_*", &caps[1]))
    });

    BOLD.replace_all(&text, |caps: &Captures| {
        masks.protect(format!("*{}*", italic(&caps[1])))
    })
    .into_owned()
}

fn italic(text: &str) -> String {
    ITALIC.replace_all(text, "_${1}_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        run_with(text, &ConvertOptions::default())
    }

    fn run_with(text: &str, options: &ConvertOptions) -> String {
        let mut masks = Masks::default();
        let converted = convert(text, &mut masks, options);
        masks.restore(&converted)
    }

    #[test]
    fn test_bold() {
        assert_eq!(run("**bold text**"), "*bold text*");
    }

    #[test]
    fn test_italic() {
        assert_eq!(run("*italic text*"), "_italic text_");
    }

    #[test]
    fn test_bold_and_italic_do_not_collide() {
        assert_eq!(run("**bold** and *italic*"), "*bold* and _italic_");
        assert_eq!(run("*a* then **b** then *c*"), "_a_ then *b* then _c_");
    }

    #[test]
    fn test_bold_italic_triple() {
        assert_eq!(run("***both***"), "*_both_*");
    }

    #[test]
    fn test_italic_inside_bold() {
        assert_eq!(run("**very *much* so**"), "*very _much_ so*");
    }

    #[test]
    fn test_underscore_italic_is_untouched() {
        assert_eq!(run("_already jira_"), "_already jira_");
        assert_eq!(run("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn test_lone_asterisks_pass_through() {
        assert_eq!(run("2 * 3 * 4"), "2 * 3 * 4");
        assert_eq!(run("a * b"), "a * b");
        assert_eq!(run("**unclosed"), "**unclosed");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(run("~~gone~~"), "-gone-");
        assert_eq!(run("~~**both**~~"), "-*both*-");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(run("`code`"), "{{code}}");
        assert_eq!(run("call `a*b*c` now"), "call {{a*b*c}} now");
    }

    #[test]
    fn test_double_backtick_code() {
        assert_eq!(run("``a `tick` b``"), "{{a `tick` b}}");
    }

    #[test]
    fn test_existing_monospace_is_protected() {
        assert_eq!(run("{{a*b*c}}"), "{{a*b*c}}");
    }

    #[test]
    fn test_links() {
        assert_eq!(run("[text](http://x)"), "[text|http://x]");
        assert_eq!(
            run("see [the *docs*](https://a.io/x_y_z \"Title\")"),
            "see [the _docs_|https://a.io/x_y_z]"
        );
        assert_eq!(run("[](http://x)"), "[http://x]");
    }

    #[test]
    fn test_link_url_with_parentheses() {
        assert_eq!(
            run("[Rust](https://en.wikipedia.org/wiki/Rust_(lang))"),
            "[Rust|https://en.wikipedia.org/wiki/Rust_(lang)]"
        );
        assert_eq!(run("(see [a](http://x))"), "(see [a|http://x])");
        assert_eq!(run("![d](http://x/d_(1).png)"), "!http://x/d_(1).png!");
    }

    #[test]
    fn test_link_url_is_not_rewritten() {
        assert_eq!(
            run("[a](http://x/**y**/~~z~~)"),
            "[a|http://x/**y**/~~z~~]"
        );
    }

    #[test]
    fn test_images() {
        assert_eq!(run("![diagram](http://x/d.png)"), "!http://x/d.png!");
    }

    #[test]
    fn test_unmatched_link_syntax_passes_through() {
        assert_eq!(run("[text] (not a link)"), "[text] (not a link)");
        assert_eq!(run("[text](with space)"), "[text](with space)");
    }

    #[test]
    fn test_emoticons_are_escaped() {
        assert_eq!(run("looks good (y)"), "looks good \\(y)");
        assert_eq!(run("(flagoff) and (flag)"), "\\(flagoff) and \\(flag)");
        assert_eq!(run("star (*) and *em*"), "star \\(*) and _em_");
    }

    #[test]
    fn test_escaped_emoticons_are_not_escaped_twice() {
        assert_eq!(run("\\(y)"), "\\(y)");
    }

    #[test]
    fn test_emoticon_escaping_can_be_disabled() {
        let options = ConvertOptions {
            escape_emoticons: false,
            ..ConvertOptions::default()
        };
        assert_eq!(run_with("ok (y)", &options), "ok (y)");
    }

    #[test]
    fn test_markdown_escapes_are_kept() {
        assert_eq!(run("\\*not italic\\*"), "\\*not italic\\*");
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "Nothing to convert here, (really) 100%.";
        assert_eq!(run(text), text);
    }
}
