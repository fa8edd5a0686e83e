use crate::clipboard::{ClipboardSink, ClipboardSource, StdinSource, StdoutSink, SystemClipboard};
use crate::prelude::{eprintln, *};
use colored::Colorize;
use jiramark_core::{convert, markdown_from_payload, ConvertOptions, Extraction, Origin};
use log::info;
use std::io::IsTerminal;

#[derive(Debug, Clone, Default, clap::Args)]
pub struct Options {
    /// Read the payload from stdin instead of the clipboard
    #[clap(long, env = "JIRAMARK_STDIN", default_value = "false")]
    pub stdin: bool,

    /// Print the Jira markup without writing it back to the clipboard
    #[clap(long, env = "JIRAMARK_PRINT_ONLY", default_value = "false")]
    pub print_only: bool,
}

/// One clipboard payload taken through extraction and conversion.
#[derive(Debug)]
pub struct Transfer {
    pub payload: String,
    pub extraction: Extraction,
    pub jira: String,
}

/// Read the source and convert whatever Markdown it carries.
///
/// Nothing is converted when the payload, or the Markdown extracted from it,
/// is blank.
pub fn convert_payload(
    source: &mut dyn ClipboardSource,
    options: &ConvertOptions,
) -> Result<Transfer, Error> {
    let payload = source.read()?;
    if payload.trim().is_empty() {
        return Err(Error::SourceEmpty);
    }

    let extraction = markdown_from_payload(&payload);
    if extraction.markdown.trim().is_empty() {
        return Err(Error::SourceEmpty);
    }

    let jira = convert(&extraction.markdown, options);
    info!(
        "converted {} bytes of markdown into {} bytes of jira markup",
        extraction.markdown.len(),
        jira.len()
    );

    Ok(Transfer {
        payload,
        extraction,
        jira,
    })
}

/// Write the markup to `sink`, then echo it.
///
/// `sink` is an error when the clipboard could not even be opened. The echo
/// happens in every case so the result is never lost; the sink error is still
/// returned.
pub fn deliver(
    jira: &str,
    sink: Result<&mut dyn ClipboardSink, Error>,
    echo: &mut dyn ClipboardSink,
) -> Result<(), Error> {
    let written = sink.and_then(|sink| sink.write(jira));
    echo.write(jira)?;
    written
}

fn describe_origin(origin: &Origin) -> String {
    match origin {
        Origin::RawAttribute { sections: 1 } => "1 data-markdown-raw section".to_string(),
        Origin::RawAttribute { sections } => f!("{sections} data-markdown-raw sections"),
        Origin::HtmlFallback => "HTML converted to Markdown".to_string(),
        Origin::PlainText => "plain text".to_string(),
    }
}

pub fn format_report(transfer: &Transfer, source: &str) -> String {
    let mut report = String::new();

    report.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    report.push_str(&f!("{}\n", "MARKDOWN TO JIRA".bright_cyan().bold()));
    report.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));

    report.push_str(&f!("\n{}: {}\n", "Source".green(), source.bright_white()));
    report.push_str(&f!(
        "{}: {}\n",
        "Payload".green(),
        f!("{} bytes", transfer.payload.len()).bright_yellow()
    ));
    report.push_str(&f!(
        "{}: {}\n",
        "Markdown".green(),
        describe_origin(&transfer.extraction.origin).bright_magenta()
    ));

    report.push_str(&f!("\n{}\n", "-".repeat(80).bright_magenta()));
    report.push_str(&f!("{}\n", "MARKDOWN".bright_magenta().bold()));
    report.push_str(&f!("{}\n", "-".repeat(80).bright_magenta()));
    report.push_str(&f!("{}\n", transfer.extraction.markdown));

    report.push_str(&f!("\n{}\n", "=".repeat(80).bright_magenta()));
    report.push_str(&f!("{}\n", "JIRA".bright_magenta().bold()));
    report.push_str(&f!("{}", "=".repeat(80).bright_magenta()));

    report
}

pub fn run(options: Options, global: crate::Global) -> Result<()> {
    let convert_options = global.convert_options();

    let (mut source, source_name): (Box<dyn ClipboardSource>, &str) = if options.stdin {
        (Box::new(StdinSource), "stdin")
    } else {
        let clipboard =
            SystemClipboard::open().map_err(|e| Error::SourceUnavailable(e.to_string()))?;
        (Box::new(clipboard), "clipboard")
    };

    let transfer = convert_payload(source.as_mut(), &convert_options)?;

    if std::io::stdout().is_terminal() {
        eprintln!("{}", format_report(&transfer, source_name));
    }

    if options.print_only {
        StdoutSink.write(&transfer.jira)?;
        return Ok(());
    }

    let mut opened = SystemClipboard::open();
    let sink = opened
        .as_mut()
        .map(|clipboard| clipboard as &mut dyn ClipboardSink)
        .map_err(|e| Error::SinkWriteFailure(e.to_string()));

    if let Err(err) = deliver(&transfer.jira, sink, &mut StdoutSink) {
        eprintln!("{}", "Failed to copy the Jira markup to the clipboard".red());
        return Err(err.into());
    }

    eprintln!("{}", "Copied the Jira markup to the clipboard".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource(Result<String, Error>);

    impl ClipboardSource for FakeSource {
        fn read(&mut self) -> Result<String, Error> {
            std::mem::replace(&mut self.0, Err(Error::SourceEmpty))
        }
    }

    #[derive(Default)]
    struct FakeSink {
        written: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for FakeSink {
        fn write(&mut self, text: &str) -> Result<(), Error> {
            if self.fail {
                return Err(Error::SinkWriteFailure("clipboard is locked".to_string()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn source(text: &str) -> FakeSource {
        FakeSource(Ok(text.to_string()))
    }

    #[test]
    fn test_converts_plain_markdown() {
        let transfer =
            convert_payload(&mut source("## Title\n- **one**"), &ConvertOptions::default())
                .unwrap();

        assert_eq!(transfer.jira, "h2. Title\n* *one*");
        assert_eq!(transfer.extraction.origin, Origin::PlainText);
    }

    #[test]
    fn test_converts_html_payload() {
        let html = r#"<html><body><div data-markdown-raw="`code` and *it*"></div></body></html>"#;
        let transfer = convert_payload(&mut source(html), &ConvertOptions::default()).unwrap();

        assert_eq!(transfer.jira, "{{code}} and _it_");
        assert_eq!(transfer.extraction.origin, Origin::RawAttribute { sections: 1 });
    }

    #[test]
    fn test_options_are_applied() {
        let options = ConvertOptions {
            escape_emoticons: false,
            ..ConvertOptions::default()
        };
        let transfer = convert_payload(&mut source("ok (y)"), &options).unwrap();
        assert_eq!(transfer.jira, "ok (y)");
    }

    #[test]
    fn test_unavailable_source_is_reported() {
        let mut source = FakeSource(Err(Error::SourceUnavailable("no text".to_string())));
        let err = convert_payload(&mut source, &ConvertOptions::default()).unwrap_err();
        assert_eq!(err, Error::SourceUnavailable("no text".to_string()));
    }

    #[test]
    fn test_blank_payload_is_empty() {
        let err = convert_payload(&mut source("  \n\t"), &ConvertOptions::default()).unwrap_err();
        assert_eq!(err, Error::SourceEmpty);
    }

    #[test]
    fn test_html_without_markdown_is_empty() {
        let html = r#"<div data-markdown-raw=""></div>"#;
        let err = convert_payload(&mut source(html), &ConvertOptions::default()).unwrap_err();
        assert_eq!(err, Error::SourceEmpty);
    }

    #[test]
    fn test_deliver_writes_sink_and_echo() {
        let mut sink = FakeSink::default();
        let mut echo = FakeSink::default();

        deliver("h1. Done", Ok(&mut sink), &mut echo).unwrap();

        assert_eq!(sink.written, vec!["h1. Done"]);
        assert_eq!(echo.written, vec!["h1. Done"]);
    }

    #[test]
    fn test_failed_sink_still_echoes_result() {
        let mut sink = FakeSink {
            fail: true,
            ..FakeSink::default()
        };
        let mut echo = FakeSink::default();

        let err = deliver("h1. Done", Ok(&mut sink), &mut echo).unwrap_err();

        assert!(matches!(err, Error::SinkWriteFailure(_)));
        assert_eq!(echo.written, vec!["h1. Done"]);
    }

    #[test]
    fn test_unopened_sink_still_echoes_result() {
        let mut echo = FakeSink::default();
        let unopened = Err(Error::SinkWriteFailure("no display".to_string()));

        let err = deliver("h1. Title\n* *one*", unopened, &mut echo).unwrap_err();

        assert_eq!(err, Error::SinkWriteFailure("no display".to_string()));
        assert_eq!(echo.written, vec!["h1. Title\n* *one*"]);
    }

    #[test]
    fn test_report_lists_sections() {
        let transfer = convert_payload(&mut source("**x**"), &ConvertOptions::default()).unwrap();
        let report = format_report(&transfer, "stdin");

        assert!(report.contains("MARKDOWN TO JIRA"));
        assert!(report.contains("stdin"));
        assert!(report.contains("plain text"));
        assert!(report.contains("**x**"));
    }

    #[test]
    fn test_describe_origin() {
        assert_eq!(
            describe_origin(&Origin::RawAttribute { sections: 1 }),
            "1 data-markdown-raw section"
        );
        assert_eq!(
            describe_origin(&Origin::RawAttribute { sections: 2 }),
            "2 data-markdown-raw sections"
        );
        assert_eq!(describe_origin(&Origin::HtmlFallback), "HTML converted to Markdown");
    }
}
