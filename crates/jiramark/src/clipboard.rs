use crate::prelude::*;
use log::{debug, warn};
use std::io::{Read, Write};

/// Something that supplies the raw clipboard payload.
pub trait ClipboardSource {
    fn read(&mut self) -> Result<String, Error>;
}

/// Something that accepts the converted Jira markup.
pub trait ClipboardSink {
    fn write(&mut self, text: &str) -> Result<(), Error>;
}

/// The operating system clipboard.
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn open() -> Result<Self, arboard::Error> {
        arboard::Clipboard::new().map(|clipboard| Self { clipboard })
    }
}

impl ClipboardSource for SystemClipboard {
    fn read(&mut self) -> Result<String, Error> {
        let html = self.clipboard.get().html();
        prefer_html(html, || self.clipboard.get_text())
    }
}

/// Pick the HTML representation when there is one, the plain text otherwise.
///
/// Editors keep the raw Markdown on the HTML target, so the text target is
/// only a fallback.
fn prefer_html(
    html: Result<String, arboard::Error>,
    text: impl FnOnce() -> Result<String, arboard::Error>,
) -> Result<String, Error> {
    match html {
        Ok(html) if !html.trim().is_empty() => {
            debug!("read {} bytes of HTML from the clipboard", html.len());
            return Ok(html);
        }
        Ok(_) | Err(arboard::Error::ContentNotAvailable) => {
            debug!("no HTML on the clipboard, reading plain text")
        }
        Err(e) => warn!("could not read HTML from the clipboard, reading plain text: {e}"),
    }

    match text() {
        Ok(text) => {
            debug!("read {} bytes of text from the clipboard", text.len());
            Ok(text)
        }
        Err(arboard::Error::ContentNotAvailable) => Err(Error::SourceUnavailable(
            "the clipboard holds neither HTML nor text".to_string(),
        )),
        Err(e) => Err(Error::SourceUnavailable(e.to_string())),
    }
}

impl ClipboardSink for SystemClipboard {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        #[cfg(target_os = "linux")]
        let result = {
            use arboard::SetExtLinux;
            // Block until a clipboard manager takes ownership, or the text is
            // gone as soon as the process exits.
            self.clipboard.set().wait().text(text.to_string())
        };

        #[cfg(not(target_os = "linux"))]
        let result = self.clipboard.set_text(text.to_string());

        result.map_err(|e| {
            warn!("clipboard write failed: {e}");
            Error::SinkWriteFailure(e.to_string())
        })
    }
}

/// Reads the payload from standard input.
pub struct StdinSource;

impl ClipboardSource for StdinSource {
    fn read(&mut self) -> Result<String, Error> {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| Error::SourceUnavailable(f!("failed to read stdin: {e}")))?;

        debug!("read {} bytes from stdin", buffer.len());
        Ok(buffer)
    }
}

/// Writes the markup to standard output.
pub struct StdoutSink;

impl ClipboardSink for StdoutSink {
    fn write(&mut self, text: &str) -> Result<(), Error> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")
            .and_then(|_| stdout.flush())
            .map_err(|e| Error::SinkWriteFailure(f!("failed to write stdout: {e}")))
    }
}
