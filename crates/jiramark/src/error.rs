#[derive(thiserror::Error, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Clipboard source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Clipboard source holds no usable Markdown")]
    SourceEmpty,

    #[error("Could not write to the clipboard: {0}")]
    SinkWriteFailure(String),
}
