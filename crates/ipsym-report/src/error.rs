use thiserror::Error;

/// An error reading or converting an IPS report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report has no content at all.
    #[error("the report is empty")]
    Empty,
    /// The first line of the report is not a JSON object.
    #[error("failed to parse the report header")]
    InvalidHeader(#[source] serde_json::Error),
    /// A field the legacy format cannot do without is absent from the header.
    #[error("the report header has no `{0}` field")]
    MissingField(&'static str),
    /// A header field holds an array or an object instead of a plain value.
    #[error("the report header field `{0}` is not a plain value")]
    InvalidField(&'static str),
    /// The header timestamp does not look like `YYYY-MM-DD HH:MM:SS.ff`.
    #[error("invalid report timestamp `{0}`")]
    InvalidTimestamp(String),
    /// Reading or writing a report file failed.
    #[error("failed to access the report file")]
    Io(#[from] std::io::Error),
}
