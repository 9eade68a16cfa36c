use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A `<div>` carried direct text. Aborts the page being converted.
    UnexpectedContent(String),
    /// The page header date/time matched neither the primary nor the fallback format.
    DateParse { input: String },
    Io(std::io::Error),
    Json(serde_json::Error),
    Xml(roxmltree::Error),
    InvalidArchive(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedContent(text) => write!(f, "<div> unexpectedly has text: {text:?}"),
            Error::DateParse { input } => write!(f, "could not parse page date {input:?}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Xml(e) => write!(f, "XML error: {e}"),
            Error::InvalidArchive(msg) => write!(f, "invalid MHT archive: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}
