use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Fetch,
    Parse,
    InsufficientData,
}

/// Failure of a lookup stage. I/O paths wrap this in `anyhow::Error`; recover it with
/// `downcast_ref::<LookupError>()` or [`error_kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    Config(String),
    Fetch(String),
    Parse(String),
    InsufficientData(String),
}

impl LookupError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    pub fn fetch(detail: impl Into<String>) -> Self {
        Self::Fetch(detail.into())
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::Parse(detail.into())
    }

    pub fn insufficient_data(detail: impl Into<String>) -> Self {
        Self::InsufficientData(detail.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Parse(_) => ErrorKind::Parse,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Config(d) | Self::Fetch(d) | Self::Parse(d) | Self::InsufficientData(d) => d,
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind() {
            ErrorKind::Config => "config",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Parse => "parse",
            ErrorKind::InsufficientData => "insufficient data",
        };
        write!(f, "{stage} error: {}", self.detail())
    }
}

impl std::error::Error for LookupError {}

const MAX_BODY_CHARS: usize = 200;

/// Response body cut down for embedding in an error message.
pub(crate) fn body_excerpt(text: &str) -> String {
    truncate(text, MAX_BODY_CHARS)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Kind of the `LookupError` at the root of `err`, if there is one.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<LookupError>().map(LookupError::kind)
}
