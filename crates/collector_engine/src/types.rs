use std::fmt;

/// One currently rendered feed item, as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub html: String,
}

impl RenderedItem {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

/// Per-pass bookkeeping, mostly for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanStats {
    pub pass: u64,
    pub rendered: usize,
    pub unusable: usize,
    pub already_seen: usize,
    pub irrelevant: usize,
    pub collected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanAck {
    pub collected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitError {
    pub kind: SubmitFailure,
    pub message: String,
}

impl SubmitError {
    pub(crate) fn new(kind: SubmitFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
    TooLarge { max_bytes: u64 },
    Encode,
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitFailure::InvalidEndpoint => write!(f, "invalid endpoint"),
            SubmitFailure::HttpStatus(code) => write!(f, "collector returned {code}"),
            SubmitFailure::Timeout => write!(f, "timeout"),
            SubmitFailure::Network => write!(f, "network error"),
            SubmitFailure::MalformedResponse => write!(f, "malformed response"),
            SubmitFailure::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            SubmitFailure::Encode => write!(f, "could not encode batch"),
        }
    }
}
