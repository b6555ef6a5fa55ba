use std::fmt;

#[derive(Debug)]
pub enum AlertError {
    /// The label was not part of the configured label set.
    UnknownLabel(String),
    Detect(String),
    Dispatch(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for AlertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertError::UnknownLabel(label) => write!(f, "unknown label: {label}"),
            AlertError::Detect(msg) => write!(f, "detection failed: {msg}"),
            AlertError::Dispatch(msg) => write!(f, "alert dispatch failed: {msg}"),
            AlertError::Io(err) => write!(f, "io error: {err}"),
            AlertError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for AlertError {}

impl From<std::io::Error> for AlertError {
    fn from(err: std::io::Error) -> Self {
        AlertError::Io(err)
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        AlertError::Json(err)
    }
}
