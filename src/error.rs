use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// Selection axis a command-line token is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Paradigm,
    Type,
    Channel,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Paradigm => write!(f, "paradigm"),
            Axis::Type => write!(f, "type"),
            Axis::Channel => write!(f, "channel"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("{}", invalid_selection_message(*axis, tokens))]
    #[diagnostic(help("run with --help to list the accepted tokens"))]
    InvalidSelection { axis: Axis, tokens: Vec<String> },

    #[error("submit failed: {status}: {message}")]
    LoginRejected { status: u16, message: String },

    #[error("no login form found on the challenge page for {0}")]
    LoginFormMissing(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("unable to obtain credentials: {0}")]
    Credentials(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

impl FetchError {
    /// Whether the error aborts the whole batch rather than a single target.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidSelection { .. }
                | FetchError::LoginRejected { .. }
                | FetchError::LoginFormMissing(_)
                | FetchError::Credentials(_)
                | FetchError::ConfigRead(_)
                | FetchError::ConfigParse(_)
        )
    }
}

fn invalid_selection_message(axis: Axis, tokens: &[String]) -> String {
    let plural = if tokens.len() == 1 { "" } else { "s" };
    format!("invalid {axis}{plural}: {}", tokens.join(", "))
}
