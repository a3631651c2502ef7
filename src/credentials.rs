use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use dialoguer::{Input, Password};
use tracing::debug;

use crate::error::FetchError;

/// Archive login. Held in memory only; `Debug` never shows the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait CredentialProvider {
    fn obtain(&self) -> Result<Credentials, FetchError>;
}

/// Interactive fallback used when the credential file does not cover a field.
pub trait Prompt {
    fn username(&self) -> Result<String, FetchError>;
    fn password(&self) -> Result<String, FetchError>;
}

pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn username(&self) -> Result<String, FetchError> {
        Input::<String>::new()
            .with_prompt("Enter username")
            .interact_text()
            .map_err(|err| FetchError::Credentials(err.to_string()))
    }

    fn password(&self) -> Result<String, FetchError> {
        Password::new()
            .with_prompt("Enter password")
            .interact()
            .map_err(|err| FetchError::Credentials(err.to_string()))
    }
}

/// Reads `<tag>:<username>:<password>` from a line-oriented file and prompts
/// for whatever the file does not provide.
pub struct FileCredentialProvider<P: Prompt> {
    path: PathBuf,
    tag: String,
    prompt: P,
}

impl<P: Prompt> FileCredentialProvider<P> {
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>, prompt: P) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
            prompt,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<P: Prompt> CredentialProvider for FileCredentialProvider<P> {
    fn obtain(&self) -> Result<Credentials, FetchError> {
        let (username, password) = match fs::read_to_string(&self.path) {
            Ok(content) => parse_credential_file(&content, &self.tag),
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "credential file unavailable");
                (None, None)
            }
        };

        let username = match username {
            Some(value) => value,
            None => self.prompt.username()?,
        };
        let password = match password {
            Some(value) => value,
            None => self.prompt.password()?,
        };
        Ok(Credentials { username, password })
    }
}

/// Username and password from the first line tagged with `tag`. Empty fields
/// count as missing.
pub fn parse_credential_file(content: &str, tag: &str) -> (Option<String>, Option<String>) {
    let prefix = format!("{tag}:");
    let Some(line) = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&prefix))
    else {
        return (None, None);
    };

    let mut fields = line[prefix.len()..].splitn(2, ':');
    let field = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let username = field(fields.next());
    let password = field(fields.next());
    (username, password)
}
