use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::credentials::{CredentialProvider, Credentials};
use crate::error::FetchError;
use crate::http::{HttpResponse, HttpTransport};
use crate::login::LoginForm;

/// Result of fetching one target. Fatal conditions are returned as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { path: Utf8PathBuf, bytes: u64 },
    NothingToDownload { reason: String },
}

/// Authenticated session against the archive.
///
/// Owns the transport (and with it the cookie state the login establishes),
/// the credential provider and the credentials once obtained. Targets must
/// go through one session sequentially so the login is reused.
pub struct Session<T: HttpTransport, P: CredentialProvider> {
    transport: T,
    provider: P,
    credentials: Option<Credentials>,
    download_dir: Utf8PathBuf,
    login_submissions: usize,
}

impl<T: HttpTransport, P: CredentialProvider> Session<T, P> {
    pub fn new(transport: T, provider: P, download_dir: Utf8PathBuf) -> Self {
        Self {
            transport,
            provider,
            credentials: None,
            download_dir,
            login_submissions: 0,
        }
    }

    pub fn download_dir(&self) -> &Utf8Path {
        &self.download_dir
    }

    pub fn login_submissions(&self) -> usize {
        self.login_submissions
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Asks the provider for credentials the first time only.
    pub fn ensure_credentials(&mut self) -> Result<&Credentials, FetchError> {
        if self.credentials.is_none() {
            self.credentials = Some(self.provider.obtain()?);
        }
        self.credentials
            .as_ref()
            .ok_or_else(|| FetchError::Credentials("credentials unavailable".to_string()))
    }

    /// Downloads `url` into the session directory, logging in first if the
    /// archive challenges the request.
    ///
    /// A missing resource or transport failure is an `Ok(NothingToDownload)`;
    /// only a rejected login (or an unusable challenge page) is an error.
    pub fn fetch(&mut self, url: &str) -> Result<FetchOutcome, FetchError> {
        let response = match self.transport.get(url) {
            Ok(response) => response,
            Err(err) => return Ok(nothing(err.to_string())),
        };

        let response = if response.is_auth_challenge() {
            self.login(response, url)?;
            match self.transport.get(url) {
                Ok(response) => response,
                Err(err) => return Ok(nothing(err.to_string())),
            }
        } else {
            response
        };

        if !response.is_success() {
            return Ok(nothing(format!("HTTP status {}", response.status)));
        }

        match self.save(response, url) {
            Ok(outcome) => Ok(outcome),
            Err(err @ FetchError::Filesystem(_)) => Ok(nothing(err.to_string())),
            Err(err) => Err(err),
        }
    }

    fn login(&mut self, challenge: HttpResponse, url: &str) -> Result<(), FetchError> {
        let page_url = challenge.url.clone();
        let page = challenge.text()?;
        let mut form = LoginForm::parse(&page, &page_url)
            .ok_or_else(|| FetchError::LoginFormMissing(url.to_string()))?;
        form.fill(self.ensure_credentials()?);

        info!(action = %form.action, "submitting login form");
        self.login_submissions += 1;
        let response = self
            .transport
            .submit_form(form.method, &form.action, &form.fields)
            .map_err(|err| FetchError::LoginRejected {
                status: 0,
                message: err.to_string(),
            })?;
        if response.status >= 400 {
            let status = response.status;
            let message = response
                .text()
                .ok()
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status_reason(status).to_string());
            return Err(FetchError::LoginRejected { status, message });
        }
        Ok(())
    }

    fn save(&self, mut response: HttpResponse, url: &str) -> Result<FetchOutcome, FetchError> {
        let name = target_file_name(url);
        if name.is_empty() {
            return Ok(nothing("URL has no file name".to_string()));
        }
        let destination = self.download_dir.join(name);

        fs::create_dir_all(self.download_dir.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".uavsar-fetch")
            .tempfile_in(self.download_dir.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let bytes = io::copy(response.body_mut(), temp.as_file_mut())
            .map_err(|err| FetchError::Filesystem(format!("{url}: {err}")))?;
        temp.persist(destination.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;

        debug!(path = %destination, bytes, "saved");
        Ok(FetchOutcome::Downloaded {
            path: destination,
            bytes,
        })
    }
}

/// Local file name for a target: the last path segment, without query or fragment.
pub fn target_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default()
}

fn nothing(reason: String) -> FetchOutcome {
    FetchOutcome::NothingToDownload { reason }
}

fn status_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("login rejected")
}
