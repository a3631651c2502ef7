use std::fmt;
use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// Status, final URL and a streaming body.
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn new(status: u16, url: impl Into<String>, body: Box<dyn Read + Send>) -> Self {
        Self {
            status,
            url: url.into(),
            body,
        }
    }

    pub fn from_bytes(status: u16, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, url, Box::new(std::io::Cursor::new(body.into())))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_challenge(&self) -> bool {
        self.status == 401
    }

    pub fn body_mut(&mut self) -> &mut (dyn Read + Send) {
        self.body.as_mut()
    }

    pub fn text(mut self) -> Result<String, FetchError> {
        let mut bytes = Vec::new();
        self.body
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// The HTTP mechanism behind a session. Implementations keep whatever
/// cookie state the archive's login establishes.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
    fn submit_form(
        &self,
        method: FormMethod,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, FetchError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|err| FetchError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn wrap(response: reqwest::blocking::Response) -> HttpResponse {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        HttpResponse::new(status, url, Box::new(response))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(Self::wrap(response))
    }

    fn submit_form(
        &self,
        method: FormMethod,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, FetchError> {
        debug!(action, ?method, "submitting form");
        let request = match method {
            FormMethod::Get => self.client.get(action).query(fields),
            FormMethod::Post => self.client.post(action).form(fields),
        };
        let response = request
            .send()
            .map_err(|err| FetchError::Http(err.to_string()))?;
        Ok(Self::wrap(response))
    }
}
