#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use camino::Utf8PathBuf;

use uavsar_fetch::credentials::{CredentialProvider, Credentials};
use uavsar_fetch::error::FetchError;
use uavsar_fetch::http::{FormMethod, HttpResponse, HttpTransport};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "s3cret";

pub const LOGIN_PAGE: &str = r#"<html><body>
<form method="post" action="/login">
  <input type="hidden" name="next" value="/UA_x/">
  <input type="text" name="userid">
  <input type="password" name="password">
  <input type="submit" value="Log in">
</form>
</body></html>"#;

/// In-memory stand-in for the password-protected archive.
#[derive(Default)]
pub struct MockArchive {
    pub files: HashMap<String, Vec<u8>>,
    pub reject_login: bool,
    /// Drop the login after every served file so the next target is challenged again.
    pub session_expires: bool,
    /// Serve challenges without any form.
    pub formless_challenge: bool,
    /// Fail the login submission at the transport level.
    pub submit_unreachable: bool,
    pub logged_in: Mutex<bool>,
    pub gets: Mutex<Vec<String>>,
    pub submissions: Mutex<Vec<(FormMethod, String, Vec<(String, String)>)>>,
}

impl MockArchive {
    pub fn with_files(names: &[&str]) -> Self {
        Self {
            files: names
                .iter()
                .map(|name| (name.to_string(), format!("contents of {name}").into_bytes()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().unwrap().len()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

impl HttpTransport for &MockArchive {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.gets.lock().unwrap().push(url.to_string());
        let mut logged_in = self.logged_in.lock().unwrap();
        if !*logged_in {
            let page = if self.formless_challenge {
                "<html>Authorization Required</html>"
            } else {
                LOGIN_PAGE
            };
            return Ok(HttpResponse::from_bytes(401, url, page));
        }
        let name = url.rsplit('/').next().unwrap_or_default();
        match self.files.get(name) {
            Some(body) => {
                if self.session_expires {
                    *logged_in = false;
                }
                Ok(HttpResponse::from_bytes(200, url, body.clone()))
            }
            None => Ok(HttpResponse::from_bytes(404, url, "Not Found")),
        }
    }

    fn submit_form(
        &self,
        method: FormMethod,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, FetchError> {
        self.submissions
            .lock()
            .unwrap()
            .push((method, action.to_string(), fields.to_vec()));
        if self.submit_unreachable {
            return Err(FetchError::Http("connection reset by peer".to_string()));
        }
        let has = |name: &str, value: &str| {
            fields
                .iter()
                .any(|(field, given)| field == name && given == value)
        };
        if self.reject_login || !has("userid", USERNAME) || !has("password", PASSWORD) {
            return Ok(HttpResponse::from_bytes(
                403,
                action,
                "bad username or password",
            ));
        }
        *self.logged_in.lock().unwrap() = true;
        Ok(HttpResponse::from_bytes(200, action, "welcome"))
    }
}

#[derive(Default)]
pub struct CountingProvider {
    pub calls: Mutex<usize>,
}

impl CountingProvider {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl CredentialProvider for &CountingProvider {
    fn obtain(&self) -> Result<Credentials, FetchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(Credentials::new(USERNAME, PASSWORD))
    }
}

pub fn temp_download_dir(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("downloads")).unwrap()
}
