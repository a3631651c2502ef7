mod common;

use assert_matches::assert_matches;

use uavsar_fetch::error::FetchError;
use uavsar_fetch::fetcher::{FetchOutcome, Session};
use uavsar_fetch::http::FormMethod;

use common::{CountingProvider, MockArchive, temp_download_dir};

const BASE: &str = "http://archive.test/UA_SanAnd_01";

#[test]
fn challenge_triggers_one_login_and_one_retry() {
    let archive = MockArchive::with_files(&["a.grd"]);
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let dir = temp_download_dir(&temp);
    let mut session = Session::new(&archive, &provider, dir.clone());

    let outcome = session.fetch(&format!("{BASE}/a.grd")).unwrap();

    assert_matches!(outcome, FetchOutcome::Downloaded { ref path, bytes } if path == &dir.join("a.grd") && bytes > 0);
    assert_eq!(archive.submission_count(), 1);
    assert_eq!(archive.get_count(), 2);
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        std::fs::read_to_string(dir.join("a.grd").as_std_path()).unwrap(),
        "contents of a.grd"
    );
}

#[test]
fn login_form_is_posted_to_resolved_action() {
    let archive = MockArchive::with_files(&["a.grd"]);
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    session.fetch(&format!("{BASE}/a.grd")).unwrap();

    let submissions = archive.submissions.lock().unwrap();
    let (method, action, fields) = &submissions[0];
    assert_eq!(*method, FormMethod::Post);
    assert_eq!(action, "http://archive.test/login");
    assert!(fields.contains(&("next".to_string(), "/UA_x/".to_string())));
    assert!(fields.contains(&("userid".to_string(), "alice".to_string())));
    assert!(fields.contains(&("password".to_string(), "s3cret".to_string())));
}

#[test]
fn second_target_reuses_the_login() {
    let archive = MockArchive::with_files(&["a.grd", "a.ann"]);
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    session.fetch(&format!("{BASE}/a.grd")).unwrap();
    let outcome = session.fetch(&format!("{BASE}/a.ann")).unwrap();

    assert_matches!(outcome, FetchOutcome::Downloaded { .. });
    assert_eq!(archive.submission_count(), 1);
    assert_eq!(archive.get_count(), 3);
    assert_eq!(session.login_submissions(), 1);
    assert_eq!(provider.calls(), 1);
}

#[test]
fn repeated_challenge_reuses_cached_credentials() {
    let mut archive = MockArchive::with_files(&["a.grd", "a.ann"]);
    archive.session_expires = true;
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    session.fetch(&format!("{BASE}/a.grd")).unwrap();
    session.fetch(&format!("{BASE}/a.ann")).unwrap();

    assert_eq!(archive.submission_count(), 2);
    assert_eq!(provider.calls(), 1);
}

#[test]
fn missing_resource_is_not_fatal() {
    let archive = MockArchive::with_files(&["a.grd"]);
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let dir = temp_download_dir(&temp);
    let mut session = Session::new(&archive, &provider, dir.clone());

    let outcome = session.fetch(&format!("{BASE}/missing.hgt")).unwrap();

    assert_matches!(outcome, FetchOutcome::NothingToDownload { ref reason } if reason.contains("404"));
    assert!(!dir.join("missing.hgt").as_std_path().exists());
}

#[test]
fn rejected_login_is_fatal() {
    let mut archive = MockArchive::with_files(&["a.grd"]);
    archive.reject_login = true;
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    let err = session.fetch(&format!("{BASE}/a.grd")).unwrap_err();

    assert_matches!(err, FetchError::LoginRejected { status: 403, ref message } if message.contains("bad username"));
    assert!(err.is_fatal());
    assert_eq!(archive.get_count(), 1);
}

#[test]
fn unreachable_login_endpoint_is_fatal() {
    let mut archive = MockArchive::with_files(&["a.grd"]);
    archive.submit_unreachable = true;
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let dir = temp_download_dir(&temp);
    let mut session = Session::new(&archive, &provider, dir.clone());

    let err = session.fetch(&format!("{BASE}/a.grd")).unwrap_err();

    assert_matches!(err, FetchError::LoginRejected { status: 0, ref message } if message.contains("connection reset"));
    assert!(err.is_fatal());
    assert_eq!(archive.submission_count(), 1);
    assert_eq!(archive.get_count(), 1);
    assert!(!dir.join("a.grd").as_std_path().exists());
}

#[test]
fn challenge_without_form_is_fatal() {
    let mut archive = MockArchive::with_files(&["a.grd"]);
    archive.formless_challenge = true;
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    let err = session.fetch(&format!("{BASE}/a.grd")).unwrap_err();

    assert_matches!(err, FetchError::LoginFormMissing(_));
    assert_eq!(archive.submission_count(), 0);
}

#[test]
fn credentials_are_obtained_once() {
    let archive = MockArchive::default();
    let provider = CountingProvider::default();
    let temp = tempfile::tempdir().unwrap();
    let mut session = Session::new(&archive, &provider, temp_download_dir(&temp));

    assert!(!session.has_credentials());
    session.ensure_credentials().unwrap();
    session.ensure_credentials().unwrap();

    assert!(session.has_credentials());
    assert_eq!(provider.calls(), 1);
    assert_eq!(archive.get_count(), 0);
}
