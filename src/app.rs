use std::fs;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::warn;

use crate::credentials::CredentialProvider;
use crate::domain::ProductFamily;
use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, Session};
use crate::http::HttpTransport;
use crate::options::SelectionSet;
use crate::sample::SampleReference;
use crate::synth::TargetList;

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub family: ProductFamily,
    pub url_lead: String,
    pub items: Vec<FetchItemResult>,
}

impl FetchReport {
    pub fn count(&self, action: &str) -> usize {
        self.items.iter().filter(|item| item.action == action).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub url: String,
    pub file: String,
    pub action: String,
    pub path: Option<String>,
    pub bytes: Option<u64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

fn emit(sink: &dyn ProgressSink, message: String) {
    sink.event(ProgressEvent {
        message,
        elapsed: None,
    });
}

/// Everything resolved from the command line before any network activity.
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub sample: SampleReference,
    pub selection: SelectionSet,
    pub targets: TargetList,
    pub cautions: Vec<String>,
}

impl DownloadPlan {
    /// Decomposes the sample, normalizes the selections and synthesizes the
    /// target list. Fails only on invalid selections.
    pub fn resolve(
        family: ProductFamily,
        sample_url: &str,
        selections: &[String],
    ) -> Result<Self, FetchError> {
        let sample = SampleReference::parse(sample_url);
        let selection = SelectionSet::normalize(family, &sample.extension, selections)?;
        let targets = TargetList::build(&sample, &selection);

        let mut cautions = Vec::new();
        if !sample.has_tested_scheme() {
            warn!(scheme = %sample.scheme, "only http has been tested");
            cautions.push("*** Only http has been tested...proceed with caution ***".to_string());
        }
        let stem_len = sample.stem.chars().count();
        if stem_len < family.lead_width() {
            warn!(
                stem_len,
                lead = family.lead_width(),
                "sample name shorter than the naming convention, targets will be truncated"
            );
        }

        Ok(Self {
            sample,
            selection,
            targets,
            cautions,
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.targets.urls().collect()
    }

    /// Report for a run that stops after planning.
    pub fn planned_report(&self) -> FetchReport {
        let items = self
            .targets
            .filenames
            .iter()
            .map(|name| FetchItemResult {
                url: format!("{}{name}", self.targets.url_lead),
                file: name.clone(),
                action: "planned".to_string(),
                path: None,
                bytes: None,
                reason: None,
            })
            .collect();
        FetchReport {
            family: self.selection.family,
            url_lead: self.targets.url_lead.clone(),
            items,
        }
    }
}

/// Where downloads land under `root`: the root itself when it already
/// is the sample's folder (or the folder name is empty), else `root/<folder>`.
pub fn download_dir_for(root: &Utf8Path, folder: &str) -> Utf8PathBuf {
    if folder.is_empty() || root.file_name() == Some(folder) {
        root.to_path_buf()
    } else {
        root.join(folder)
    }
}

/// Fetches every target of `plan` through `session`, in order.
///
/// Credentials are obtained once up front. Per-target failures are recorded
/// and the loop continues; only fatal errors stop the run.
pub fn run<T, P>(
    plan: &DownloadPlan,
    session: &mut Session<T, P>,
    sink: &dyn ProgressSink,
) -> Result<FetchReport, FetchError>
where
    T: HttpTransport,
    P: CredentialProvider,
{
    for caution in &plan.cautions {
        emit(sink, caution.clone());
    }

    fs::create_dir_all(session.download_dir().as_std_path())
        .map_err(|err| FetchError::Filesystem(err.to_string()))?;
    session.ensure_credentials()?;

    emit(sink, "Files to download:".to_string());
    for url in plan.targets.urls() {
        emit(sink, url);
    }

    let mut items = Vec::with_capacity(plan.targets.len());
    for (name, url) in plan.targets.filenames.iter().zip(plan.targets.urls()) {
        emit(sink, format!("downloading: {url}"));
        let started = Instant::now();
        let outcome = match session.fetch(&url) {
            Ok(outcome) => outcome,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => FetchOutcome::NothingToDownload {
                reason: err.to_string(),
            },
        };

        let item = match outcome {
            FetchOutcome::Downloaded { path, bytes } => {
                sink.event(ProgressEvent {
                    message: format!("saved {path} ({bytes} bytes)"),
                    elapsed: Some(started.elapsed()),
                });
                FetchItemResult {
                    url,
                    file: name.clone(),
                    action: "downloaded".to_string(),
                    path: Some(path.to_string()),
                    bytes: Some(bytes),
                    reason: None,
                }
            }
            FetchOutcome::NothingToDownload { reason } => {
                emit(sink, format!("Nothing to download at URL: {url}"));
                FetchItemResult {
                    url,
                    file: name.clone(),
                    action: "nothing-to-download".to_string(),
                    path: None,
                    bytes: None,
                    reason: Some(reason),
                }
            }
        };
        items.push(item);
    }

    Ok(FetchReport {
        family: plan.selection.family,
        url_lead: plan.targets.url_lead.clone(),
        items,
    })
}
