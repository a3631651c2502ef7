use serde::Serialize;

/// Pieces of the user-supplied sample URL that every sibling URL is built from.
///
/// `scheme + host + remote_folder + "/"` is the lead shared by every target.
/// Decomposition never fails: missing pieces come back as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleReference {
    pub scheme: String,
    pub host: String,
    pub remote_folder: String,
    pub stem: String,
    pub extension: String,
}

impl SampleReference {
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let (scheme, rest) = match url.find("://") {
            Some(idx) => (format!("{}://", &url[..idx]), &url[idx + 3..]),
            None => (String::new(), url),
        };

        let segments: Vec<&str> = rest.split('/').collect();
        let host = format!("{}/", segments.first().copied().unwrap_or_default());
        let remote_folder = if segments.len() > 2 {
            segments[1..segments.len() - 1].join("/")
        } else {
            String::new()
        };
        let filename = segments.last().copied().unwrap_or_default();
        let stem = filename.split('.').next().unwrap_or_default().to_string();
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_string())
            .unwrap_or_default();

        Self {
            scheme,
            host,
            remote_folder,
            stem,
            extension,
        }
    }

    /// False for anything other than http(s); such schemes are attempted but untested.
    pub fn has_tested_scheme(&self) -> bool {
        matches!(self.scheme.as_str(), "http://" | "https://")
    }

    pub fn url_lead(&self) -> String {
        format!("{}{}{}/", self.scheme, self.host, self.remote_folder)
    }

    /// First `width` characters of the stem, or the whole stem when it is shorter.
    pub fn lead(&self, width: usize) -> &str {
        match self.stem.char_indices().nth(width) {
            Some((idx, _)) => &self.stem[..idx],
            None => &self.stem,
        }
    }

    /// Last `width` characters of the stem, or the whole stem when it is shorter.
    pub fn trail(&self, width: usize) -> &str {
        let count = self.stem.chars().count();
        if width >= count {
            return &self.stem;
        }
        match self.stem.char_indices().nth(count - width) {
            Some((idx, _)) => &self.stem[idx..],
            None => "",
        }
    }

    /// Name of the local download folder: the last remote folder segment
    /// without `prefix`.
    pub fn local_folder_name(&self, prefix: &str) -> String {
        let last = self.remote_folder.rsplit('/').next().unwrap_or_default();
        last.strip_prefix(prefix).unwrap_or(last).to_string()
    }
}
