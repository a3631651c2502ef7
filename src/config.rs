use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub const DEFAULT_CREDENTIAL_FILE: &str = ".dathack.d";
pub const DEFAULT_CREDENTIAL_TAG: &str = "uavsarhttp";
pub const DEFAULT_FOLDER_PREFIX: &str = "UA_";

/// Settings as they appear in the optional JSON config file.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RawSettings {
    #[serde(default)]
    pub credential_file: Option<PathBuf>,
    #[serde(default)]
    pub credential_tag: Option<String>,
    #[serde(default)]
    pub folder_prefix: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub credential_file: PathBuf,
    pub credential_tag: String,
    pub folder_prefix: String,
    pub user_agent: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<Settings, FetchError> {
        let raw = match path {
            Some(path) => {
                let config_path = PathBuf::from(path);
                let content = fs::read_to_string(&config_path)
                    .map_err(|_| FetchError::ConfigRead(config_path.clone()))?;
                serde_json::from_str(&content)
                    .map_err(|err| FetchError::ConfigParse(err.to_string()))?
            }
            None => RawSettings::default(),
        };
        Ok(Self::resolve_config(raw))
    }

    pub fn resolve_config(raw: RawSettings) -> Settings {
        Settings {
            credential_file: raw
                .credential_file
                .unwrap_or_else(default_credential_file),
            credential_tag: raw
                .credential_tag
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_TAG.to_string()),
            folder_prefix: raw
                .folder_prefix
                .unwrap_or_else(|| DEFAULT_FOLDER_PREFIX.to_string()),
            user_agent: raw
                .user_agent
                .unwrap_or_else(|| format!("uavsar-fetch/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// `$HOME/.dathack.d`, or a relative path when no home directory is known.
pub fn default_credential_file() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_CREDENTIAL_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIAL_FILE))
}
