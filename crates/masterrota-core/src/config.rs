//! Application configuration.
//!
//! Configuration is a JSON file naming the ChurchSuite account, the login,
//! the destination spreadsheet and the role keywords, e.g.
//!
//! ```json
//! {
//!     "churchname": "stmarks",
//!     "username": "rota-bot",
//!     "site_name": "St Mark's",
//!     "google_sheet_id": "1AbC...",
//!     "lead_roles": ["leader", "preacher"],
//!     "excluded_roles": ["reserve"]
//! }
//! ```
//!
//! The default location is `~/.config/masterrota/config.json`. Secrets may be
//! left out of the file: the password falls back to `MASTERROTA_PASSWORD` and
//! then the OS keychain, the Sheets token to `GOOGLE_SHEETS_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::api::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::CredentialStore;
use crate::roster::RoleConfig;

/// Application name used for the config directory path
const APP_NAME: &str = "masterrota";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const PASSWORD_ENV: &str = "MASTERROTA_PASSWORD";
const SHEETS_TOKEN_ENV: &str = "GOOGLE_SHEETS_TOKEN";

/// Names of the destination sheets and the attendance anchor label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRanges {
    pub overview: String,
    pub next: String,
    pub summary: String,
    pub attendance_anchor: String,
}

impl Default for SheetRanges {
    fn default() -> Self {
        Self {
            overview: "Overview".to_string(),
            next: "Next Sunday".to_string(),
            summary: "Last Sunday Summary".to_string(),
            attendance_anchor: "Attendance".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub churchname: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub site_id: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    pub google_sheet_id: String,
    #[serde(default)]
    pub sheets_token: Option<String>,
    #[serde(default = "default_lead_roles")]
    pub lead_roles: Vec<String>,
    #[serde(default = "default_excluded_roles")]
    pub excluded_roles: Vec<String>,
    #[serde(default)]
    pub ranges: SheetRanges,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_lead_roles() -> Vec<String> {
    RoleConfig::default().lead_roles
}

fn default_excluded_roles() -> Vec<String> {
    RoleConfig::default().excluded_roles
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Site ids appear both as `"2"` and `2` in existing config files.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        debug!(path = %path.display(), "Loading config");

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        if config.churchname.trim().is_empty() {
            return Err(anyhow!("`churchname` must not be empty"));
        }
        if config.google_sheet_id.trim().is_empty() {
            return Err(anyhow!("`google_sheet_id` must not be empty"));
        }
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn role_config(&self) -> RoleConfig {
        RoleConfig::new(self.lead_roles.clone(), self.excluded_roles.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Display name for log output: `site_name`, or the account name.
    pub fn display_name(&self) -> &str {
        self.site_name.as_deref().unwrap_or(&self.churchname)
    }

    /// ChurchSuite password: config file, then environment, then OS keychain.
    pub fn resolve_password(&self) -> Result<String> {
        if let Some(password) = self.password.as_ref().filter(|p| !p.is_empty()) {
            return Ok(password.clone());
        }
        if let Some(password) = non_empty_env(PASSWORD_ENV) {
            return Ok(password);
        }
        CredentialStore::get_password(&self.churchname, &self.username)
    }

    /// Google Sheets OAuth access token: config file, then environment.
    pub fn resolve_sheets_token(&self) -> Result<String> {
        self.sheets_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| non_empty_env(SHEETS_TOKEN_ENV))
            .ok_or_else(|| {
                anyhow!(
                    "No Google Sheets access token: set `sheets_token` in the config or {}",
                    SHEETS_TOKEN_ENV
                )
            })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
