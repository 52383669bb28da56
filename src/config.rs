//! Persisted settings and the session token store
//!
//! Both live under `~/.dq-dash/`: `config.json` holds the base URL, theme and
//! request timeout; `token` holds the bearer token. They are loaded once at
//! startup and written back when the user toggles the theme or logs in.

use crate::model::ui::ThemeMode;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub theme: ThemeMode,
    /// 0 disables the timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            theme: ThemeMode::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".dq-dash"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Read the config at `path`; a missing or malformed file yields `None`
    pub fn load_from(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Save the config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            create_private_dir(dir)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        info!(path = %path.display(), "config saved");
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Create `dir` and any missing parents, owner-only on unix
pub fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Write `contents` to `path` readable by the owner only (unix). A file left
/// behind with wider permissions is tightened.
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Token Store
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared handle to the bearer token.
///
/// Cloned into the API client; the token dialog writes through `set`, and
/// every request reads the current value with `get`.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

fn normalize(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl TokenStore {
    pub fn default_path() -> Option<PathBuf> {
        Config::config_dir().map(|dir| dir.join("token"))
    }

    /// Token held only in memory (CLI override, tests)
    pub fn in_memory(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(normalize(token))),
            path: None,
        }
    }

    /// Load the persisted token at `path`, if any
    pub fn load(path: PathBuf) -> Self {
        let token = fs::read_to_string(&path).ok();
        Self {
            inner: Arc::new(RwLock::new(normalize(token))),
            path: Some(path),
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Replace (or clear, with `None`/blank) the token and persist the change
    pub fn set(&self, token: Option<String>) -> anyhow::Result<()> {
        let token = normalize(token);
        match self.inner.write() {
            Ok(mut guard) => *guard = token.clone(),
            Err(poisoned) => *poisoned.into_inner() = token.clone(),
        }

        let Some(path) = &self.path else {
            return Ok(());
        };
        match token {
            Some(value) => {
                if let Some(dir) = path.parent() {
                    create_private_dir(dir)?;
                }
                write_private(path, &value)?;
                info!("token saved");
            }
            None => {
                if path.exists() {
                    fs::remove_file(path)?;
                }
                info!("token cleared");
            }
        }
        Ok(())
    }
}
