use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SETTINGS_DIR: &str = ".grasos";
const SETTINGS_FILE: &str = "setting.json";
const DB_FILE: &str = "grasos.db";
const CACHE_DIR: &str = "cache";

pub const DB_ENV: &str = "GRASOS_DB";
pub const CACHE_ENV: &str = "GRASOS_CACHE_DIR";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Name preselected when the cache holds no user yet.
    #[serde(default)]
    pub user: Option<String>,
}

impl Settings {
    /// Reads `.grasos/setting.json` from `std::env::current_dir()`.
    /// Returns defaults if the file is missing or malformed.
    pub fn load() -> Self {
        Self::load_from(std::env::current_dir().ok())
    }

    fn load_from(cwd: Option<PathBuf>) -> Self {
        let Some(cwd) = cwd else {
            return Self::default();
        };
        Self::read_file(&Self::path_in(&cwd)).unwrap_or_default()
    }

    fn read_file(path: &Path) -> Option<Self> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Returns the path to the settings file relative to a given directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    /// Write settings into `dir/.grasos/setting.json`.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<()> {
        let settings_dir = dir.join(SETTINGS_DIR);
        fs::create_dir_all(&settings_dir)?;
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(settings_dir.join(SETTINGS_FILE), json.as_bytes())
    }

    /// Database location: `GRASOS_DB`, then the settings file, then
    /// `~/.grasos/grasos.db`.
    pub fn db_path(&self) -> Result<PathBuf> {
        self.resolve(DB_ENV, self.db_path.as_ref(), DB_FILE)
    }

    /// Cache directory: `GRASOS_CACHE_DIR`, then the settings file, then
    /// `~/.grasos/cache`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.resolve(CACHE_ENV, self.cache_dir.as_ref(), CACHE_DIR)
    }

    fn resolve(&self, env: &str, configured: Option<&PathBuf>, default: &str) -> Result<PathBuf> {
        resolve_with(std::env::var(env).ok(), configured, std::env::var("HOME").ok(), default)
    }
}

fn resolve_with(
    from_env: Option<String>,
    configured: Option<&PathBuf>,
    home: Option<String>,
    default: &str,
) -> Result<PathBuf> {
    if let Some(path) = from_env.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = configured {
        return Ok(path.clone());
    }
    let home = home.context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(SETTINGS_DIR).join(default))
}
