use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::{Project, ShoppingList, User};

pub const USER_KEY: &str = "grasos-user";
pub const PROJECTS_KEY: &str = "grasos-projects";
pub const SHOPPING_LISTS_KEY: &str = "grasos-shopping-lists";

/// On-device mirror of the selected user and both collections.
///
/// Each key is one JSON file that is always rewritten whole.
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Missing entry reads as `Ok(None)`; unreadable or malformed as `Err`.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value = serde_json::from_str(&data)
            .with_context(|| format!("malformed cache entry {key}"))?;
        Ok(Some(value))
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create directory {}", self.dir.display()))?;

        let json = serde_json::to_string(value)?;
        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        Ok(())
    }

    pub fn load_user(&self) -> Option<User> {
        self.read(USER_KEY)
            .inspect_err(|e| warn!("ignoring cached user: {e:#}"))
            .ok()
            .flatten()
    }

    /// Stores the selected user, or drops the entry when `None`.
    pub fn store_user(&self, user: Option<&User>) -> Result<()> {
        match user {
            Some(user) => self.write(USER_KEY, user),
            None => self.remove(USER_KEY),
        }
    }

    pub fn load_projects(&self) -> Result<Option<Vec<Project>>> {
        self.read(PROJECTS_KEY)
    }

    pub fn store_projects(&self, projects: &[Project]) -> Result<()> {
        self.write(PROJECTS_KEY, projects)
    }

    pub fn load_shopping_lists(&self) -> Result<Option<Vec<ShoppingList>>> {
        self.read(SHOPPING_LISTS_KEY)
    }

    pub fn store_shopping_lists(&self, lists: &[ShoppingList]) -> Result<()> {
        self.write(SHOPPING_LISTS_KEY, lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    use crate::models::ChecklistItem;

    fn sample_project(title: &str) -> Project {
        let now = Utc::now();
        Project {
            id: crate::models::new_id(),
            title: title.to_string(),
            description: String::new(),
            checklist: vec![ChecklistItem::new("step")],
            progress: 0,
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_entries_read_as_none() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path().join("cache"));
        assert!(cache.load_user().is_none());
        assert!(cache.load_projects().unwrap().is_none());
        assert!(cache.load_shopping_lists().unwrap().is_none());
    }

    #[test]
    fn test_projects_snapshot_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path());

        cache
            .store_projects(&[sample_project("a"), sample_project("b")])
            .unwrap();
        cache.store_projects(&[sample_project("c")]).unwrap();

        let loaded = cache.load_projects().unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "c");
        assert_eq!(loaded[0].checklist.len(), 1);
    }

    #[test]
    fn test_malformed_entry_is_error() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path());
        fs::write(dir.path().join("grasos-shopping-lists.json"), "[{").unwrap();

        assert!(cache.load_shopping_lists().is_err());
    }

    #[test]
    fn test_user_store_and_clear() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path());
        let user = User::new("Hanna").unwrap();

        cache.store_user(Some(&user)).unwrap();
        assert_eq!(cache.load_user(), Some(user));
        assert!(dir.path().join("grasos-user.json").exists());

        cache.store_user(None).unwrap();
        assert!(cache.load_user().is_none());
        assert!(!dir.path().join("grasos-user.json").exists());
    }

    #[test]
    fn test_malformed_user_is_ignored() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path());
        fs::write(dir.path().join("grasos-user.json"), "nope").unwrap();
        assert!(cache.load_user().is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path());
        cache.store_shopping_lists(&[]).unwrap();
        assert!(!dir.path().join("grasos-shopping-lists.json.tmp").exists());
        assert_eq!(cache.load_shopping_lists().unwrap().unwrap().len(), 0);
    }
}
