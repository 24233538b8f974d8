//! Durable favorites list: a JSON array of city names, the only state that
//! survives across sessions.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

/// On-disk mirror of the favorites list. The durable copy is the source of
/// truth at startup: read once, then overwritten in full on every mutation.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "dashboard")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::new(dirs.data_dir().join("favorites.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read the persisted list. A missing file is a first run and yields an
    /// empty list; a malformed payload is discarded with a warning instead of
    /// propagating a parse failure.
    pub fn load(&self) -> Vec<String> {
        if !self.path.exists() {
            return Vec::new();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not read favorites, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&contents) {
            Ok(favorites) => favorites,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "malformed favorites payload, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full list, creating parent directories as needed.
    pub fn save(&self, favorites: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favorites directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(favorites).context("Failed to serialize favorites")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write favorites file: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FavoritesStore {
        FavoritesStore::new(dir.path().join("favorites.json"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.save(&["Paris".to_string()]).expect("save should succeed");

        let reloaded = store_in(&dir).load();
        assert_eq!(reloaded, vec!["Paris".to_string()]);
    }

    #[test]
    fn malformed_payload_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        fs::write(store.path(), "{\"not\": \"a list\"}").expect("write");
        assert!(store.load().is_empty());

        fs::write(store.path(), "[1, 2, 3]").expect("write");
        assert!(store.load().is_empty());

        fs::write(store.path(), "not json at all").expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FavoritesStore::new(dir.path().join("nested/deeper/favorites.json"));

        store.save(&["Kyiv".to_string()]).expect("save should succeed");
        assert_eq!(store.load(), vec!["Kyiv".to_string()]);
    }
}
