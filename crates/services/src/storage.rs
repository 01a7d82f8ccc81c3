//! Durable storage for the project collection.
//!
//! The store depends on the narrow [`ProjectStorage`] trait, never on a
//! concrete backend. [`FileStorage`] keeps the two persisted keys as two
//! files under the config dir; [`MemoryStorage`] backs tests.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::project::WebsiteProject;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Snapshot of everything the project store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    pub projects: Vec<WebsiteProject>,
    pub active_project_id: Option<String>,
}

/// A durable key-value backend for the project store.
pub trait ProjectStorage: Send {
    /// Load the persisted snapshot. Missing or corrupt data yields empty
    /// defaults; loading never fails.
    fn load(&self) -> StoredState;

    /// Write the snapshot. Callers treat a failure as non-fatal.
    fn save(&self, state: &StoredState) -> Result<()>;
}

pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        let _ = fs::create_dir_all(&dir);
        Self { dir }
    }

    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("com.local", "Siteweaver", "Siteweaver")
            .map(|p| p.config_dir().join("store"))
            .unwrap_or_else(|| PathBuf::from("./store"))
    }

    fn projects_path(&self) -> PathBuf {
        self.dir.join("projects.json")
    }

    fn active_id_path(&self) -> PathBuf {
        self.dir.join("active-project-id")
    }
}

impl ProjectStorage for FileStorage {
    fn load(&self) -> StoredState {
        let projects = match fs::read_to_string(self.projects_path()) {
            Ok(raw) => match serde_json::from_str::<Vec<WebsiteProject>>(&raw) {
                Ok(projects) => projects,
                Err(err) => {
                    tracing::warn!("ignoring corrupt project file: {}", err);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        let active_project_id = fs::read_to_string(self.active_id_path())
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty());

        StoredState {
            projects,
            active_project_id,
        }
    }

    fn save(&self, state: &StoredState) -> Result<()> {
        let json = serde_json::to_string_pretty(&state.projects)?;
        fs::write(self.projects_path(), json)
            .with_context(|| format!("writing {}", self.projects_path().display()))?;

        match &state.active_project_id {
            Some(id) => fs::write(self.active_id_path(), id)
                .with_context(|| format!("writing {}", self.active_id_path().display()))?,
            None => {
                let _ = fs::remove_file(self.active_id_path());
            }
        }
        Ok(())
    }
}

/// In-memory backend for tests: same contract, no filesystem.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<StoredState>,
}

impl MemoryStorage {
    /// What a reload would observe right now.
    pub fn snapshot(&self) -> StoredState {
        self.state.lock().clone()
    }
}

impl ProjectStorage for MemoryStorage {
    fn load(&self) -> StoredState {
        self.state.lock().clone()
    }

    fn save(&self, state: &StoredState) -> Result<()> {
        *self.state.lock() = state.clone();
        Ok(())
    }
}

// Lets tests hand the store a storage handle they keep inspecting.
impl ProjectStorage for Arc<MemoryStorage> {
    fn load(&self) -> StoredState {
        self.as_ref().load()
    }

    fn save(&self, state: &StoredState) -> Result<()> {
        self.as_ref().save(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_projects_and_active_id() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());

        let project = WebsiteProject::new("Website 1");
        let state = StoredState {
            active_project_id: Some(project.id.clone()),
            projects: vec![project],
        };
        storage.save(&state).unwrap();

        assert_eq!(storage.load(), state);
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store"));
        assert_eq!(storage.load(), StoredState::default());
    }

    #[test]
    fn corrupt_projects_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        fs::write(dir.path().join("projects.json"), "{not json").unwrap();
        fs::write(dir.path().join("active-project-id"), "abc").unwrap();

        let state = storage.load();
        assert!(state.projects.is_empty());
        assert_eq!(state.active_project_id.as_deref(), Some("abc"));
    }

    #[test]
    fn clearing_active_id_removes_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());

        let state = StoredState {
            projects: vec![WebsiteProject::new("Website 1")],
            active_project_id: Some("abc".to_string()),
        };
        storage.save(&state).unwrap();
        storage
            .save(&StoredState {
                projects: state.projects.clone(),
                active_project_id: None,
            })
            .unwrap();

        assert_eq!(storage.load().active_project_id, None);
    }
}
