//! Persisted login identity.
//!
//! The profile is the client-side record of a logged-in user: the access
//! token, the username, and the summaries of recently concluded sessions.
//! It is written by the auth flows, read at chat start, and destroyed by
//! logout (or when the backend reports an expired token).

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::api::SessionSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub token: String,
    pub username: String,
    /// Most recent first.
    #[serde(default)]
    pub recent_summaries: Vec<SessionSummary>,
}

impl Profile {
    pub fn latest_summary(&self) -> Option<&str> {
        self.recent_summaries
            .first()
            .map(|entry| entry.summary.as_str())
    }
}

/// File-backed store for the [`Profile`].
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn open() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Use an explicit path instead of the platform default (useful for tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn default_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "confide")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("profile.toml")
    }

    /// Load the stored profile, or `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<Profile>, Box<dyn std::error::Error>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let profile: Profile = toml::from_str(&contents)?;
        Ok(Some(profile))
    }

    pub fn save(&self, profile: &Profile) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(profile)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Remove every persisted key: token, username, and cached summaries.
    pub fn clear(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ProfileStore {
        ProfileStore::at(dir.path().join("profile.toml"))
    }

    fn sample_profile() -> Profile {
        Profile {
            token: "jwt-token".to_string(),
            username: "sam".to_string(),
            recent_summaries: vec![
                SessionSummary {
                    summary: "Talked through exam stress.".to_string(),
                },
                SessionSummary {
                    summary: "First visit.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn load_without_login_returns_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        let profile = sample_profile();

        store.save(&profile).expect("save");
        let loaded = store.load().expect("load").expect("profile");
        assert_eq!(loaded, profile);
        assert_eq!(loaded.latest_summary(), Some("Talked through exam stress."));
    }

    #[test]
    fn clear_removes_every_key() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        store.save(&sample_profile()).expect("save");

        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn clear_is_a_no_op_when_logged_out() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}
