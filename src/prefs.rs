//! Theme preference, the only state persisted between runs.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PrefsError;

const APP_DIR: &str = "pokearena";
const PREFS_FILE: &str = "preferences.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
}

pub fn default_path() -> Result<PathBuf, PrefsError> {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join(PREFS_FILE))
        .ok_or(PrefsError::NoConfigDir)
}

/// Missing or unreadable files yield defaults.
pub async fn load(path: &Path) -> Preferences {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "no saved preferences");
            return Preferences::default();
        }
    };
    match serde_json::from_str(&json) {
        Ok(prefs) => prefs,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring corrupt preferences");
            Preferences::default()
        }
    }
}

pub async fn save(path: &Path, prefs: &Preferences) -> Result<(), PrefsError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggles_and_serializes_lowercase() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        let json = serde_json::to_string(&Preferences { theme: Theme::Dark }).unwrap();
        assert_eq!(json, r#"{"theme":"dark"}"#);
    }

    #[tokio::test]
    async fn save_then_load_restores_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFS_FILE);
        save(&path, &Preferences { theme: Theme::Dark }).await.unwrap();
        assert_eq!(load(&path).await.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFS_FILE);
        assert_eq!(load(&path).await, Preferences::default());

        tokio::fs::write(&path, "{ not json").await.unwrap();
        assert_eq!(load(&path).await, Preferences::default());

        tokio::fs::write(&path, r#"{"theme":"purple"}"#).await.unwrap();
        assert_eq!(load(&path).await.theme, Theme::Light);
    }
}
