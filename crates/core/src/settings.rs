//! Persisted user settings: API key, backend URL and selected languages.

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{Result, VidtransError};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_LANGUAGE: &str = "es";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_key: String,
    pub backend_url: String,
    pub selected_languages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            selected_languages: vec![DEFAULT_LANGUAGE.to_string()],
        }
    }
}

/// Fields to overwrite on save; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub api_key: Option<String>,
    pub backend_url: Option<String>,
    pub selected_languages: Option<Vec<String>>,
}

impl Settings {
    fn apply(&mut self, patch: SettingsPatch) {
        if let Some(api_key) = patch.api_key {
            self.api_key = api_key;
        }
        if let Some(backend_url) = patch.backend_url {
            self.backend_url = backend_url.trim().to_string();
        }
        self.fill_blank_backend_url();
        if let Some(languages) = patch.selected_languages {
            self.selected_languages = dedup_languages(languages);
        }
    }

    /// A blank URL means unset, same as a missing field.
    fn fill_blank_backend_url(&mut self) {
        if self.backend_url.trim().is_empty() {
            self.backend_url = DEFAULT_BACKEND_URL.to_string();
        }
    }
}

/// Trim codes and drop blanks and repeats, keeping the first occurrence's position.
pub(crate) fn dedup_languages(languages: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(languages.len());
    for lang in languages {
        let lang = lang.trim().to_string();
        if !lang.is_empty() && !seen.contains(&lang) {
            seen.push(lang);
        }
    }
    seen
}

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vidtrans")
}

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Self {
        Self::new(get_config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings, with defaults for anything never saved.
    pub async fn get_settings(&self) -> Result<Settings> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(source) => {
                return Err(VidtransError::StorageUnavailable {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let mut settings: Settings =
            serde_json::from_slice(&bytes).map_err(|source| VidtransError::CorruptRecord {
                path: self.path.clone(),
                source,
            })?;
        settings.fill_blank_backend_url();
        Ok(settings)
    }

    /// Merge `patch` over the stored settings and persist the result.
    pub async fn save_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.get_settings().await?;
        settings.apply(patch);

        let write_failed = |source| VidtransError::StorageWriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
        let json = serde_json::to_vec_pretty(&settings)
            .map_err(|e| write_failed(io::Error::other(e)))?;
        fs::write(&self.path, json).await.map_err(write_failed)?;

        info!(path = %self.path.display(), "settings saved");
        Ok(settings)
    }

    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(VidtransError::StorageWriteFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("nested").join("settings.json"))
    }

    #[tokio::test]
    async fn defaults_when_unset() {
        let dir = TempDir::new().unwrap();
        let settings = store_in(&dir).get_settings().await.unwrap();
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.backend_url, "http://localhost:5000");
        assert_eq!(settings.selected_languages, vec!["es".to_string()]);
    }

    #[tokio::test]
    async fn save_merges_partial_updates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save_settings(SettingsPatch {
                api_key: Some("sk-test".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .save_settings(SettingsPatch {
                selected_languages: Some(vec!["fr".into(), "de".into()]),
                ..Default::default()
            })
            .await
            .unwrap();

        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.selected_languages, vec!["fr".to_string(), "de".to_string()]);
    }

    #[tokio::test]
    async fn languages_are_an_ordered_set() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let saved = store
            .save_settings(SettingsPatch {
                selected_languages: Some(vec![
                    "ja".into(),
                    "es".into(),
                    " ja ".into(),
                    "".into(),
                    "es".into(),
                ]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.selected_languages, vec!["ja".to_string(), "es".to_string()]);
    }

    #[tokio::test]
    async fn missing_fields_fall_back_individually() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), br#"{"apiKey":"k"}"#).unwrap();

        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(settings.selected_languages, vec!["es".to_string()]);
    }

    #[tokio::test]
    async fn blank_backend_url_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let saved = store
            .save_settings(SettingsPatch {
                backend_url: Some("  ".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(saved.backend_url, DEFAULT_BACKEND_URL);

        std::fs::write(store.path(), br#"{"apiKey":"k","backendUrl":""}"#).unwrap();
        let settings = store.get_settings().await.unwrap();
        assert_eq!(settings.backend_url, DEFAULT_BACKEND_URL);
    }

    #[tokio::test]
    async fn clear_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save_settings(SettingsPatch {
                backend_url: Some("http://10.0.0.2:5000".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.get_settings().await.unwrap(), Settings::default());
    }
}
