use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{AppError, EXPORT_DELAY, SUGGESTED_FILENAME};
use crate::utils::sanitize_filename;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// URL attached to the share button. `None` means the page has no button.
    pub video_url: Option<String>,
    pub export_delay_ms: u64,
    pub suggested_filename: String,
    /// Save straight into this directory instead of asking for a location.
    pub download_dir: Option<PathBuf>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            video_url: None,
            export_delay_ms: EXPORT_DELAY.as_millis() as u64,
            suggested_filename: SUGGESTED_FILENAME.to_string(),
            download_dir: None,
        }
    }
}

impl ShareConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))?;
        Ok(config.normalized())
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Defaults, then the config file, then the video URL given on the
    /// command line or through `MEMORIAL_VIDEO_URL`.
    pub fn load(config_path: Option<&Path>, video_url: Option<String>) -> Result<Self, AppError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = video_url.filter(|u| !u.is_empty()) {
            config.video_url = Some(url);
        }

        Ok(config.normalized())
    }

    pub fn export_delay(&self) -> Duration {
        Duration::from_millis(self.export_delay_ms)
    }

    fn normalized(mut self) -> Self {
        self.suggested_filename = sanitize_filename(&self.suggested_filename);
        if self.suggested_filename.is_empty() {
            self.suggested_filename = SUGGESTED_FILENAME.to_string();
        }
        self
    }
}
