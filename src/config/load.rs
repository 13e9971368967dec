use crate::config::types::{Config, MediaExtensionTable, SETTINGS_FILE_NAME, UserSettings};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// 編譯時嵌入的副檔名清單（不需要外部檔案）
const MEDIA_EXTENSIONS_JSON: &str = include_str!("../data/media_extensions.json");

impl Config {
    pub fn new() -> Result<Self> {
        let media_extensions = Self::load_embedded_media_extensions()?;
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE_NAME)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("設定檔讀取失敗，使用預設值: {e:#}");
                UserSettings::default()
            }
        };

        Ok(Self {
            media_extensions,
            settings,
        })
    }

    /// 讀取使用者設定，檔案不存在時回傳預設值
    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            debug!("找不到設定檔 {}，使用預設值", path.display());
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    fn load_embedded_media_extensions() -> Result<MediaExtensionTable> {
        serde_json::from_str(MEDIA_EXTENSIONS_JSON).context("無法解析嵌入的副檔名清單")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_table_contains_expected_extensions() {
        let table = Config::load_embedded_media_extensions().unwrap();
        assert_eq!(table.audio_file.len(), 11);
        assert_eq!(table.video_file.len(), 12);
        assert!(table.is_audio_file(Path::new("a.opus")));
        assert!(table.is_video_file(Path::new("a.TS")));
        assert_eq!(table.video_extensions().next(), Some("mp4"));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Config::load_settings(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_load_settings_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg"}"#).unwrap();

        let settings = Config::load_settings(&path).unwrap();
        assert_eq!(settings.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(settings.sample_rate, UserSettings::default().sample_rate);
    }

    #[test]
    fn test_load_settings_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(Config::load_settings(&path).is_err());
    }
}
