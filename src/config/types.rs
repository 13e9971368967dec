use serde::{Deserialize, Serialize};
use std::path::Path;

/// 對齊分數低於此值時，輸出檔名加上 (Substandard)
pub const SUBSTANDARD_SCORE_THRESHOLD: f64 = 5.0;

/// 使用者設定檔名稱（位於目前工作目錄）
pub const SETTINGS_FILE_NAME: &str = "vdjedit_settings.json";

pub const DEFAULT_SAMPLE_RATE: u32 = 8000;
pub const DEFAULT_MAX_ANALYSIS_SECONDS: u32 = 900;

/// 音訊與影片副檔名清單
///
/// 副檔名以小寫、含前導點的形式儲存。影片清單的順序即為尋找
/// 對應影片時的比對順序。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaExtensionTable {
    #[serde(rename = "AUDIO_FILE")]
    pub audio_file: Vec<String>,
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl MediaExtensionTable {
    #[must_use]
    pub fn is_audio_file(&self, path: &Path) -> bool {
        extension_in(path, &self.audio_file)
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        extension_in(path, &self.video_file)
    }

    /// 影片副檔名（不含前導點），依比對順序
    pub fn video_extensions(&self) -> impl Iterator<Item = &str> {
        self.video_file
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
    }
}

fn extension_in(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let dotted = format!(".{ext}");
            extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(&dotted))
        })
}

/// 使用者設定（可選的 JSON 檔案，缺少的欄位使用預設值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// ffmpeg 執行檔路徑
    pub ffmpeg_path: String,
    /// 交叉相關分析使用的取樣率
    pub sample_rate: u32,
    /// 每個檔案最多分析的秒數
    pub max_analysis_seconds: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_analysis_seconds: DEFAULT_MAX_ANALYSIS_SECONDS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub media_extensions: MediaExtensionTable,
    pub settings: UserSettings,
}
