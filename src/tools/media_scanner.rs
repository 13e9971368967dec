//! 音訊與影片檔案探索
//!
//! 掃描音訊資料夾（不遞迴），並在影片資料夾中尋找同名的影片檔

use crate::config::MediaExtensionTable;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 同名的音訊與影片檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPair {
    pub audio: PathBuf,
    pub video: PathBuf,
}

impl MediaPair {
    #[must_use]
    pub const fn new(audio: PathBuf, video: PathBuf) -> Self {
        Self { audio, video }
    }

    /// 音訊檔名（不含副檔名），作為輸出檔名的基礎
    #[must_use]
    pub fn stem(&self) -> String {
        file_stem_of(&self.audio)
    }
}

#[must_use]
pub fn file_stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 列出資料夾第一層的一般檔案，跳過隱藏檔
fn list_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e)
                    .with_context(|| format!("Failed to read directory: {}", directory.display()));
            }
            Err(e) => {
                warn!("讀取目錄項目失敗: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// 掃描音訊檔，依檔名排序，同名不同副檔名時只保留排序後的第一個
pub fn scan_audio_files(directory: &Path, table: &MediaExtensionTable) -> Result<Vec<PathBuf>> {
    let mut audio_files: Vec<PathBuf> = list_files(directory)?
        .into_iter()
        .filter(|path| table.is_audio_file(path))
        .collect();

    audio_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut seen_stems = HashSet::new();
    audio_files.retain(|path| {
        let stem = file_stem_of(path);
        if seen_stems.insert(stem) {
            true
        } else {
            debug!("略過同名音訊檔: {}", path.display());
            false
        }
    });

    Ok(audio_files)
}

/// 影片資料夾索引，以檔名（不含副檔名）分組
#[derive(Debug, Default)]
pub struct VideoIndex {
    by_stem: HashMap<String, Vec<PathBuf>>,
    extensions: Vec<String>,
}

impl VideoIndex {
    pub fn build(directory: &Path, table: &MediaExtensionTable) -> Result<Self> {
        let mut by_stem: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for path in list_files(directory)? {
            if table.is_video_file(&path) {
                by_stem.entry(file_stem_of(&path)).or_default().push(path);
            }
        }

        debug!(
            "影片索引建立完成: {} 個檔名 ({})",
            by_stem.len(),
            directory.display()
        );

        Ok(Self {
            by_stem,
            extensions: table.video_extensions().map(str::to_string).collect(),
        })
    }

    /// 依副檔名清單順序尋找同名影片
    ///
    /// 同一副檔名有多種大小寫時，優先全小寫，其次全大寫，其餘依檔名排序。
    #[must_use]
    pub fn find(&self, stem: &str) -> Option<PathBuf> {
        let candidates = self.by_stem.get(stem)?;

        for extension in &self.extensions {
            let mut matches: Vec<&PathBuf> = candidates
                .iter()
                .filter(|path| {
                    path.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
                })
                .collect();

            if matches.is_empty() {
                continue;
            }

            matches.sort_by_key(|path| {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default();
                let rank = if ext == extension.to_lowercase() {
                    0
                } else if ext == extension.to_uppercase() {
                    1
                } else {
                    2
                };
                (rank, ext)
            });

            return matches.first().map(|path| (*path).clone());
        }

        None
    }
}
