//! VDJEdit 描述檔
//!
//! 依偏移量計算影片在時間軸上的位置與重疊長度，輸出 XML。

use crate::tools::{AlignmentResult, DurationSource, MediaPair};
use anyhow::{Context, Result, bail};
use console::style;
use log::info;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const VDJEDIT_EXTENSION: &str = "vdjedit";
pub const NEGATIVE_SUFFIX: &str = "(Negative)";
pub const SUBSTANDARD_SUFFIX: &str = "(Substandard)";

/// 不含偏移與分數標記的輸出檔名
#[must_use]
pub fn base_output_file_name(stem: &str) -> String {
    format!("{stem}.{VDJEDIT_EXTENSION}")
}

/// 最終輸出檔名：`{stem}[(Negative)][(Substandard)].vdjedit`
#[must_use]
pub fn output_file_name(stem: &str, alignment: &AlignmentResult) -> String {
    let mut name = stem.to_string();
    if alignment.is_negative() {
        name.push_str(NEGATIVE_SUFFIX);
    }
    if alignment.is_substandard() {
        name.push_str(SUBSTANDARD_SUFFIX);
    }
    base_output_file_name(&name)
}

/// 兩軌錯開後的重疊長度
///
/// 結果不會被限制為非負值。
#[must_use]
pub fn compute_overlap_length(audio_duration: f64, video_duration: f64, offset: f64) -> f64 {
    if offset > 0.0 {
        (audio_duration - offset).min(video_duration)
    } else {
        audio_duration.min(video_duration + offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditDescriptor {
    pub audio_path: PathBuf,
    pub audio_size: u64,
    pub video_path: PathBuf,
    pub video_size: u64,
    /// 影片在輸出時間軸上的起點
    pub pos: f64,
    /// 影片來源的裁切起點
    pub source_pos: f64,
    pub length: f64,
}

impl EditDescriptor {
    /// 偏移為正時影片延後開始；否則從影片的 `|offset|` 處開始播放
    #[must_use]
    pub fn new(
        audio_path: &Path,
        audio_size: u64,
        video_path: &Path,
        video_size: u64,
        offset: f64,
        length: f64,
    ) -> Self {
        let (pos, source_pos) = if offset > 0.0 {
            (offset, 0.0)
        } else {
            (0.0, offset.abs())
        };

        Self {
            audio_path: audio_path.to_path_buf(),
            audio_size,
            video_path: video_path.to_path_buf(),
            video_size,
            pos,
            source_pos,
            length,
        }
    }

    /// 輸出為 UTF-8 XML，縮排 4 個空白
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let audio_source = self.audio_path.to_string_lossy();
        let audio_size = self.audio_size.to_string();
        let mut edit = BytesStart::new("edit");
        edit.push_attribute(("source", audio_source.as_ref()));
        edit.push_attribute(("sourcesize", audio_size.as_str()));
        writer.write_event(Event::Start(edit))?;

        writer.write_event(Event::Start(BytesStart::new("video")))?;

        let pos = format!("{:.6}", self.pos);
        let source_pos = format!("{:.6}", self.source_pos);
        let length = format!("{:.6}", self.length);
        let video_source = self.video_path.to_string_lossy();
        let video_size = self.video_size.to_string();
        let mut clip = BytesStart::new("video");
        clip.push_attribute(("pos", pos.as_str()));
        clip.push_attribute(("sourcepos", source_pos.as_str()));
        clip.push_attribute(("length", length.as_str()));
        clip.push_attribute(("source", video_source.as_ref()));
        clip.push_attribute(("sourcesize", video_size.as_str()));
        writer.write_event(Event::Empty(clip))?;

        writer.write_event(Event::End(BytesEnd::new("video")))?;
        writer.write_event(Event::End(BytesEnd::new("edit")))?;

        let mut xml = String::from_utf8(writer.into_inner().into_inner())
            .context("Generated XML is not valid UTF-8")?;
        xml.push('\n');
        Ok(xml)
    }
}

/// 描述檔寫出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Created(PathBuf),
    /// 檔案已存在且未要求覆寫
    Skipped(PathBuf),
}

/// 建立 VDJEdit 描述檔
pub fn create_vdjedit(
    pair: &MediaPair,
    output_dir: &Path,
    alignment: &AlignmentResult,
    overwrite: bool,
    durations: &dyn DurationSource,
) -> Result<EmitOutcome> {
    if !pair.audio.exists() {
        bail!("Audio file not found: {}", pair.audio.display());
    }
    if !pair.video.exists() {
        bail!("Video file not found: {}", pair.video.display());
    }

    let audio_size = fs::metadata(&pair.audio)
        .with_context(|| format!("Failed to read metadata: {}", pair.audio.display()))?
        .len();
    let video_size = fs::metadata(&pair.video)
        .with_context(|| format!("Failed to read metadata: {}", pair.video.display()))?
        .len();

    let audio_length = durations.duration_seconds(&pair.audio)?;
    let video_length = durations.duration_seconds(&pair.video)?;
    let length = compute_overlap_length(audio_length, video_length, alignment.offset);

    let descriptor = EditDescriptor::new(
        &pair.audio,
        audio_size,
        &pair.video,
        video_size,
        alignment.offset,
        length,
    );

    let file_name = output_file_name(&pair.stem(), alignment);
    let output_path = output_dir.join(&file_name);

    if output_path.exists() && !overwrite {
        println!(
            "{}",
            style(format!("Skipping {file_name} - file already exists")).yellow()
        );
        info!("描述檔已存在，略過: {}", output_path.display());
        return Ok(EmitOutcome::Skipped(output_path));
    }

    let xml = descriptor.to_xml()?;
    fs::write(&output_path, xml)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    info!(
        "已寫出 {} (pos={:.6}, sourcepos={:.6}, length={:.6})",
        output_path.display(),
        descriptor.pos,
        descriptor.source_pos,
        descriptor.length
    );
    Ok(EmitOutcome::Created(output_path))
}
