//! 媒體時長讀取
//!
//! 先以 symphonia 讀取容器資訊，失敗時改用 ffmpeg 並解析 stderr 中的
//! `Duration: HH:MM:SS.cc`。

use super::ffmpeg_command::FfmpegCommand;
use anyhow::{Context, Result, anyhow};
use log::debug;
use regex::Regex;
use std::fs::File;
use std::path::Path;
use std::sync::LazyLock;
use symphonia::core::codecs::{CODEC_TYPE_NULL, CodecParameters};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration:\s*(\d+):(\d{1,2}):(\d{1,2}(?:\.\d+)?)").expect("Invalid regex")
});

/// 取得媒體時長（秒）
pub trait DurationSource {
    fn duration_seconds(&self, path: &Path) -> Result<f64>;
}

/// 預設的時長讀取器：symphonia 優先，ffmpeg 備援
#[derive(Debug, Clone, Default)]
pub struct MediaDurationReader {
    ffmpeg: FfmpegCommand,
}

impl MediaDurationReader {
    #[must_use]
    pub const fn new(ffmpeg: FfmpegCommand) -> Self {
        Self { ffmpeg }
    }
}

impl DurationSource for MediaDurationReader {
    fn duration_seconds(&self, path: &Path) -> Result<f64> {
        get_media_duration(path, &self.ffmpeg)
    }
}

/// 讀取媒體時長，四捨五入到小數第 6 位
pub fn get_media_duration(path: &Path, ffmpeg: &FfmpegCommand) -> Result<f64> {
    match read_container_duration(path) {
        Ok(Some(seconds)) => {
            debug!("symphonia 時長 {seconds:.6}s: {}", path.display());
            return Ok(round_to_micros(seconds));
        }
        Ok(None) => debug!("容器未提供時長，改用 ffmpeg: {}", path.display()),
        Err(e) => debug!("symphonia 無法讀取 {}，改用 ffmpeg: {e}", path.display()),
    }

    probe_duration_with_ffmpeg(path, ffmpeg)
        .map(round_to_micros)
        .with_context(|| format!("Could not read media file: {}", path.display()))
}

fn read_container_duration(path: &Path) -> Result<Option<f64>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    Ok(first_track_duration(&*probed.format))
}

/// 第一個有已知長度的軌道
fn first_track_duration(reader: &dyn FormatReader) -> Option<f64> {
    reader
        .tracks()
        .iter()
        .filter(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .find_map(|track| track_duration(&track.codec_params))
}

fn track_duration(params: &CodecParameters) -> Option<f64> {
    let n_frames = params.n_frames?;

    if let Some(time_base) = params.time_base {
        let time = time_base.calc_time(n_frames);
        return Some(time.seconds as f64 + time.frac);
    }

    let sample_rate = params.sample_rate.filter(|&rate| rate > 0)?;
    Some(n_frames as f64 / f64::from(sample_rate))
}

fn probe_duration_with_ffmpeg(path: &Path, ffmpeg: &FfmpegCommand) -> Result<f64> {
    let output = ffmpeg
        .build_probe_command(path)
        .output()
        .with_context(|| format!("FFmpeg failed to read media file: {}", path.display()))?;

    // ffmpeg 的輸入資訊輸出在 stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    parse_ffmpeg_duration(&stderr).ok_or_else(|| {
        anyhow!(
            "Could not find duration in FFmpeg output for: {}",
            path.display()
        )
    })
}

/// 解析 ffmpeg 輸出中的 `Duration: HH:MM:SS.cc`
///
/// `Duration: N/A` 視為找不到。
#[must_use]
pub fn parse_ffmpeg_duration(output: &str) -> Option<f64> {
    let caps = DURATION_REGEX.captures(output)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours.mul_add(3600.0, minutes.mul_add(60.0, seconds)))
}

#[must_use]
pub fn round_to_micros(seconds: f64) -> f64 {
    (seconds * 1_000_000.0).round() / 1_000_000.0
}
