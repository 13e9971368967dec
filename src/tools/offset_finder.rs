//! 音訊偏移估計
//!
//! 以短時頻帶能量特徵做交叉相關，找出影片音軌在音訊時間軸上的位置。
//! 分數為相關峰值的標準分數 `(peak - mean) / stddev`。

use super::ffmpeg_command::FfmpegCommand;
use crate::config::{SUBSTANDARD_SCORE_THRESHOLD, UserSettings};
use anyhow::{Context, Result, bail};
use log::debug;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::path::Path;

const FRAME_SIZE: usize = 256;
const HOP_SIZE: usize = 128;
const DEFAULT_BAND_COUNT: usize = 16;

/// 對齊結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentResult {
    /// 秒，正值表示影片在時間軸上較晚開始
    pub offset: f64,
    pub score: f64,
}

impl AlignmentResult {
    #[must_use]
    pub const fn new(offset: f64, score: f64) -> Self {
        Self { offset, score }
    }

    /// 影片需往後移（輸出檔名標記為 Negative）
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.offset > 0.0
    }

    #[must_use]
    pub fn is_substandard(&self) -> bool {
        self.score < SUBSTANDARD_SCORE_THRESHOLD
    }
}

/// 估計兩個媒體檔之間的時間偏移
pub trait OffsetEstimator {
    fn estimate_offset(&self, audio: &Path, video: &Path) -> Result<AlignmentResult>;
}

/// 透過 ffmpeg 解碼後做交叉相關的估計器
#[derive(Debug, Clone)]
pub struct CrossCorrelationEstimator {
    ffmpeg: FfmpegCommand,
    sample_rate: u32,
    max_analysis_seconds: u32,
    band_count: usize,
}

impl CrossCorrelationEstimator {
    #[must_use]
    pub fn new(ffmpeg: FfmpegCommand, sample_rate: u32, max_analysis_seconds: u32) -> Self {
        Self {
            ffmpeg,
            sample_rate,
            max_analysis_seconds,
            band_count: DEFAULT_BAND_COUNT,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self::new(
            FfmpegCommand::new(&settings.ffmpeg_path),
            settings.sample_rate,
            settings.max_analysis_seconds,
        )
    }

    fn decode_pcm(&self, path: &Path) -> Result<Vec<f32>> {
        let output = self
            .ffmpeg
            .build_pcm_command(path, self.sample_rate, self.max_analysis_seconds)
            .output()
            .with_context(|| format!("Failed to run ffmpeg for: {}", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "ffmpeg could not decode audio from {}: {}",
                path.display(),
                stderr.trim()
            );
        }

        let samples: Vec<f32> = output
            .stdout
            .chunks_exact(2)
            .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0)
            .collect();

        debug!("解碼 {} 個取樣: {}", samples.len(), path.display());
        Ok(samples)
    }
}

impl OffsetEstimator for CrossCorrelationEstimator {
    fn estimate_offset(&self, audio: &Path, video: &Path) -> Result<AlignmentResult> {
        let audio_samples = self.decode_pcm(audio)?;
        let video_samples = self.decode_pcm(video)?;

        let result = estimate_offset_from_samples(
            &audio_samples,
            &video_samples,
            self.sample_rate,
            self.band_count,
        )?;

        debug!(
            "偏移 {:.6}s，分數 {:.2}: {}",
            result.offset,
            result.score,
            audio.display()
        );
        Ok(result)
    }
}

/// 由兩段 PCM 計算偏移與分數
pub fn estimate_offset_from_samples(
    audio: &[f32],
    video: &[f32],
    sample_rate: u32,
    band_count: usize,
) -> Result<AlignmentResult> {
    if sample_rate == 0 {
        bail!("Sample rate must be positive");
    }

    let audio_features = band_energy_features(audio, band_count);
    let video_features = band_energy_features(video, band_count);

    let audio_frames = audio_features.first().map_or(0, Vec::len);
    let video_frames = video_features.first().map_or(0, Vec::len);
    if audio_frames == 0 {
        bail!("Audio too short to align");
    }
    if video_frames == 0 {
        bail!("Video audio track too short to align");
    }

    let correlation = cross_correlate(&audio_features, &video_features);

    let (peak_index, peak) = correlation
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, value)| {
            if value > best.1 { (i, value) } else { best }
        });

    let count = correlation.len() as f64;
    let mean = correlation.iter().sum::<f64>() / count;
    let variance = correlation.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / count;
    let std_dev = variance.sqrt();
    let score = if std_dev > 1e-12 {
        (peak - mean) / std_dev
    } else {
        0.0
    };

    // 索引 0 對應延遲 -(video_frames - 1)
    let lag_frames = peak_index as i64 - (video_frames as i64 - 1);
    let offset = lag_frames as f64 * HOP_SIZE as f64 / f64::from(sample_rate);

    Ok(AlignmentResult { offset, score })
}

/// 每個頻帶一條時間序列，已正規化為平均 0、標準差 1
fn band_energy_features(samples: &[f32], band_count: usize) -> Vec<Vec<f64>> {
    if samples.len() < FRAME_SIZE || band_count == 0 {
        return Vec::new();
    }

    let frame_count = (samples.len() - FRAME_SIZE) / HOP_SIZE + 1;
    let bins = FRAME_SIZE / 2;
    let band_width = (bins / band_count).max(1);
    let band_count = band_count.min(bins);

    let window: Vec<f64> = (0..FRAME_SIZE)
        .map(|i| {
            0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / FRAME_SIZE as f64).cos()
        })
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);

    let mut features = vec![vec![0.0; frame_count]; band_count];
    let mut buffer = vec![Complex::new(0.0, 0.0); FRAME_SIZE];

    for frame in 0..frame_count {
        let start = frame * HOP_SIZE;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(f64::from(samples[start + i]) * window[i], 0.0);
        }
        fft.process(&mut buffer);

        for (band, series) in features.iter_mut().enumerate() {
            // 跳過直流分量
            let lo = 1 + band * band_width;
            let hi = (lo + band_width).min(bins + 1);
            let energy: f64 = buffer[lo..hi].iter().map(Complex::norm_sqr).sum();
            series[frame] = (energy + 1e-10).ln();
        }
    }

    for series in &mut features {
        normalize(series);
    }

    features
}

fn normalize(series: &mut [f64]) {
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let std_dev = (series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    for value in series.iter_mut() {
        *value = if std_dev > 1e-12 {
            (*value - mean) / std_dev
        } else {
            0.0
        };
    }
}

/// 全部延遲的交叉相關（各頻帶加總）
///
/// 回傳長度為 `n + m - 1`，索引 `i` 對應延遲 `i - (m - 1)`，
/// 延遲 `L` 的值為 `sum_t audio[t + L] * video[t]`。
fn cross_correlate(audio: &[Vec<f64>], video: &[Vec<f64>]) -> Vec<f64> {
    let n = audio.first().map_or(0, Vec::len);
    let m = video.first().map_or(0, Vec::len);
    let size = (n + m - 1).next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(size);
    let ifft = planner.plan_fft_inverse(size);

    let mut accumulated = vec![Complex::new(0.0, 0.0); size];

    for (audio_band, video_band) in audio.iter().zip(video) {
        let mut audio_spectrum = padded(audio_band, size);
        let mut video_spectrum = padded(video_band, size);
        fft.process(&mut audio_spectrum);
        fft.process(&mut video_spectrum);

        for ((acc, a), v) in accumulated
            .iter_mut()
            .zip(&audio_spectrum)
            .zip(&video_spectrum)
        {
            *acc += a * v.conj();
        }
    }

    ifft.process(&mut accumulated);

    let scale = 1.0 / size as f64;
    (0..n + m - 1)
        .map(|i| {
            let lag = i as i64 - (m as i64 - 1);
            let index = if lag >= 0 {
                lag as usize
            } else {
                (size as i64 + lag) as usize
            };
            accumulated[index].re * scale
        })
        .collect()
}

fn padded(series: &[f64], size: usize) -> Vec<Complex<f64>> {
    let mut buffer = vec![Complex::new(0.0, 0.0); size];
    for (slot, &value) in buffer.iter_mut().zip(series) {
        *slot = Complex::new(value, 0.0);
    }
    buffer
}
