//! VDJEdit 批次建立元件
//!
//! 逐一處理音訊檔：尋找同名影片、估計偏移、寫出描述檔

use super::descriptor::{EmitOutcome, base_output_file_name, create_vdjedit, output_file_name};
use crate::config::Config;
use crate::tools::{
    CrossCorrelationEstimator, DurationSource, FfmpegCommand, MediaDurationReader, MediaPair,
    OffsetEstimator, VideoIndex, ensure_directory_exists, file_stem_of, scan_audio_files,
};
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 執行參數
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub audio_dir: PathBuf,
    pub video_dir: PathBuf,
    pub output_dir: PathBuf,
    /// 覆寫已存在的描述檔
    pub overwrite: bool,
}

/// 處理結果統計
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// 單一音訊檔的處理結果
enum PairOutcome {
    Created,
    Skipped,
    NoVideo,
}

pub struct VdjEditCreator {
    config: Config,
    options: RunOptions,
    estimator: Box<dyn OffsetEstimator>,
    durations: Box<dyn DurationSource>,
    shutdown_signal: Arc<AtomicBool>,
}

impl VdjEditCreator {
    #[must_use]
    pub fn new(config: Config, options: RunOptions, shutdown_signal: Arc<AtomicBool>) -> Self {
        let estimator = CrossCorrelationEstimator::from_settings(&config.settings);
        let durations =
            MediaDurationReader::new(FfmpegCommand::new(&config.settings.ffmpeg_path));

        Self {
            config,
            options,
            estimator: Box::new(estimator),
            durations: Box::new(durations),
            shutdown_signal,
        }
    }

    /// 替換偏移估計器
    #[must_use]
    pub fn with_offset_estimator(mut self, estimator: impl OffsetEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// 替換時長讀取器
    #[must_use]
    pub fn with_duration_source(mut self, durations: impl DurationSource + 'static) -> Self {
        self.durations = Box::new(durations);
        self
    }

    pub fn run(&self) -> Result<RunSummary> {
        let RunOptions {
            audio_dir,
            video_dir,
            output_dir,
            ..
        } = &self.options;

        // 輸入資料夾不存在時只顯示訊息，不視為錯誤
        if !audio_dir.is_dir() {
            println!(
                "{}",
                style(format!("Audio directory not found: {}", audio_dir.display())).red()
            );
            return Ok(RunSummary::default());
        }
        if !video_dir.is_dir() {
            println!(
                "{}",
                style(format!("Video directory not found: {}", video_dir.display())).red()
            );
            return Ok(RunSummary::default());
        }
        if !output_dir.is_dir() {
            println!("Creating output directory: {}", output_dir.display());
            ensure_directory_exists(output_dir)?;
        }

        let audio_files = scan_audio_files(audio_dir, &self.config.media_extensions)?;
        if audio_files.is_empty() {
            println!(
                "{}",
                style(format!("No audio files found in {}", audio_dir.display())).yellow()
            );
            return Ok(RunSummary::default());
        }

        println!(
            "{}",
            style(format!("Found {} audio files", audio_files.len())).green()
        );
        info!("找到 {} 個音訊檔: {}", audio_files.len(), audio_dir.display());

        let videos = VideoIndex::build(video_dir, &self.config.media_extensions)?;

        let mut summary = RunSummary::default();
        let mut processed_stems = HashSet::new();

        for audio_file in &audio_files {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理");
                break;
            }

            if !processed_stems.insert(file_stem_of(audio_file)) {
                continue;
            }

            let name = display_name(audio_file);
            match self.process_audio_file(audio_file, &videos) {
                Ok(PairOutcome::Created) => summary.created += 1,
                Ok(PairOutcome::Skipped) => summary.skipped += 1,
                Ok(PairOutcome::NoVideo) => summary.failed += 1,
                Err(e) => {
                    println!(
                        "{}",
                        style(format!("Error processing {name}: {e:#}")).red()
                    );
                    warn!("處理失敗 {name}: {e:#}");
                    summary.failed += 1;
                }
            }
        }

        println!(
            "\nProcessing complete: {} created, {} skipped, {} failed",
            summary.created, summary.skipped, summary.failed
        );
        info!(
            "處理完成 - 建立: {}, 略過: {}, 失敗: {}",
            summary.created, summary.skipped, summary.failed
        );

        Ok(summary)
    }

    fn process_audio_file(&self, audio_file: &Path, videos: &VideoIndex) -> Result<PairOutcome> {
        let name = display_name(audio_file);
        let stem = file_stem_of(audio_file);
        let overwrite = self.options.overwrite;
        let output_dir = &self.options.output_dir;

        let Some(video_file) = videos.find(&stem) else {
            println!(
                "{}",
                style(format!("No matching video found for: {name}")).yellow()
            );
            return Ok(PairOutcome::NoVideo);
        };
        let pair = MediaPair::new(audio_file.to_path_buf(), video_file);

        println!("Processing: {name}");
        debug!("配對: {} <-> {}", pair.audio.display(), pair.video.display());

        // 估計偏移前先以基本檔名檢查，避免不必要的分析
        if output_dir.join(base_output_file_name(&stem)).exists() && !overwrite {
            println!(
                "{}",
                style(format!("Skipping {name} - output file already exists")).dim()
            );
            return Ok(PairOutcome::Skipped);
        }

        let alignment = {
            let spinner = self.alignment_spinner(&name)?;
            let result = self.estimator.estimate_offset(&pair.audio, &pair.video);
            spinner.finish_and_clear();
            result?
        };

        let output_name = output_file_name(&stem, &alignment);
        if output_dir.join(&output_name).exists() && !overwrite {
            println!(
                "{}",
                style(format!(
                    "Skipping {name} - output file {output_name} already exists"
                ))
                .dim()
            );
            return Ok(PairOutcome::Skipped);
        }

        match create_vdjedit(
            &pair,
            output_dir,
            &alignment,
            overwrite,
            self.durations.as_ref(),
        )? {
            EmitOutcome::Created(_) => {
                println!(
                    "{}",
                    style(format!("Created VDJEdit file for: {name}")).green()
                );
                Ok(PairOutcome::Created)
            }
            EmitOutcome::Skipped(_) => Ok(PairOutcome::Skipped),
        }
    }

    fn alignment_spinner(&self, name: &str) -> Result<ProgressBar> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        spinner.set_message(format!("Aligning {name}..."));
        spinner.enable_steady_tick(Duration::from_millis(120));
        Ok(spinner)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
