//! 命令列參數

use crate::component::vdjedit_creator::RunOptions;
use crate::config::UserSettings;
use crate::tools::normalize_directory_arg;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vdjedit-creator")]
#[command(about = "Create VDJEdit files from audio and video pairs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory containing audio files (default: current directory)
    #[arg(short = 'a', long = "audio-source")]
    pub audio_source: Option<String>,

    /// Directory containing video files (default: current directory)
    #[arg(short = 'v', long = "video-source")]
    pub video_source: Option<String>,

    /// Directory for output files (default: current directory)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<String>,

    /// Overwrite existing .vdjedit files
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Path to the ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// 解析資料夾參數，未指定時使用目前工作目錄
    pub fn run_options(&self) -> Result<RunOptions> {
        let current_dir = std::env::current_dir().context("無法取得目前工作目錄")?;
        let resolve = |arg: &Option<String>| -> PathBuf {
            arg.as_deref()
                .map_or_else(|| current_dir.clone(), normalize_directory_arg)
        };

        Ok(RunOptions {
            audio_dir: resolve(&self.audio_source),
            video_dir: resolve(&self.video_source),
            output_dir: resolve(&self.output_dir),
            overwrite: self.overwrite,
        })
    }

    /// 命令列指定的值覆蓋設定檔
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(ffmpeg) = &self.ffmpeg {
            settings.ffmpeg_path.clone_from(ffmpeg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "vdjedit-creator",
            "-a",
            "/music/",
            "-v",
            "/videos",
            "-o",
            "/out\\",
            "-w",
        ])
        .unwrap();

        let options = cli.run_options().unwrap();
        assert_eq!(options.audio_dir, PathBuf::from("/music"));
        assert_eq!(options.video_dir, PathBuf::from("/videos"));
        assert_eq!(options.output_dir, PathBuf::from("/out"));
        assert!(options.overwrite);
    }

    #[test]
    fn test_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["vdjedit-creator"]).unwrap();
        let options = cli.run_options().unwrap();
        let current_dir = std::env::current_dir().unwrap();

        assert_eq!(options.audio_dir, current_dir);
        assert_eq!(options.video_dir, current_dir);
        assert_eq!(options.output_dir, current_dir);
        assert!(!options.overwrite);
    }

    #[test]
    fn test_long_flags_and_ffmpeg_override() {
        let cli = Cli::try_parse_from([
            "vdjedit-creator",
            "--audio-source",
            "a",
            "--video-source",
            "v",
            "--output-dir",
            "o",
            "--overwrite",
            "--ffmpeg",
            "/opt/ffmpeg",
        ])
        .unwrap();

        let mut settings = UserSettings::default();
        cli.apply_to(&mut settings);
        assert_eq!(settings.ffmpeg_path, "/opt/ffmpeg");
        assert!(cli.run_options().unwrap().overwrite);
    }

    #[test]
    fn test_clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
