//! E2E 測試
//!
//! 使用 ffmpeg 產生測試素材，走完整的偵測與輸出流程。
//! 系統沒有 ffmpeg 時略過。

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tempfile::TempDir;
use vdjedit_creator::component::vdjedit_creator::{RunOptions, VdjEditCreator};
use vdjedit_creator::config::{Config, UserSettings};
use vdjedit_creator::tools::{
    CrossCorrelationEstimator, FfmpegCommand, OffsetEstimator, get_media_duration,
};

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

fn run_ffmpeg(args: &[&str]) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"])
        .args(args)
        .status()
        .is_ok_and(|s| s.success())
}

/// 產生 20 秒的噪音音訊，以及從第 3 秒開始、長 14 秒的影片
fn generate_media(dir: &Path) -> bool {
    let audio = dir.join("audio").join("track.wav");
    let video = dir.join("video").join("track.mkv");
    fs::create_dir_all(audio.parent().unwrap()).unwrap();
    fs::create_dir_all(video.parent().unwrap()).unwrap();

    let audio_ok = run_ffmpeg(&[
        "-f",
        "lavfi",
        "-i",
        "anoisesrc=d=20:c=pink:r=8000:a=0.5:s=42,volume='0.3+0.7*abs(sin(3*t))':eval=frame",
        "-ac",
        "1",
        "-c:a",
        "pcm_s16le",
        audio.to_str().unwrap(),
    ]);
    if !audio_ok {
        return false;
    }

    run_ffmpeg(&[
        "-f",
        "lavfi",
        "-i",
        "color=c=black:s=64x64:r=10:d=14",
        "-ss",
        "3",
        "-t",
        "14",
        "-i",
        audio.to_str().unwrap(),
        "-map",
        "0:v",
        "-map",
        "1:a",
        "-c:v",
        "ffv1",
        "-c:a",
        "pcm_s16le",
        "-shortest",
        video.to_str().unwrap(),
    ])
}

#[test]
fn test_full_pipeline_with_ffmpeg() {
    if !ffmpeg_available() {
        println!("跳過測試：找不到 ffmpeg");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    if !generate_media(temp_dir.path()) {
        println!("跳過測試：ffmpeg 無法產生測試素材");
        return;
    }

    let audio_dir = temp_dir.path().join("audio");
    let video_dir = temp_dir.path().join("video");
    let output_dir = temp_dir.path().join("output");

    // 單獨驗證時長與偏移
    let ffmpeg = FfmpegCommand::default();
    let audio_duration = get_media_duration(&audio_dir.join("track.wav"), &ffmpeg).unwrap();
    let video_duration = get_media_duration(&video_dir.join("track.mkv"), &ffmpeg).unwrap();
    println!("時長: 音訊 {audio_duration:.3}s, 影片 {video_duration:.3}s");
    assert!((audio_duration - 20.0).abs() < 0.1);
    assert!((video_duration - 14.0).abs() < 0.2);

    let estimator = CrossCorrelationEstimator::from_settings(&UserSettings::default());
    let alignment = estimator
        .estimate_offset(&audio_dir.join("track.wav"), &video_dir.join("track.mkv"))
        .unwrap();
    println!("偏移: {:.3}s, 分數: {:.2}", alignment.offset, alignment.score);
    assert!((alignment.offset - 3.0).abs() < 0.1);

    let options = RunOptions {
        audio_dir,
        video_dir,
        output_dir: output_dir.clone(),
        overwrite: false,
    };
    let summary = VdjEditCreator::new(
        Config::new().unwrap(),
        options,
        Arc::new(AtomicBool::new(false)),
    )
    .run()
    .unwrap();

    assert_eq!(summary.created, 1);
    assert_eq!(summary.failed, 0);

    let outputs: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].starts_with("track(Negative)"), "{outputs:?}");

    let xml = fs::read_to_string(output_dir.join(&outputs[0])).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let clip = doc
        .root_element()
        .descendants()
        .filter(|n| n.has_tag_name("video"))
        .nth(1)
        .unwrap();
    let pos: f64 = clip.attribute("pos").unwrap().parse().unwrap();
    let length: f64 = clip.attribute("length").unwrap().parse().unwrap();
    assert!((pos - 3.0).abs() < 0.1);
    assert_eq!(clip.attribute("sourcepos"), Some("0.000000"));
    assert!((length - 14.0).abs() < 0.3);
}
