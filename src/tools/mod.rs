mod ffmpeg_command;
mod media_duration;
mod media_scanner;
mod offset_finder;
mod path_validator;

pub use ffmpeg_command::FfmpegCommand;
pub use media_duration::{
    DurationSource, MediaDurationReader, get_media_duration, parse_ffmpeg_duration,
    round_to_micros,
};
pub use media_scanner::{MediaPair, VideoIndex, file_stem_of, scan_audio_files};
pub use offset_finder::{
    AlignmentResult, CrossCorrelationEstimator, OffsetEstimator, estimate_offset_from_samples,
};
pub use path_validator::{ensure_directory_exists, normalize_directory_arg};
