use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// ffmpeg 指令產生器
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    binary: PathBuf,
}

impl Default for FfmpegCommand {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// 只讀取輸入資訊的指令，時長等資訊輸出在 stderr
    ///
    /// 沒有指定輸出檔，ffmpeg 會以非零狀態結束，呼叫端不應檢查結束碼。
    #[must_use]
    pub fn build_probe_command(&self, source_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-hide_banner", "-nostdin", "-i"]);
        cmd.arg(Self::input_arg(source_path));
        cmd.stdin(Stdio::null());
        cmd
    }

    /// 將來源的音軌解碼成單聲道 16-bit little-endian PCM，輸出到 stdout
    #[must_use]
    pub fn build_pcm_command(
        &self,
        source_path: &Path,
        sample_rate: u32,
        max_seconds: u32,
    ) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error"]);
        cmd.args(["-t", &max_seconds.to_string()]);
        cmd.arg("-i");
        cmd.arg(Self::input_arg(source_path));
        cmd.args([
            "-vn",
            "-sn",
            "-dn",
            "-map", "0:a:0",
            "-ac", "1",
            "-ar", &sample_rate.to_string(),
            "-acodec", "pcm_s16le",
            "-f", "s16le",
            "-",
        ]);
        cmd.stdin(Stdio::null());
        cmd
    }

    /// 加上 `file:` 前綴，避免以 `-` 開頭或含 `:` 的檔名被誤判
    fn input_arg(source_path: &Path) -> OsString {
        let mut input = OsString::from("file:");
        input.push(source_path.as_os_str());
        input
    }
}
