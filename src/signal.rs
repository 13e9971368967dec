use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 設定 Ctrl-C 處理器，收到訊號後在目前檔案處理完畢時停止
pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        signal_clone.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupt received, stopping after the current file...");
    })
    .context("無法設定 Ctrl-C 處理器")?;

    Ok(shutdown_signal)
}
