use env_logger::Env;

/// 初始化日誌，`RUST_LOG` 優先於預設等級
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    // 測試中可能重複初始化
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}
