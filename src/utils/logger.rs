// 日誌工具

/// 初始化日誌輸出
///
/// debug 模式輸出 Debug 等級，否則只輸出錯誤；`RUST_LOG` 仍可覆蓋。
/// 重複初始化（例如測試中）會被忽略。
pub fn init_logger(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
