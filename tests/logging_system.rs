//! 日志系统集成测试.
//!
//! tracing 的全局订阅器只能初始化一次, 涉及 init() 的测试都标记为 #[ignore],
//! 需要单独运行: cargo test --test logging_system <名称> -- --ignored

use mpf::logging::{LoggingConfig, init, log_file_path};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn make_config(directory: &Path, level: &str, prefix: &str) -> LoggingConfig {
    LoggingConfig {
        level: level.to_string(),
        console_level: "error".to_string(),
        directory: directory.to_string_lossy().to_string(),
        file_prefix: prefix.to_string(),
        retention_days: 7,
        compress_history: false,
        cleanup_interval_seconds: 3600,
    }
}

fn today_log(directory: &Path, prefix: &str) -> std::path::PathBuf {
    log_file_path(directory, prefix, chrono::Local::now().date_naive())
}

#[tokio::test]
#[ignore]
async fn test_logging_file_content() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");
    init(make_config(&log_dir, "info", "content-test")).expect("日志初始化失败");

    assert!(log_dir.exists(), "日志目录应该被创建");

    tracing::error!("错误日志_ERROR_MSG");
    tracing::info!("信息日志_INFO_MSG");
    tracing::debug!("调试日志_DEBUG_MSG");

    // 库 crate 通过 log 门面输出的日志也应写入文件
    let mut manager = mpf::codec::CodecManager::new();
    mpf::codec::register_all(&mut manager);
    log::warn!("log门面_WARN_MSG");

    std::thread::sleep(std::time::Duration::from_millis(200));

    let log_file = today_log(&log_dir, "content-test");
    let content = fs::read_to_string(&log_file)
        .unwrap_or_else(|e| panic!("读取日志文件失败: {:?}, 错误: {}", log_file, e));

    assert!(content.contains("错误日志_ERROR_MSG"));
    assert!(content.contains("信息日志_INFO_MSG"));
    assert!(content.contains("log门面_WARN_MSG"));
    assert!(
        !content.contains("调试日志_DEBUG_MSG"),
        "debug 日志应该被过滤掉, 文件内容:\n{}",
        content
    );
    assert!(content.contains("INFO"), "日志应该包含级别标记");
}

#[test]
fn test_logging_file_naming_format() {
    let temp_dir = TempDir::new().unwrap();
    let today = chrono::Local::now().date_naive();
    for prefix in ["mpf", "mpf-cli"] {
        let path = today_log(temp_dir.path(), prefix);
        let expected = format!("{}.{}.log", prefix, today.format("%Y-%m-%d"));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(expected.as_str())
        );
    }
}

#[test]
fn test_logging_config_from_json() {
    let config: LoggingConfig = serde_json::from_str(
        r#"{"level":"debug","directory":"/var/log/mpf","retention_days":3,"compress_history":false}"#,
    )
    .unwrap();
    assert_eq!(config.level, "debug");
    assert_eq!(config.directory, "/var/log/mpf");
    assert_eq!(config.retention_days, 3);
    assert!(!config.compress_history);
    assert_eq!(config.cleanup_interval_seconds, 3600);
}
