//! 日志初始化模块.
//!
//! 输出由 `mpf::logging` 完成, 这里只决定生效的日志配置:
//! - 配置文件中的 `logging` 段优先, 缺省时写入 logs/mpf-cli.{date}.log
//! - -v/-vv 把文件日志级别提升到 debug/trace
//! - MPF_LOG 环境变量覆盖文件日志级别
//!
//! 控制台默认只输出错误, 避免干扰 `--json` 等命令结果.

use anyhow::{Context, Result};
use mpf::logging::LoggingConfig;
use tokio::runtime::Runtime;

/// 日志级别环境变量
const LOG_ENV: &str = "MPF_LOG";

/// 计算生效的日志配置
pub fn resolve(
    configured: Option<&LoggingConfig>,
    verbosity: u8,
    env_level: Option<String>,
) -> LoggingConfig {
    let mut config = match configured {
        Some(config) => config.clone(),
        None => LoggingConfig {
            console_level: "error".to_string(),
            file_prefix: "mpf-cli".to_string(),
            ..LoggingConfig::default()
        },
    };
    match verbosity {
        0 => {}
        1 => config.level = "debug".to_string(),
        _ => config.level = "trace".to_string(),
    }
    if let Some(level) = env_level.filter(|level| !level.is_empty()) {
        config.level = level;
    }
    config
}

/// 初始化日志系统
///
/// 日志维护任务运行在返回的运行时上, 调用方需要在进程退出前一直持有它.
pub fn init(configured: Option<&LoggingConfig>, verbosity: u8) -> Result<Runtime> {
    let config = resolve(configured, verbosity, std::env::var(LOG_ENV).ok());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .context("创建日志维护运行时失败")?;
    {
        let _guard = runtime.enter();
        mpf::logging::init(config)?;
    }
    Ok(runtime)
}
