use super::LoggingConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, error};

/// 启动后台维护任务: 定期清理/压缩历史日志, 每天零点请求写入器切换到新文件
pub(super) fn spawn(config: LoggingConfig, reopen_requested: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut cleanup_tick =
            tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds.max(1)));
        let mut rollover_at = next_rollover_or_retry(Local::now());

        loop {
            tokio::select! {
                _ = cleanup_tick.tick() => {
                    if let Err(err) = cleanup(&config, Local::now().date_naive()) {
                        error!("清理历史日志失败: {}", err);
                    }
                }
                _ = tokio::time::sleep_until(rollover_at) => {
                    reopen_requested.store(true, Ordering::Release);
                    debug!("日志翻滚到新的一天");
                    if let Err(err) = cleanup(&config, Local::now().date_naive()) {
                        error!("翻滚后清理历史日志失败: {}", err);
                    }
                    rollover_at = next_rollover_or_retry(Local::now());
                }
            }
        }
    });
}

fn next_rollover_or_retry(now: DateTime<Local>) -> tokio::time::Instant {
    match next_midnight(now) {
        Ok(delay) => tokio::time::Instant::now() + delay,
        Err(err) => {
            error!("计算下一次日志翻滚时间失败: {}", err);
            tokio::time::Instant::now() + Duration::from_secs(1)
        }
    }
}

/// 距离下一个本地零点的时长
fn next_midnight(now: DateTime<Local>) -> Result<Duration> {
    let next_date = now.date_naive() + ChronoDuration::days(1);
    let midnight = next_date
        .and_hms_opt(0, 0, 0)
        .context("构造零点时间失败")?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .context("零点时间不存在于本地时区")?;
    let target = SystemTime::from(local.with_timezone(&Utc));
    Ok(target
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO))
}

/// 删除过期日志, 并按配置压缩早于 `today` 的未压缩日志
fn cleanup(config: &LoggingConfig, today: NaiveDate) -> Result<()> {
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(());
    }
    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((date, compressed)) = parse_log_file_name(name, &config.file_prefix) else {
            continue;
        };

        if date < cutoff {
            if let Err(err) = fs::remove_file(&path) {
                error!("删除过期日志失败, path={}: {}", path.display(), err);
            }
        } else if config.compress_history && !compressed && date < today {
            if let Err(err) = compress_file(&path) {
                error!("压缩历史日志失败, path={}: {}", path.display(), err);
            }
        }
    }
    Ok(())
}

/// 压缩为同名 `.gz` 文件并删除原文件
fn compress_file(path: &Path) -> Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(());
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(())
}

/// 解析 `{prefix}.{YYYY-MM-DD}.log[.gz]`, 返回日期与是否已压缩
fn parse_log_file_name(name: &str, prefix: &str) -> Option<(NaiveDate, bool)> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('.')?;
    let (date_part, compressed) = match rest.strip_suffix(".log.gz") {
        Some(date_part) => (date_part, true),
        None => (rest.strip_suffix(".log")?, false),
    };
    if date_part.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((date, compressed))
}
