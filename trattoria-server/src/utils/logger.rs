//! Logging setup
//!
//! Console output is pretty in development and JSON otherwise. With a log
//! directory configured, two daily rotating files are written as well:
//! - `app/app.YYYY-MM-DD` for everything except the `security` target
//!   (pruned after [`APP_LOG_RETENTION_DAYS`])
//! - `security/security.YYYY-MM-DD` for `security_log!` events (kept)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Application logs older than this are deleted
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const SECURITY_TARGET: &str = "security";

/// Initialize console logging, plus file logging when `log_dir` is set
///
/// `RUST_LOG` overrides `level` when present.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()?;
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let app_dir = log_dir.join("app");
    let security_dir = log_dir.join(SECURITY_TARGET);
    fs::create_dir_all(&app_dir)?;
    fs::create_dir_all(&security_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != SECURITY_TARGET
        }));

    let security_log = RollingFileAppender::new(Rotation::DAILY, security_dir, SECURITY_TARGET);
    let security_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(security_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == SECURITY_TARGET
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(security_layer)
        .try_init()?;

    tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    Ok(())
}

/// Delete rotated application logs older than the retention window
///
/// Returns the number of removed files. Security logs are never touched.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> anyhow::Result<usize> {
    let app_dir = log_dir.join("app");
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(retention_days);
    let mut removed = 0;
    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = name
            .strip_prefix("app.")
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(removed)
}

async fn periodic_cleanup(log_dir: PathBuf) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
    loop {
        interval.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir, APP_LOG_RETENTION_DAYS) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}
