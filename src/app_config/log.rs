use std::env;
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

// 全局变量用于保持日志文件句柄
static INFO_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
static ERROR_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

// 日志配置结构体
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub app_env: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_rotation: String,
    pub info_file_name: String,
    pub error_file_name: String,
    pub enable_console_logging: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| crate::ENVIRONMENT_LOCAL.to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "log_files".to_string());
        let log_rotation = env::var("LOG_ROTATION").unwrap_or_else(|_| "daily".to_string());
        let info_file_name = env::var("LOG_INFO_FILE").unwrap_or_else(|_| "info.log".to_string());
        let error_file_name =
            env::var("LOG_ERROR_FILE").unwrap_or_else(|_| "error.log".to_string());
        let enable_console_logging = env::var("ENABLE_CONSOLE_LOGGING")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Self {
            app_env,
            log_level,
            log_dir,
            log_rotation,
            info_file_name,
            error_file_name,
            enable_console_logging,
        }
    }

    /// 本地环境且允许控制台输出时只打到 stdout
    pub fn console_only(&self) -> bool {
        self.app_env == crate::ENVIRONMENT_LOCAL && self.enable_console_logging
    }
}

// 解析时间轮转策略
pub fn parse_rotation(s: &str) -> Rotation {
    match s.to_lowercase().as_str() {
        "minutely" | "minute" | "min" => Rotation::MINUTELY,
        "hourly" | "hour" | "hr" => Rotation::HOURLY,
        "daily" | "day" => Rotation::DAILY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// 设置日志
///
/// `interactive` 为 true 时（看板独占终端）禁止写控制台，日志全部落盘。
pub fn setup_logging(interactive: bool) -> anyhow::Result<()> {
    let mut config = LogConfig::from_env();
    if interactive {
        config.enable_console_logging = false;
    }

    // 本地环境：仅控制台输出
    if config.console_only() {
        let base = Registry::default().with(
            fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(std::io::stdout)
                .with_filter(EnvFilter::new(&config.log_level)),
        );
        tracing::subscriber::set_global_default(base)?;

        info!("Log configuration setup successfully!");
        info!(
            "Environment: {}, Log Level: {}, File Logging: {}, Console Logging: {}",
            config.app_env, config.log_level, false, true
        );
        return Ok(());
    }

    // 文件输出（可选控制台）
    std::fs::create_dir_all(&config.log_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create log directory '{}': {}", config.log_dir, e)
    })?;

    let info_file = RollingFileAppender::new(
        parse_rotation(&config.log_rotation),
        &config.log_dir,
        &config.info_file_name,
    );
    let error_file = RollingFileAppender::new(
        parse_rotation(&config.log_rotation),
        &config.log_dir,
        &config.error_file_name,
    );

    let (info_non_blocking, info_guard) = tracing_appender::non_blocking(info_file);
    let (error_non_blocking, error_guard) = tracing_appender::non_blocking(error_file);

    // 保存guard到全局，防止被丢弃
    INFO_GUARD
        .set(info_guard)
        .map_err(|_| anyhow::anyhow!("Failed to set INFO_GUARD"))?;
    ERROR_GUARD
        .set(error_guard)
        .map_err(|_| anyhow::anyhow!("Failed to set ERROR_GUARD"))?;

    let base = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(info_non_blocking)
                .with_filter(EnvFilter::new(&config.log_level)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(error_non_blocking)
                .with_filter(EnvFilter::new("error")),
        );

    if config.enable_console_logging {
        let with_console = base.with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stdout)
                .with_filter(EnvFilter::new(&config.log_level)),
        );
        tracing::subscriber::set_global_default(with_console)?;
    } else {
        tracing::subscriber::set_global_default(base)?;
    }

    info!("Log configuration setup successfully!");
    info!(
        "Environment: {}, Log Level: {}, File Logging: {}, Console Logging: {}",
        config.app_env, config.log_level, true, config.enable_console_logging
    );
    Ok(())
}
