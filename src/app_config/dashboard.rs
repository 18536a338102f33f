use std::time::Duration;

use reqwest::Url;

use crate::app_config::env::{env_is_true, env_opt, env_or_default, env_u64};
use crate::error::{DashboardError, DashboardResult};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_WS_PORT: u16 = 3001;
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_MAX_POSITIONS: u64 = 2;

/// 看板运行配置
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// HTTP API 根地址
    pub api_url: String,
    /// 推送通道地址
    pub ws_url: String,
    /// 推送地址是否显式配置；为 false 时随 API 主机推导
    pub ws_url_explicit: bool,
    /// 定时刷新间隔
    pub refresh_interval: Duration,
    /// 持仓上限（状态卡片 `open/max` 的分母）
    pub max_positions: u64,
    /// 是否输出 ANSI 颜色
    pub color: bool,
}

impl DashboardConfig {
    /// 从环境变量读取：
    /// DASHBOARD_API_URL / DASHBOARD_WS_URL / DASHBOARD_REFRESH_SECS /
    /// DASHBOARD_MAX_POSITIONS / DASHBOARD_COLOR
    pub fn from_env() -> DashboardResult<Self> {
        let api_url = env_or_default("DASHBOARD_API_URL", DEFAULT_API_URL);
        let ws_url = env_opt("DASHBOARD_WS_URL");
        Self::build(
            api_url,
            ws_url,
            env_u64("DASHBOARD_REFRESH_SECS", DEFAULT_REFRESH_SECS),
            env_u64("DASHBOARD_MAX_POSITIONS", DEFAULT_MAX_POSITIONS),
            env_is_true("DASHBOARD_COLOR", true),
        )
    }

    pub fn build(
        api_url: String,
        ws_url: Option<String>,
        refresh_secs: u64,
        max_positions: u64,
        color: bool,
    ) -> DashboardResult<Self> {
        let api_url = api_url.trim_end_matches('/').to_string();
        let ws_url_explicit = ws_url.is_some();
        let ws_url = match ws_url {
            Some(url) => url,
            None => default_ws_url(&api_url)?,
        };
        if !ws_url.starts_with("ws://") {
            return Err(DashboardError::Config(format!(
                "unsupported push url '{}': expected ws://",
                ws_url
            )));
        }
        if refresh_secs == 0 {
            return Err(DashboardError::Config(
                "refresh interval must be at least 1 second".to_string(),
            ));
        }
        Ok(Self {
            api_url,
            ws_url,
            ws_url_explicit,
            refresh_interval: Duration::from_secs(refresh_secs),
            max_positions,
            color,
        })
    }
}

/// 推送通道默认地址：`ws://<API 所在主机>:3001/ws`
pub fn default_ws_url(api_url: &str) -> DashboardResult<String> {
    let url = Url::parse(api_url)
        .map_err(|e| DashboardError::Config(format!("invalid api url '{}': {}", api_url, e)))?;
    let host = url.host_str().unwrap_or("localhost");
    Ok(format!("ws://{}:{}/ws", host, DEFAULT_WS_PORT))
}
