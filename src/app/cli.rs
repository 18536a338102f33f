use clap::{Parser, Subcommand};

use crate::app_config::DashboardConfig;
use crate::error::DashboardResult;

/// 交易机器人实时看板
#[derive(Debug, Parser)]
#[command(name = "survival-dashboard", version)]
pub struct Cli {
    /// HTTP API 根地址，覆盖 DASHBOARD_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// 推送通道地址，覆盖 DASHBOARD_WS_URL
    #[arg(long, global = true)]
    pub ws_url: Option<String>,

    /// 定时刷新间隔（秒），覆盖 DASHBOARD_REFRESH_SECS
    #[arg(long, global = true)]
    pub refresh_secs: Option<u64>,

    /// 关闭 ANSI 颜色
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// 实时看板（默认）
    Watch,
    /// 拉取一次并打印
    Snapshot,
    /// 检查后端健康状态
    Health,
    /// 手动触发一次决策周期
    Trigger,
    /// 紧急停机
    Kill {
        /// 停机密钥，缺省读取 DASHBOARD_KILL_SECRET
        #[arg(long)]
        secret: Option<String>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }

    /// 环境变量打底，命令行参数覆盖
    pub fn resolve_config(&self, base: DashboardConfig) -> DashboardResult<DashboardConfig> {
        // 推送地址未显式配置时，跟随（可能被覆盖的）API 主机重新推导
        let ws_url = match &self.ws_url {
            Some(ws) => Some(ws.clone()),
            None if base.ws_url_explicit => Some(base.ws_url.clone()),
            None => None,
        };
        let refresh_secs = self
            .refresh_secs
            .unwrap_or_else(|| base.refresh_interval.as_secs());
        DashboardConfig::build(
            self.api_url.clone().unwrap_or(base.api_url),
            ws_url,
            refresh_secs,
            base.max_positions,
            base.color && !self.no_color,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base() -> DashboardConfig {
        DashboardConfig::build("http://localhost:3001".to_string(), None, 30, 2, true).unwrap()
    }

    #[test]
    fn test_default_command_is_watch() {
        let cli = Cli::try_parse_from(["survival-dashboard"]).unwrap();
        assert_eq!(cli.command(), Command::Watch);
        assert_eq!(cli.resolve_config(base()).unwrap(), base());
    }

    #[test]
    fn test_flags_override_env() {
        let cli = Cli::try_parse_from([
            "survival-dashboard",
            "snapshot",
            "--api-url",
            "http://10.0.0.5:3001/",
            "--refresh-secs",
            "5",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.command(), Command::Snapshot);
        let config = cli.resolve_config(base()).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.5:3001");
        assert_eq!(config.ws_url, "ws://10.0.0.5:3001/ws");
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert!(!config.color);
    }

    #[test]
    fn test_api_url_flag_keeps_explicit_push_url() {
        let explicit_base = DashboardConfig::build(
            "http://localhost:3001".to_string(),
            Some("ws://push.example:9000/ws".to_string()),
            30,
            2,
            true,
        )
        .unwrap();
        let cli = Cli::try_parse_from(["survival-dashboard", "--api-url", "http://10.0.0.5:3001"])
            .unwrap();
        let config = cli.resolve_config(explicit_base).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.5:3001");
        assert_eq!(config.ws_url, "ws://push.example:9000/ws");

        let cli = Cli::try_parse_from(["survival-dashboard", "--ws-url", "ws://other:1/ws"]).unwrap();
        assert_eq!(cli.resolve_config(base()).unwrap().ws_url, "ws://other:1/ws");
    }

    #[test]
    fn test_kill_secret_flag() {
        let cli = Cli::try_parse_from(["survival-dashboard", "kill", "--secret", "s3cret"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Kill {
                secret: Some("s3cret".to_string())
            }
        );
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let cli = Cli::try_parse_from(["survival-dashboard", "--refresh-secs", "0"]).unwrap();
        assert!(cli.resolve_config(base()).is_err());
    }
}
