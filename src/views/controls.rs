//! 控制面板：手动触发与两步确认的紧急停机
//!
//! 写操作的失败只体现在面板消息里，不影响连接状态指示。

use tracing::{error, info, warn};

use crate::api::DashboardApi;
use crate::error::DashboardResult;
use crate::views::format::{paint, RenderOptions, Tone};
use crate::views::panel::Panel;

const TITLE: &str = "Controls";
pub const MSG_TRIGGER_FAILED: &str = "❌ Failed to trigger cycle";
pub const MSG_SECRET_REQUIRED: &str = "⚠️ Enter the kill secret";
pub const MSG_KILL_FAILED: &str = "❌ Kill failed — check secret";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlsPanel {
    trigger_running: bool,
    kill_confirm: bool,
    kill_secret: String,
    message: Option<String>,
}

impl ControlsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_trigger_running(&self) -> bool {
        self.trigger_running
    }

    pub fn is_kill_confirm(&self) -> bool {
        self.kill_confirm
    }

    /// 开始触发；已有触发在途时返回 false
    pub fn begin_trigger(&mut self) -> bool {
        if self.trigger_running {
            return false;
        }
        self.trigger_running = true;
        self.message = None;
        true
    }

    pub fn finish_trigger(&mut self, result: DashboardResult<String>) {
        self.trigger_running = false;
        self.message = Some(match result {
            Ok(ack) => {
                info!("⚡ 手动触发成功: {}", ack);
                format!("✅ {}", ack)
            }
            Err(e) => {
                error!("手动触发失败: {}", e);
                MSG_TRIGGER_FAILED.to_string()
            }
        });
    }

    pub async fn trigger(&mut self, api: &dyn DashboardApi) {
        if !self.begin_trigger() {
            return;
        }
        let result = api.trigger().await;
        self.finish_trigger(result);
    }

    /// 第一步：展开密钥输入
    pub fn reveal_kill(&mut self) {
        self.kill_confirm = true;
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.kill_secret = secret.into();
    }

    pub fn cancel_kill(&mut self) {
        self.kill_confirm = false;
        self.kill_secret.clear();
    }

    /// 第二步前的校验：未展开密钥输入时直接忽略；密钥为空时只提示，不发请求
    pub fn prepare_kill(&mut self) -> Option<String> {
        if !self.kill_confirm {
            return None;
        }
        if self.kill_secret.is_empty() {
            self.message = Some(MSG_SECRET_REQUIRED.to_string());
            return None;
        }
        Some(self.kill_secret.clone())
    }

    pub fn finish_kill(&mut self, result: DashboardResult<String>) {
        match result {
            Ok(ack) => {
                warn!("🛑 紧急停机已执行: {}", ack);
                self.message = Some(format!("🛑 {}", ack));
                self.cancel_kill();
            }
            Err(e) => {
                // 不区分密钥错误和网络错误
                error!("紧急停机失败: {}", e);
                self.message = Some(MSG_KILL_FAILED.to_string());
            }
        }
    }

    pub async fn confirm_kill(&mut self, api: &dyn DashboardApi) {
        let secret = match self.prepare_kill() {
            Some(secret) => secret,
            None => return,
        };
        let result = api.kill(&secret).await;
        self.finish_kill(result);
    }

    pub fn render(&self, opts: &RenderOptions) -> Panel {
        let mut panel = Panel::new(TITLE);
        if self.trigger_running {
            panel.push(paint("⏳ Running Cycle...", Tone::Warn, opts.color));
        } else {
            panel.push(format!("[t] {}", paint("⚡ Trigger Manual Cycle", Tone::Accent, opts.color)));
        }

        if self.kill_confirm {
            panel.push(paint("⚠️ This will permanently stop the bot!", Tone::Loss, opts.color));
            let masked = if self.kill_secret.is_empty() {
                "Enter kill secret...".to_string()
            } else {
                "*".repeat(self.kill_secret.chars().count())
            };
            panel.push(format!("Secret: {}", masked));
            panel.push("<secret>⏎ set + Confirm Kill   [c] Cancel".to_string());
        } else {
            panel.push(format!("[k] {}", paint("☠️ Kill Switch", Tone::Loss, opts.color)));
        }

        if let Some(message) = &self.message {
            panel.push(message.clone());
        }
        panel
    }
}
