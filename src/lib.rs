//! 交易机器人实时看板
//!
//! 通过 HTTP 轮询与 WebSocket 推送同步远端机器人的状态，在终端中渲染。

pub mod api;
pub mod app;
pub mod app_config;
pub mod error;
pub mod socket;
pub mod sync;
pub mod views;

pub const ENVIRONMENT_LOCAL: &str = "local";
