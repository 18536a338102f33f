//! 远端 API 的响应结构
//!
//! 所有实体都是只读快照，每次刷新整体替换。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 买卖方向
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TradeSide {
    Buy,
    Sell,
    Other(String),
}

impl From<String> for TradeSide {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "BUY" => TradeSide::Buy,
            "SELL" => TradeSide::Sell,
            _ => TradeSide::Other(value),
        }
    }
}

impl From<TradeSide> for String {
    fn from(value: TradeSide) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
            TradeSide::Other(s) => write!(f, "{}", s),
        }
    }
}

/// 决策周期的动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CycleAction {
    Buy,
    Sell,
    Hold,
    Error,
    Other(String),
}

impl From<String> for CycleAction {
    fn from(value: String) -> Self {
        match value.to_uppercase().as_str() {
            "BUY" => CycleAction::Buy,
            "SELL" => CycleAction::Sell,
            "HOLD" => CycleAction::Hold,
            "ERROR" => CycleAction::Error,
            _ => CycleAction::Other(value),
        }
    }
}

impl From<CycleAction> for String {
    fn from(value: CycleAction) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleAction::Buy => write!(f, "BUY"),
            CycleAction::Sell => write!(f, "SELL"),
            CycleAction::Hold => write!(f, "HOLD"),
            CycleAction::Error => write!(f, "ERROR"),
            CycleAction::Other(s) => write!(f, "{}", s),
        }
    }
}

/// GET /status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub is_alive: bool,
    pub balance_usdc: f64,
    pub total_pnl: f64,
    pub open_positions: i64,
    pub total_trades: i64,
    pub total_cycles: i64,
    /// 百分比
    pub win_rate: f64,
    pub uptime_hours: f64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// GET /trades，按执行时间倒序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub position_id: Option<String>,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    pub usdc_amount: f64,
    pub commission: Option<f64>,
    pub executed_at: DateTime<Utc>,
}

/// GET /balance，按记录时间倒序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i64,
    pub balance_usdc: f64,
    pub open_positions: i64,
    pub total_pnl: f64,
    pub recorded_at: DateTime<Utc>,
}

/// GET /cycles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleLogEntry {
    pub id: String,
    pub cycle_number: i64,
    pub balance_usdc: f64,
    pub action: CycleAction,
    pub symbol: Option<String>,
    /// 百分比
    pub confidence: Option<i64>,
    pub reasoning: Option<String>,
    pub fear_greed: Option<i64>,
    pub execution_ms: Option<i64>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// GET /positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub status: String,
    pub pnl: Option<f64>,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// 当前价缺失时按开仓价计算
    pub fn mark_price(&self) -> f64 {
        self.current_price.unwrap_or(self.entry_price)
    }

    /// 浮动盈亏百分比
    pub fn pnl_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        (self.mark_price() - self.entry_price) / self.entry_price * 100.0
    }
}

/// GET /health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// 推送通道上常见的周期更新消息，只用于日志，不参与状态合并
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleUpdate {
    pub cycle_number: i64,
    pub balance_usdc: f64,
    pub action: CycleAction,
    pub symbol: Option<String>,
    pub confidence: Option<i64>,
    pub reasoning: Option<String>,
    pub pnl: f64,
    pub fear_greed: Option<i64>,
    pub timestamp: DateTime<Utc>,
}
