//! 数值、时间与颜色的统一格式化

use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;

/// 渲染选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// 输出 ANSI 颜色
    pub color: bool,
    /// 持仓上限
    pub max_positions: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            max_positions: 2,
        }
    }
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }
}

/// 文本色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gain,
    Loss,
    Warn,
    Accent,
    Muted,
    Plain,
}

impl Tone {
    /// 盈亏着色：>= 0 为绿色，负数为红色
    pub fn of(value: f64) -> Tone {
        if value >= 0.0 {
            Tone::Gain
        } else {
            Tone::Loss
        }
    }
}

pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Gain => text.green().to_string(),
        Tone::Loss => text.red().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Accent => text.cyan().bold().to_string(),
        Tone::Muted => text.dark_grey().to_string(),
        Tone::Plain => text.to_string(),
    }
}

/// 价格类字段的小数位：大于 1 用 2 位，否则 6 位
pub fn price_decimals(value: f64) -> usize {
    if value > 1.0 {
        2
    } else {
        6
    }
}

pub fn format_price(value: f64) -> String {
    format!("${:.*}", price_decimals(value), value)
}

pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_qty(value: f64) -> String {
    format!("{:.6}", value)
}

/// 带符号的金额，例如 `+$2.3412` / `-$1.25`
pub fn format_signed_usd(value: f64, decimals: usize) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}${:.*}", sign, decimals, value.abs())
}

pub fn format_signed_pct(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, value)
}

/// `BTCUSDC` -> `BTC/USDC`
pub fn pair_symbol(symbol: &str) -> String {
    format!("{}/USDC", symbol.replace("USDC", ""))
}

pub fn format_clock(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn format_short(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %d %H:%M").to_string()
}

pub fn format_datetime(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// 按字符截断，超出部分以省略号结尾
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
