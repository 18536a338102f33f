//! 单元测试共用的样例数据

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::api::models::{
    BalanceSnapshot, CycleAction, CycleLogEntry, Position, StatusSnapshot, TradeRecord, TradeSide,
};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_564_800 + secs, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn status() -> StatusSnapshot {
    StatusSnapshot {
        is_alive: true,
        balance_usdc: 52.34,
        total_pnl: 2.3412,
        open_positions: 1,
        total_trades: 14,
        total_cycles: 96,
        win_rate: 57.14,
        uptime_hours: 23.5,
        last_cycle_at: Some(ts(3_600)),
    }
}

pub fn trade(id: &str, price: f64) -> TradeRecord {
    TradeRecord {
        id: id.to_string(),
        position_id: Some("pos-1".to_string()),
        symbol: "BTCUSDC".to_string(),
        side: TradeSide::Buy,
        quantity: 0.00012,
        price,
        usdc_amount: 7.68,
        commission: None,
        executed_at: ts(600),
    }
}

/// 按 API 约定倒序给出：values[0] 是最新一条
pub fn balance_newest_first(values: &[f64]) -> Vec<BalanceSnapshot> {
    let len = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let seq = len - i as i64;
            BalanceSnapshot {
                id: seq,
                balance_usdc: *v,
                open_positions: 0,
                total_pnl: *v - 50.0,
                recorded_at: ts(0) + Duration::minutes(30 * seq),
            }
        })
        .collect()
}

pub fn cycle(number: i64, action: CycleAction) -> CycleLogEntry {
    CycleLogEntry {
        id: format!("cycle-{}", number),
        cycle_number: number,
        balance_usdc: 50.0,
        action,
        symbol: None,
        confidence: None,
        reasoning: None,
        fear_greed: None,
        execution_ms: None,
        result: None,
        error: None,
        created_at: ts(number * 1_800),
    }
}

pub fn position(symbol: &str, entry: f64, current: Option<f64>) -> Position {
    Position {
        id: format!("pos-{}", symbol),
        symbol: symbol.to_string(),
        side: TradeSide::Buy,
        quantity: 0.5,
        entry_price: entry,
        current_price: current,
        stop_loss: None,
        take_profit: None,
        status: "OPEN".to_string(),
        pnl: None,
        opened_at: ts(120),
    }
}
