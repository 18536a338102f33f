use chrono::{DateTime, Utc};

use crate::api::models::{BalanceSnapshot, CycleLogEntry, Position, StatusSnapshot, TradeRecord};

/// 一次完整刷新拿到的五份快照
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBundle {
    pub status: StatusSnapshot,
    pub trades: Vec<TradeRecord>,
    pub balance: Vec<BalanceSnapshot>,
    pub cycles: Vec<CycleLogEntry>,
    pub positions: Vec<Position>,
}

/// 看板的物化状态，视图只读取这里的数据
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub status: Option<StatusSnapshot>,
    /// 最新在前
    pub trades: Vec<TradeRecord>,
    /// 最新在前，图表渲染前自行反转
    pub balance: Vec<BalanceSnapshot>,
    pub cycles: Vec<CycleLogEntry>,
    pub positions: Vec<Position>,
    /// 首次拉取完成前为 true，之后永远为 false
    pub loading: bool,
    /// 最近一次刷新是否成功
    pub connected: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// 成功替换快照的次数
    pub refresh_count: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            status: None,
            trades: Vec::new(),
            balance: Vec::new(),
            cycles: Vec::new(),
            positions: Vec::new(),
            loading: true,
            connected: false,
            last_updated: None,
            refresh_count: 0,
        }
    }
}

impl DashboardState {
    /// 整体替换五份快照
    pub fn apply_success(&mut self, bundle: FetchedBundle, now: DateTime<Utc>) {
        self.status = Some(bundle.status);
        self.trades = bundle.trades;
        self.balance = bundle.balance;
        self.cycles = bundle.cycles;
        self.positions = bundle.positions;
        self.connected = true;
        self.last_updated = Some(now);
        self.refresh_count += 1;
        self.loading = false;
    }

    /// 刷新失败：保留旧数据，只翻转连接标记
    pub fn apply_failure(&mut self) {
        self.connected = false;
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixtures;
    use crate::api::models::CycleAction;

    fn bundle() -> FetchedBundle {
        FetchedBundle {
            status: fixtures::status(),
            trades: vec![fixtures::trade("t1", 64000.0)],
            balance: fixtures::balance_newest_first(&[120.0, 150.0, 100.0]),
            cycles: vec![fixtures::cycle(1, CycleAction::Hold)],
            positions: vec![],
        }
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = DashboardState::default();
        assert!(state.loading);
        assert!(!state.connected);
        assert!(state.status.is_none());
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_success_replaces_everything() {
        let mut state = DashboardState::default();
        let now = fixtures::ts(10);
        state.apply_success(bundle(), now);
        assert!(!state.loading);
        assert!(state.connected);
        assert_eq!(state.last_updated, Some(now));
        assert_eq!(state.trades.len(), 1);
        assert_eq!(state.balance.len(), 3);
        assert_eq!(state.refresh_count, 1);

        let mut next = bundle();
        next.trades.clear();
        state.apply_success(next, fixtures::ts(20));
        assert!(state.trades.is_empty());
        assert_eq!(state.refresh_count, 2);
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let mut state = DashboardState::default();
        state.apply_success(bundle(), fixtures::ts(10));
        let before = state.clone();

        state.apply_failure();
        assert!(!state.connected);
        assert_eq!(state.trades, before.trades);
        assert_eq!(state.status, before.status);
        assert_eq!(state.last_updated, before.last_updated);
        assert_eq!(state.refresh_count, 1);
    }

    #[test]
    fn test_failed_first_fetch_ends_loading() {
        let mut state = DashboardState::default();
        state.apply_failure();
        assert!(!state.loading);
        assert!(state.status.is_none());
    }
}
