//! 推送通道的重连状态机
//!
//! 不做任何 IO，只负责状态迁移、退避延迟与“最多一个待执行重连定时器”的约束，
//! 由 [`crate::socket::push_channel`] 中的驱动任务调用。

use std::fmt;
use std::time::Duration;

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closed,
    Errored,
    Reconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "errored",
            ConnectionState::Reconnecting => "reconnecting",
        };
        write!(f, "{}", s)
    }
}

/// 退避参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// 初始/重置后的延迟
    pub floor: Duration,
    /// 每次重连后的放大倍数
    pub factor: f64,
    /// 延迟上限
    pub cap: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            floor: Duration::from_millis(3_000),
            factor: 1.5,
            cap: Duration::from_millis(30_000),
        }
    }
}

impl ReconnectPolicy {
    /// 第 n 次连续失败重连之后的下一次等待：min(floor * factor^n, cap)
    pub fn delay_after(&self, failed_reconnects: u32) -> Duration {
        let mut delay = self.floor;
        for _ in 0..failed_reconnects {
            delay = self.grow(delay);
        }
        delay
    }

    fn grow(&self, delay: Duration) -> Duration {
        delay.mul_f64(self.factor).min(self.cap)
    }
}

/// 重连状态机
///
/// 每次 [`Self::request_connect`] 启动新驱动时代数加一；驱动回报事件时携带自己的代数，
/// 旧代数的回报一律忽略，已断开的旧驱动无法再改动新会话的状态。
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    policy: ReconnectPolicy,
    state: ConnectionState,
    delay: Duration,
    timer_pending: bool,
    stopped: bool,
    attempts: u64,
    generation: u64,
}

impl Default for ReconnectMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

impl ReconnectMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            delay: policy.floor,
            timer_pending: false,
            stopped: true,
            attempts: 0,
            generation: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// 下一次重连将使用的延迟
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    pub fn timer_pending(&self) -> bool {
        self.timer_pending
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// 累计发起的连接尝试次数（含首次）
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// 当前驱动的代数
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 调用方请求连接。
    ///
    /// 只有处于 Disconnected 时返回新驱动的代数（需要启动驱动任务），其余状态下幂等忽略。
    pub fn request_connect(&mut self) -> Option<u64> {
        self.stopped = false;
        if self.state != ConnectionState::Disconnected {
            return None;
        }
        self.generation += 1;
        self.timer_pending = false;
        self.begin_attempt();
        Some(self.generation)
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation
    }

    fn begin_attempt(&mut self) {
        self.state = ConnectionState::Connecting;
        self.attempts += 1;
    }

    /// 连接成功，退避延迟复位
    pub fn on_open(&mut self, generation: u64) {
        if self.stopped || self.is_stale(generation) {
            return;
        }
        self.state = ConnectionState::Open;
        self.delay = self.policy.floor;
    }

    /// 连接失败或收到错误；调用方随后必须强制关闭连接并调用 [`Self::on_closed`]
    pub fn on_error(&mut self, generation: u64) {
        if self.stopped || self.is_stale(generation) {
            return;
        }
        self.state = ConnectionState::Errored;
    }

    /// 连接关闭。
    ///
    /// 返回需要等待的重连延迟；已停止、代数过期或已有待执行定时器时返回 None。
    pub fn on_closed(&mut self, generation: u64) -> Option<Duration> {
        if self.is_stale(generation) {
            return None;
        }
        if self.stopped {
            self.state = ConnectionState::Disconnected;
            return None;
        }
        if self.timer_pending {
            return None;
        }
        self.state = ConnectionState::Reconnecting;
        self.timer_pending = true;
        Some(self.delay)
    }

    /// 重连定时器到期：清除定时器标记，放大下一次延迟，进入 Connecting。
    ///
    /// 已停止或代数过期时返回 false，调用方不应再发起连接。
    pub fn on_timer_fired(&mut self, generation: u64) -> bool {
        if self.stopped || self.is_stale(generation) || !self.timer_pending {
            return false;
        }
        self.timer_pending = false;
        self.delay = self.policy.grow(self.delay);
        self.begin_attempt();
        true
    }

    /// 主动断开：取消待执行定时器，不再自动重连
    pub fn disconnect(&mut self) {
        self.stopped = true;
        self.timer_pending = false;
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(d: Duration) -> u128 {
        d.as_millis()
    }

    #[test]
    fn test_delay_after_matches_formula() {
        let policy = ReconnectPolicy::default();
        for n in 0..12u32 {
            let expected = (3000.0 * 1.5f64.powi(n as i32)).min(30000.0);
            let actual = policy.delay_after(n).as_secs_f64() * 1000.0;
            assert!((actual - expected).abs() < 0.001, "n={} {} vs {}", n, actual, expected);
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let mut machine = ReconnectMachine::default();
        let gen = machine.request_connect().expect("driver started");
        machine.on_open(gen);

        let mut delays = Vec::new();
        for _ in 0..9 {
            machine.on_error(gen);
            let delay = machine.on_closed(gen).expect("reconnect scheduled");
            delays.push(ms(delay));
            assert!(machine.on_timer_fired(gen));
        }
        assert_eq!(
            delays,
            vec![3000, 4500, 6750, 10125, 15187, 22781, 30000, 30000, 30000]
        );
    }

    #[test]
    fn test_open_resets_delay() {
        let mut machine = ReconnectMachine::default();
        let gen = machine.request_connect().unwrap();
        for _ in 0..4 {
            machine.on_closed(gen);
            machine.on_timer_fired(gen);
        }
        assert!(machine.current_delay() > Duration::from_secs(3));
        machine.on_open(gen);
        assert_eq!(machine.state(), ConnectionState::Open);
        assert_eq!(machine.current_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_single_pending_timer() {
        let mut machine = ReconnectMachine::default();
        let gen = machine.request_connect().unwrap();
        machine.on_open(gen);
        machine.on_error(gen);
        assert!(machine.on_closed(gen).is_some());
        for _ in 0..10 {
            machine.on_error(gen);
            assert!(machine.on_closed(gen).is_none());
        }
        assert!(machine.timer_pending());
        // 延迟没有因为重复的关闭事件而被放大
        assert_eq!(machine.current_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut machine = ReconnectMachine::default();
        let gen = machine.request_connect().unwrap();
        assert!(machine.request_connect().is_none());
        machine.on_open(gen);
        assert!(machine.request_connect().is_none());
        assert_eq!(machine.attempts(), 1);
        assert_eq!(machine.generation(), gen);
    }

    #[test]
    fn test_disconnect_cancels_pending_timer() {
        let mut machine = ReconnectMachine::default();
        let gen = machine.request_connect().unwrap();
        assert!(machine.on_closed(gen).is_some());
        machine.disconnect();
        assert!(!machine.timer_pending());
        assert!(!machine.on_timer_fired(gen));
        assert!(machine.on_closed(gen).is_none());
        assert_eq!(machine.state(), ConnectionState::Disconnected);

        // 再次 connect 后恢复自动重连
        let next = machine.request_connect().unwrap();
        assert!(next > gen);
        assert!(machine.on_closed(next).is_some());
    }

    #[test]
    fn test_old_driver_cannot_wedge_new_session() {
        let mut machine = ReconnectMachine::default();
        let old = machine.request_connect().unwrap();
        machine.on_open(old);

        // 旧驱动尚未退出时发生 disconnect + connect
        machine.disconnect();
        let new = machine.request_connect().unwrap();

        // 旧驱动迟到的回报全部被忽略
        machine.on_error(old);
        assert!(machine.on_closed(old).is_none());
        assert!(!machine.timer_pending());
        assert!(!machine.on_timer_fired(old));
        assert_eq!(machine.state(), ConnectionState::Connecting);

        machine.on_open(new);
        assert_eq!(machine.state(), ConnectionState::Open);
        assert_eq!(machine.on_closed(new), Some(Duration::from_secs(3)));
        assert!(machine.on_timer_fired(new));
        assert_eq!(machine.attempts(), 3);
    }
}
