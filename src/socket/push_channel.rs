//! 推送通道客户端
//!
//! 整个进程只维护一条推送连接，由组合根创建 [`PushChannel`] 后把句柄传给各个消费者。
//! 收到的每条合法 JSON 消息广播给全部订阅者；连接断开后按 [`ReconnectMachine`] 的退避策略静默重连。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::api::models::CycleUpdate;
use crate::error::DashboardError;
use crate::socket::connector::{PushConnector, PushStream, WsConnector};
use crate::socket::reconnect::{ConnectionState, ReconnectMachine, ReconnectPolicy};

pub type SubscriberId = u64;

/// 推送事件：只关心“有更新发生”，载荷保持原样
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    pub payload: Value,
    pub received_at: DateTime<Utc>,
}

impl PushEvent {
    /// 尝试按周期更新消息解析，失败返回 None
    pub fn cycle_update(&self) -> Option<CycleUpdate> {
        serde_json::from_value(self.payload.clone()).ok()
    }
}

/// 把一条文本帧解析为事件
pub fn parse_frame(text: &str) -> Result<PushEvent, DashboardError> {
    let payload = serde_json::from_str::<Value>(text)
        .map_err(|e| DashboardError::Parse(e.to_string()))?;
    Ok(PushEvent {
        payload,
        received_at: Utc::now(),
    })
}

struct SubscriberSlot {
    tx: mpsc::UnboundedSender<PushEvent>,
    active: Arc<AtomicBool>,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    slots: Mutex<HashMap<SubscriberId, SubscriberSlot>>,
}

impl Registry {
    fn slots(&self) -> MutexGuard<'_, HashMap<SubscriberId, SubscriberSlot>> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remove(&self, id: SubscriberId) -> bool {
        match self.slots().remove(&id) {
            Some(slot) => {
                slot.active.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// 同步遍历订阅者投递事件，顺带清理接收端已丢弃的订阅
    fn broadcast(&self, event: &PushEvent) -> usize {
        let mut slots = self.slots();
        slots.retain(|_, slot| slot.tx.send(event.clone()).is_ok());
        slots.len()
    }
}

/// 订阅句柄
///
/// 取消订阅（显式调用或 drop）后不会再收到任何事件，包括已在缓冲区中的事件。
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<PushEvent>,
    active: Arc<AtomicBool>,
    registry: Arc<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// 等待下一条事件；取消订阅后返回 None
    pub async fn recv(&mut self) -> Option<PushEvent> {
        if !self.is_active() {
            return None;
        }
        let event = self.rx.recv().await?;
        if self.is_active() {
            Some(event)
        } else {
            None
        }
    }

    pub fn unsubscribe(self) {
        // drop 中完成移除
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

struct Inner {
    url: String,
    connector: Arc<dyn PushConnector>,
    machine: Mutex<ReconnectMachine>,
    registry: Arc<Registry>,
    /// 当前驱动任务的停止信号
    driver: Mutex<Option<watch::Sender<bool>>>,
}

impl Inner {
    fn machine(&self) -> MutexGuard<'_, ReconnectMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 推送通道句柄，clone 后共享同一条连接
#[derive(Clone)]
pub struct PushChannel {
    inner: Arc<Inner>,
}

impl PushChannel {
    /// 使用 WebSocket 连接
    pub fn websocket(url: impl Into<String>) -> Self {
        Self::new(url, Arc::new(WsConnector), ReconnectPolicy::default())
    }

    pub fn new(
        url: impl Into<String>,
        connector: Arc<dyn PushConnector>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                connector,
                machine: Mutex::new(ReconnectMachine::new(policy)),
                registry: Arc::new(Registry::default()),
                driver: Mutex::new(None),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.machine().state()
    }

    /// 已发起的连接尝试次数（含首次连接）
    pub fn attempts(&self) -> u64 {
        self.inner.machine().attempts()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.registry.slots().len()
    }

    /// 建立连接；已在连接/已连接/等待重连时什么也不做。必须在 tokio 运行时内调用。
    pub fn connect(&self) {
        let mut driver = self.inner.driver.lock().unwrap_or_else(|e| e.into_inner());
        let requested = self.inner.machine().request_connect();
        let generation = match requested {
            Some(generation) => generation,
            None => {
                debug!("push channel connect ignored: state={}", self.state());
                return;
            }
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_driver(inner, generation, shutdown_rx).await;
        });
        *driver = Some(shutdown_tx);
    }

    /// 断开连接并取消待执行的重连；之后不会自动重连，直到再次调用 [`Self::connect`]
    pub fn disconnect(&self) {
        let mut driver = self.inner.driver.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.machine().disconnect();
        if let Some(shutdown) = driver.take() {
            // 驱动任务收到信号后自行关闭连接；已结束的任务忽略发送失败
            let _ = shutdown.send(true);
            info!("🔌 推送通道已断开: {}", self.inner.url);
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let registry = Arc::clone(&self.inner.registry);
        let id = registry.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));
        registry.slots().insert(
            id,
            SubscriberSlot {
                tx,
                active: Arc::clone(&active),
            },
        );
        Subscription {
            id,
            rx,
            active,
            registry,
        }
    }

    /// 幂等：返回本次调用是否真正移除了订阅者
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.registry.remove(id)
    }
}

enum SessionEnd {
    Closed,
    Errored,
    Shutdown,
}

fn is_shutdown(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

async fn wait_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }
        if shutdown.changed().await.is_err() {
            // 句柄全部释放，视同断开
            return;
        }
    }
}

/// 单条连接的收发循环
async fn run_session(
    inner: &Inner,
    generation: u64,
    mut stream: Box<dyn PushStream>,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    loop {
        let frame = tokio::select! {
            _ = wait_shutdown(shutdown) => {
                stream.close().await;
                return SessionEnd::Shutdown;
            }
            frame = stream.next_frame() => frame,
        };
        match frame {
            Some(Ok(text)) => match parse_frame(&text) {
                Ok(event) => {
                    if let Some(update) = event.cycle_update() {
                        debug!(
                            "收到周期更新: cycle={} action={}",
                            update.cycle_number, update.action
                        );
                    }
                    let delivered = inner.registry.broadcast(&event);
                    debug!("push event delivered to {} subscribers", delivered);
                }
                Err(e) => {
                    warn!("推送消息解析失败，已丢弃: {}", e);
                }
            },
            Some(Err(e)) => {
                error!("推送通道错误: {}", e);
                inner.machine().on_error(generation);
                stream.close().await;
                return SessionEnd::Errored;
            }
            None => return SessionEnd::Closed,
        }
    }
}

/// 连接驱动；对状态机的每次回报都带上自己的代数，被新驱动取代后的回报不生效
async fn run_driver(inner: Arc<Inner>, generation: u64, mut shutdown: watch::Receiver<bool>) {
    loop {
        let opened = tokio::select! {
            _ = wait_shutdown(&mut shutdown) => return,
            opened = inner.connector.open(&inner.url) => opened,
        };

        if is_shutdown(&shutdown) {
            return;
        }
        match opened {
            Ok(stream) => {
                inner.machine().on_open(generation);
                info!("🔌 推送通道已连接: {}", inner.url);
                match run_session(&inner, generation, stream, &mut shutdown).await {
                    SessionEnd::Shutdown => return,
                    SessionEnd::Closed => info!("🔌 推送通道已关闭，准备重连"),
                    SessionEnd::Errored => {}
                }
            }
            Err(e) => {
                warn!("推送通道连接失败: {}", e);
                inner.machine().on_error(generation);
            }
        }

        if is_shutdown(&shutdown) {
            return;
        }
        let delay: Duration = match inner.machine().on_closed(generation) {
            Some(delay) => delay,
            None => return,
        };
        debug!("push channel reconnect in {:?}", delay);

        tokio::select! {
            _ = wait_shutdown(&mut shutdown) => return,
            _ = tokio::time::sleep(delay) => {}
        }
        if is_shutdown(&shutdown) || !inner.machine().on_timer_fired(generation) {
            return;
        }
    }
}
