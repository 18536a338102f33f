//! 看板状态同步器
//!
//! 三种触发方式共用同一条刷新路径：启动时立即刷新、固定间隔刷新、推送事件触发刷新。
//! 每次刷新并发拉取五个读接口，全部成功才整体替换快照。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::DashboardApi;
use crate::error::DashboardResult;
use crate::socket::{PushChannel, SubscriberId, Subscription};
use crate::sync::state::{DashboardState, FetchedBundle};

/// 并发拉取五份快照，任意一个失败则整体失败
pub async fn fetch_all(api: &dyn DashboardApi) -> DashboardResult<FetchedBundle> {
    let (status, trades, balance, cycles, positions) = tokio::try_join!(
        api.status(),
        api.trades(),
        api.balance(),
        api.cycles(),
        api.positions()
    )?;
    Ok(FetchedBundle {
        status,
        trades,
        balance,
        cycles,
        positions,
    })
}

struct SyncContext {
    api: Arc<dyn DashboardApi>,
    state_tx: watch::Sender<DashboardState>,
    /// 同步器销毁后置为 false，在途刷新的结果随之丢弃
    alive: AtomicBool,
}

impl SyncContext {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    async fn refresh(&self) -> DashboardResult<()> {
        let outcome = fetch_all(self.api.as_ref()).await;
        if !self.is_alive() {
            debug!("synchronizer stopped, discard refresh result");
            return Ok(());
        }
        match outcome {
            Ok(bundle) => {
                debug!(
                    "refresh ok: trades={} balance={} cycles={} positions={}",
                    bundle.trades.len(),
                    bundle.balance.len(),
                    bundle.cycles.len(),
                    bundle.positions.len()
                );
                self.state_tx
                    .send_modify(|state| state.apply_success(bundle, Utc::now()));
                Ok(())
            }
            Err(e) => {
                error!("❌ 看板数据刷新失败: {}", e);
                self.state_tx.send_modify(|state| state.apply_failure());
                Err(e)
            }
        }
    }
}

/// 同步器
///
/// `start` 之后在后台任务中运行；`shutdown` 取消定时器、移除推送订阅并断开推送通道。
pub struct DashboardSynchronizer {
    ctx: Arc<SyncContext>,
    push: PushChannel,
    refresh_interval: Duration,
    subscriber: Option<SubscriberId>,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl DashboardSynchronizer {
    pub fn new(api: Arc<dyn DashboardApi>, push: PushChannel, refresh_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(DashboardState::default());
        Self {
            ctx: Arc::new(SyncContext {
                api,
                state_tx,
                alive: AtomicBool::new(true),
            }),
            push,
            refresh_interval,
            subscriber: None,
            stop_tx: None,
            task: None,
        }
    }

    /// 订阅状态变化
    pub fn subscribe_state(&self) -> watch::Receiver<DashboardState> {
        self.ctx.state_tx.subscribe()
    }

    /// 当前状态的拷贝
    pub fn snapshot(&self) -> DashboardState {
        self.ctx.state_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some() && self.ctx.is_alive()
    }

    /// 立即刷新一次
    pub async fn refresh(&self) -> DashboardResult<()> {
        self.ctx.refresh().await
    }

    /// 订阅推送通道、建立连接并启动后台同步任务；重复调用无效果
    pub fn start(&mut self) {
        if self.task.is_some() || !self.ctx.is_alive() {
            return;
        }
        let subscription = self.push.subscribe();
        self.subscriber = Some(subscription.id());
        self.push.connect();

        let (stop_tx, stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);
        let ctx = Arc::clone(&self.ctx);
        let period = self.refresh_interval;
        self.task = Some(tokio::spawn(async move {
            run_sync_loop(ctx, subscription, period, stop_rx).await;
        }));
        info!(
            "🚀 看板同步已启动，刷新间隔 {:?}，推送通道 {}",
            self.refresh_interval,
            self.push.url()
        );
    }

    /// 停止同步。在途刷新不会被取消，但结果会被丢弃。可重复调用。
    pub fn shutdown(&mut self) {
        if !self.ctx.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(id) = self.subscriber.take() {
            self.push.unsubscribe(id);
        }
        self.push.disconnect();
        info!("看板同步已停止");
    }

    /// 等待后台任务退出
    pub async fn wait_stopped(&mut self) {
        if let Some(handle) = self.task.take() {
            if let Err(e) = handle.await {
                warn!("sync task join error: {}", e);
            }
        }
    }
}

impl Drop for DashboardSynchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn wait_stop(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow() {
            return;
        }
        if stop.changed().await.is_err() {
            return;
        }
    }
}

async fn run_sync_loop(
    ctx: Arc<SyncContext>,
    mut subscription: Subscription,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) {
    // 失败已在 refresh 内记录
    let _ = ctx.refresh().await;

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut push_open = true;

    loop {
        tokio::select! {
            _ = wait_stop(&mut stop) => break,
            _ = ticker.tick() => {
                debug!("定时刷新");
            }
            event = subscription.recv(), if push_open => match event {
                Some(event) => match event.cycle_update() {
                    Some(update) => info!(
                        "📨 周期更新 #{} {} balance={:.2}，刷新看板",
                        update.cycle_number, update.action, update.balance_usdc
                    ),
                    None => debug!("push event received, refreshing"),
                },
                None => {
                    // 订阅已移除，只保留定时刷新
                    push_open = false;
                    continue;
                }
            },
        }
        if !ctx.is_alive() {
            break;
        }
        let _ = ctx.refresh().await;
    }
    debug!("sync loop exited");
}
