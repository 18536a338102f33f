use std::io::Write;
use std::sync::Arc;

use anyhow::anyhow;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use dotenv::dotenv;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::api::{ApiClient, DashboardApi};
use crate::app::cli::{Cli, Command};
use crate::app::input::{InputEvent, LineEditor, SecretEntryMode};
use crate::app::shutdown::{ShutdownConfig, ShutdownManager};
use crate::app_config::env::env_opt;
use crate::app_config::log::setup_logging;
use crate::app_config::DashboardConfig;
use crate::error::DashboardResult;
use crate::socket::PushChannel;
use crate::sync::{DashboardState, DashboardSynchronizer};
use crate::views::{render_dashboard, ControlsPanel, RenderOptions};

/// 应用初始化：加载 .env 并设置日志
pub fn app_init(interactive: bool) -> anyhow::Result<()> {
    dotenv().ok();
    setup_logging(interactive)?;
    info!("应用初始化完成");
    Ok(())
}

/// 看板模式下从标准输入读取的控制指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Trigger,
    RevealKill,
    /// 输入的密钥，随后立即确认停机
    Secret(String),
    Cancel,
    Quit,
    Redraw,
}

/// 解析一行输入。处于停机确认阶段时，除 `c` 以外的整行都视为密钥。
pub fn parse_command(line: &str, kill_confirm: bool) -> ControlCommand {
    let input = line.trim();
    if kill_confirm {
        return match input {
            "c" => ControlCommand::Cancel,
            _ => ControlCommand::Secret(input.to_string()),
        };
    }
    match input {
        "t" => ControlCommand::Trigger,
        "k" => ControlCommand::RevealKill,
        "q" => ControlCommand::Quit,
        _ => ControlCommand::Redraw,
    }
}

enum ActionOutcome {
    Trigger(DashboardResult<String>),
    Kill(DashboardResult<String>),
}

fn render_options(config: &DashboardConfig) -> RenderOptions {
    RenderOptions {
        color: config.color,
        max_positions: config.max_positions,
    }
}

/// 按子命令运行
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config(DashboardConfig::from_env()?)?;
    info!(
        "api={} ws={} refresh={:?}",
        config.api_url, config.ws_url, config.refresh_interval
    );
    match cli.command() {
        Command::Watch => run_watch(config).await,
        Command::Snapshot => run_snapshot(config).await,
        Command::Health => run_health(config).await,
        Command::Trigger => run_trigger(config).await,
        Command::Kill { secret } => run_kill(config, secret).await,
    }
}

async fn run_snapshot(config: DashboardConfig) -> anyhow::Result<()> {
    let api: Arc<dyn DashboardApi> = Arc::new(ApiClient::new(config.api_url.clone()));
    let push = PushChannel::websocket(config.ws_url.clone());
    let sync = DashboardSynchronizer::new(api, push, config.refresh_interval);

    let result = sync.refresh().await;
    let page = render_dashboard(&sync.snapshot(), &ControlsPanel::new(), &render_options(&config));
    print!("{}", page);
    result.map_err(|e| anyhow!("刷新失败: {}", e))
}

async fn run_health(config: DashboardConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_url);
    let health = api.health().await?;
    println!(
        "{} (version {}, {})",
        health.status,
        health.version,
        health.timestamp.to_rfc3339()
    );
    Ok(())
}

async fn run_trigger(config: DashboardConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_url);
    let mut controls = ControlsPanel::new();
    controls.trigger(&api).await;
    report_control_message(&controls)
}

async fn run_kill(config: DashboardConfig, secret: Option<String>) -> anyhow::Result<()> {
    let api = ApiClient::new(config.api_url);
    let secret = secret
        .or_else(|| env_opt("DASHBOARD_KILL_SECRET"))
        .unwrap_or_default();
    let mut controls = ControlsPanel::new();
    controls.reveal_kill();
    controls.set_secret(secret);
    controls.confirm_kill(&api).await;
    report_control_message(&controls)
}

/// 打印控制面板消息；失败消息转为非零退出
fn report_control_message(controls: &ControlsPanel) -> anyhow::Result<()> {
    let message = controls.message().unwrap_or_default();
    println!("{}", message);
    if message.starts_with('✅') || message.starts_with('🛑') {
        Ok(())
    } else {
        Err(anyhow!("{}", message))
    }
}

fn redraw(state: &DashboardState, controls: &ControlsPanel, opts: &RenderOptions) -> anyhow::Result<()> {
    let page = render_dashboard(state, controls, opts);
    let mut stdout = std::io::stdout();
    execute!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    // raw 模式下换行不会回到行首
    write!(stdout, "{}", page.replace('\n', "\r\n"))?;
    write!(stdout, "[t] trigger  [k] kill  [c] cancel  [q] quit\r\n")?;
    stdout.flush()?;
    Ok(())
}

fn handle_command(
    command: ControlCommand,
    controls: &mut ControlsPanel,
    api: &Arc<dyn DashboardApi>,
    outcome_tx: &mpsc::UnboundedSender<ActionOutcome>,
) -> bool {
    match command {
        ControlCommand::Quit => return false,
        ControlCommand::Trigger => {
            if controls.begin_trigger() {
                let api = Arc::clone(api);
                let tx = outcome_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(ActionOutcome::Trigger(api.trigger().await));
                });
            }
        }
        ControlCommand::RevealKill => controls.reveal_kill(),
        ControlCommand::Cancel => controls.cancel_kill(),
        ControlCommand::Secret(secret) => {
            controls.set_secret(secret);
            if let Some(secret) = controls.prepare_kill() {
                let api = Arc::clone(api);
                let tx = outcome_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(ActionOutcome::Kill(api.kill(&secret).await));
                });
            }
        }
        ControlCommand::Redraw => {}
    }
    true
}

/// 处理标准输入的一个字节；返回 false 表示退出看板
fn handle_input(
    byte: u8,
    editor: &mut LineEditor,
    controls: &mut ControlsPanel,
    api: &Arc<dyn DashboardApi>,
    outcome_tx: &mpsc::UnboundedSender<ActionOutcome>,
) -> bool {
    let secret_entry = controls.is_kill_confirm();
    match editor.feed(byte, secret_entry) {
        Some(InputEvent::Line(line)) => {
            let command = parse_command(&line, secret_entry);
            handle_command(command, controls, api, outcome_tx)
        }
        Some(InputEvent::Edited) => {
            controls.set_secret(editor.pending());
            true
        }
        Some(InputEvent::Interrupt) => handle_command(ControlCommand::Cancel, controls, api, outcome_tx),
        None => true,
    }
}

/// 等待退出信号，返回信号名
async fn wait_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::quit()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint), Ok(mut sigquit)) => {
                return tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                    _ = sigquit.recv() => "SIGQUIT",
                };
            }
            _ => error!("注册退出信号失败，只监听 Ctrl-C"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => "CTRL+C",
        Err(e) => {
            error!("监听 Ctrl-C 失败: {}", e);
            std::future::pending().await
        }
    }
}

/// 实时看板：状态变化即重绘，标准输入驱动控制面板，退出信号或 `q` 退出
async fn run_watch(config: DashboardConfig) -> anyhow::Result<()> {
    let opts = render_options(&config);
    let api: Arc<dyn DashboardApi> = Arc::new(ApiClient::new(config.api_url.clone()));
    let push = PushChannel::websocket(config.ws_url.clone());
    let sync = Arc::new(Mutex::new(DashboardSynchronizer::new(
        Arc::clone(&api),
        push,
        config.refresh_interval,
    )));

    let mut state_rx = {
        let mut guard = sync.lock().await;
        let rx = guard.subscribe_state();
        guard.start();
        rx
    };

    let mut controls = ControlsPanel::new();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<ActionOutcome>();
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut editor = LineEditor::default();
    let mut entry_mode = SecretEntryMode::default();
    let mut stdin_open = true;

    // 信号监听只建立一次，重绘期间到达的信号不会丢
    let shutdown_signal = wait_shutdown_signal();
    tokio::pin!(shutdown_signal);

    let initial = state_rx.borrow_and_update().clone();
    redraw(&initial, &controls, &opts)?;

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    warn!("状态通道已关闭");
                    break;
                }
            }
            byte = stdin.read_u8(), if stdin_open => match byte {
                Ok(byte) => {
                    if !handle_input(byte, &mut editor, &mut controls, &api, &outcome_tx) {
                        info!("用户退出看板");
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => stdin_open = false,
                Err(e) => {
                    error!("读取标准输入失败: {}", e);
                    stdin_open = false;
                }
            },
            Some(outcome) = outcome_rx.recv() => match outcome {
                ActionOutcome::Trigger(result) => controls.finish_trigger(result),
                ActionOutcome::Kill(result) => controls.finish_kill(result),
            },
            name = &mut shutdown_signal => {
                info!("接收到 {} 信号，开始优雅关闭...", name);
                break;
            }
        }
        entry_mode.set(controls.is_kill_confirm())?;
        let state = state_rx.borrow_and_update().clone();
        redraw(&state, &controls, &opts)?;
    }
    drop(entry_mode);

    let manager = ShutdownManager::new(ShutdownConfig::default());
    let hook_sync = Arc::clone(&sync);
    manager
        .register_shutdown_hook("dashboard_sync", move || {
            let sync = Arc::clone(&hook_sync);
            async move {
                let mut sync = sync.lock().await;
                sync.shutdown();
                sync.wait_stopped().await;
                Ok(())
            }
        })
        .await;
    manager.shutdown().await?;
    info!("看板已退出");
    Ok(())
}
