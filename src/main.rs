use clap::Parser;
use tracing::error;

use survival_dashboard::app::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // 看板独占终端，日志改为落盘
    app::app_init(cli.command() == Command::Watch)?;

    if let Err(e) = app::run(cli).await {
        error!("运行失败: {}", e);
        return Err(e);
    }
    Ok(())
}
