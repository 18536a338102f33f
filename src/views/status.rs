use crate::api::models::StatusSnapshot;
use crate::views::format::{format_datetime, format_signed_usd, format_usd, paint, RenderOptions, Tone};
use crate::views::panel::Panel;

const TITLE: &str = "Bot Status";

pub fn render(status: Option<&StatusSnapshot>, loading: bool, opts: &RenderOptions) -> Panel {
    if loading {
        return Panel::skeleton(TITLE, 3);
    }
    let status = match status {
        Some(status) => status,
        None => return Panel::new(TITLE).line("No status available"),
    };

    let badge = if status.is_alive {
        paint("● ALIVE", Tone::Gain, opts.color)
    } else {
        paint("● DEAD", Tone::Loss, opts.color)
    };
    let pnl = paint(
        &format_signed_usd(status.total_pnl, 4),
        Tone::of(status.total_pnl),
        opts.color,
    );

    let mut panel = Panel::new(TITLE)
        .line(badge)
        .line(format!("Balance (USDC)  {}", format_usd(status.balance_usdc)))
        .line(format!(
            "Total P&L  {}    Win Rate  {:.1}%",
            pnl, status.win_rate
        ))
        .line(format!(
            "Positions  {}/{}    Total Trades  {}",
            status.open_positions, opts.max_positions, status.total_trades
        ))
        .line(format!(
            "Cycles  {}    Uptime  {:.1}h",
            status.total_cycles, status.uptime_hours
        ));
    if let Some(at) = &status.last_cycle_at {
        panel.push(paint(
            &format!("Last cycle: {}", format_datetime(at)),
            Tone::Muted,
            opts.color,
        ));
    }
    panel
}
