//! 整页组合：页眉、各面板、页脚

use crate::sync::DashboardState;
use crate::views::controls::ControlsPanel;
use crate::views::format::{format_clock, paint, RenderOptions, Tone};
use crate::views::{balance, cycles, positions, status, trades};

pub const BOT_NAME: &str = "Survival Bot";
const TAGLINE: &str = "Autonomous Crypto Trading";
const FOOTER: &str = "Survival Trading Bot v1.0 — Built with Rust — Not financial advice";

pub fn render_header(state: &DashboardState, opts: &RenderOptions) -> String {
    let mut right = Vec::new();
    if let Some(at) = &state.last_updated {
        right.push(paint(&format!("Updated {}", format_clock(at)), Tone::Muted, opts.color));
    }
    right.push(if state.connected {
        paint("● Connected", Tone::Gain, opts.color)
    } else {
        paint("● Disconnected", Tone::Loss, opts.color)
    });
    format!(
        "{}  {}    {}",
        paint(BOT_NAME, Tone::Accent, opts.color),
        paint(TAGLINE, Tone::Muted, opts.color),
        right.join("  ")
    )
}

pub fn render_footer(opts: &RenderOptions) -> String {
    paint(FOOTER, Tone::Muted, opts.color)
}

/// 渲染整个看板
pub fn render_dashboard(
    state: &DashboardState,
    controls: &ControlsPanel,
    opts: &RenderOptions,
) -> String {
    let panels = [
        status::render(state.status.as_ref(), state.loading, opts),
        positions::render(&state.positions, state.loading, opts),
        controls.render(opts),
        balance::render(&state.balance, state.loading, opts),
        trades::render(&state.trades, state.loading, opts),
        cycles::render(&state.cycles, state.loading, opts),
    ];

    let mut out = render_header(state, opts);
    out.push_str("\n\n");
    for panel in panels.iter() {
        out.push_str(&panel.render(opts.color));
        out.push('\n');
    }
    out.push_str(&render_footer(opts));
    out.push('\n');
    out
}
