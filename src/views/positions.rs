use crate::api::models::Position;
use crate::views::format::{
    format_price, format_qty, format_signed_pct, pair_symbol, paint, RenderOptions, Tone,
};
use crate::views::panel::Panel;

const TITLE: &str = "Open Positions";

pub fn render(positions: &[Position], loading: bool, opts: &RenderOptions) -> Panel {
    if loading {
        return Panel::skeleton(TITLE, 2);
    }
    let mut panel = Panel::new(TITLE);
    if positions.is_empty() {
        panel.push(paint("No open positions", Tone::Muted, opts.color));
        return panel;
    }

    for position in positions {
        let pnl_pct = position.pnl_pct();
        let tone = Tone::of(pnl_pct);
        panel.push(format!(
            "{:<12} {} {}",
            pair_symbol(&position.symbol),
            position.side,
            paint(&format_signed_pct(pnl_pct), tone, opts.color)
        ));
        panel.push(format!(
            "  Entry {}  Current {}  Qty {}",
            format_price(position.entry_price),
            paint(&format_price(position.mark_price()), tone, opts.color),
            format_qty(position.quantity)
        ));

        let mut limits = Vec::new();
        if let Some(sl) = position.stop_loss {
            limits.push(format!("SL: {}", format_price(sl)));
        }
        if let Some(tp) = position.take_profit {
            limits.push(format!("TP: {}", format_price(tp)));
        }
        if !limits.is_empty() {
            panel.push(paint(
                &format!("  {}", limits.join("  ")),
                Tone::Muted,
                opts.color,
            ));
        }
    }
    panel
}
