use crate::api::models::{TradeRecord, TradeSide};
use crate::views::format::{
    format_price, format_qty, format_short, format_usd, pair_symbol, paint, RenderOptions, Tone,
};
use crate::views::panel::Panel;

const TITLE: &str = "Recent Trades";

pub fn render(trades: &[TradeRecord], loading: bool, opts: &RenderOptions) -> Panel {
    if loading {
        return Panel::skeleton(TITLE, 5);
    }
    let mut panel = Panel::new(TITLE);
    if trades.is_empty() {
        panel.push(paint("No trades yet", Tone::Muted, opts.color));
        return panel;
    }

    panel.push(paint(
        &format!(
            "{:<14} {:<10} {:<5} {:>14} {:>12} {:>10}",
            "TIME", "SYMBOL", "SIDE", "PRICE", "QTY", "USDC"
        ),
        Tone::Muted,
        opts.color,
    ));
    for trade in trades {
        let side_tone = match trade.side {
            TradeSide::Buy => Tone::Gain,
            _ => Tone::Loss,
        };
        // 先补齐宽度再上色，避免转义序列影响对齐
        let side = paint(&format!("{:<5}", trade.side.to_string()), side_tone, opts.color);
        let mut line = format!(
            "{:<14} {:<10} {} {:>14} {:>12} {:>10}",
            format_short(&trade.executed_at),
            pair_symbol(&trade.symbol),
            side,
            format_price(trade.price),
            format_qty(trade.quantity),
            format_usd(trade.usdc_amount)
        );
        if let Some(fee) = trade.commission {
            line.push_str(&paint(&format!("  fee {:.6}", fee), Tone::Muted, opts.color));
        }
        panel.push(line);
    }
    panel
}
