//! 余额走势
//!
//! API 按时间倒序返回，这里先反转为时间正序再画图。

use chrono::{DateTime, Utc};

use crate::api::models::BalanceSnapshot;
use crate::views::format::{format_short, format_signed_usd, format_usd, paint, RenderOptions, Tone};
use crate::views::panel::Panel;

const TITLE: &str = "Balance History";
const EMPTY_TEXT: &str = "No data yet — waiting for first cycle";
const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub recorded_at: DateTime<Utc>,
    pub balance: f64,
    pub pnl: f64,
}

/// 时间正序的图表点
pub fn chart_points(history: &[BalanceSnapshot]) -> Vec<ChartPoint> {
    history
        .iter()
        .rev()
        .map(|s| ChartPoint {
            recorded_at: s.recorded_at,
            balance: s.balance_usdc,
            pnl: s.total_pnl,
        })
        .collect()
}

/// 纵轴范围：上下各留 10% 余量，下限不低于 0，上限为 0 时取 100
pub fn y_domain(points: &[ChartPoint]) -> (f64, f64) {
    let min = points.iter().map(|p| p.balance).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.balance)
        .fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 100.0);
    }
    let range = max - min;
    let lo = (min - range * 0.1).max(0.0);
    let hi = max + range * 0.1;
    let hi = if hi == 0.0 { 100.0 } else { hi };
    (lo, hi)
}

pub fn sparkline(values: &[f64], lo: f64, hi: f64) -> String {
    let span = hi - lo;
    values
        .iter()
        .map(|v| {
            if span <= 0.0 {
                return BARS[BARS.len() / 2];
            }
            let level = ((v - lo) / span * (BARS.len() - 1) as f64).round();
            BARS[level.clamp(0.0, (BARS.len() - 1) as f64) as usize]
        })
        .collect()
}

pub fn render(history: &[BalanceSnapshot], loading: bool, opts: &RenderOptions) -> Panel {
    if loading {
        return Panel::skeleton(TITLE, 4);
    }
    let points = chart_points(history);
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Panel::new(TITLE).line(paint(EMPTY_TEXT, Tone::Muted, opts.color)),
    };

    let (lo, hi) = y_domain(&points);
    let values: Vec<f64> = points.iter().map(|p| p.balance).collect();
    let change = last.balance - first.balance;

    Panel::new(TITLE)
        .line(format!("{} {:.0}", paint("$", Tone::Muted, opts.color), hi))
        .line(paint(&sparkline(&values, lo, hi), Tone::Accent, opts.color))
        .line(format!("{} {:.0}", paint("$", Tone::Muted, opts.color), lo))
        .line(paint(
            &format!(
                "{}  →  {}",
                format_short(&first.recorded_at),
                format_short(&last.recorded_at)
            ),
            Tone::Muted,
            opts.color,
        ))
        .line(format!(
            "Latest {}  ({} over {} points, P&L {})",
            format_usd(last.balance),
            paint(&format_signed_usd(change, 2), Tone::of(change), opts.color),
            points.len(),
            paint(&format_signed_usd(last.pnl, 4), Tone::of(last.pnl), opts.color),
        ))
}
