use crate::api::models::{CycleAction, CycleLogEntry};
use crate::views::format::{format_datetime, format_usd, paint, truncate, RenderOptions, Tone};
use crate::views::panel::Panel;

const TITLE: &str = "Decision Log";
const REASONING_MAX_CHARS: usize = 160;

fn action_tone(action: &CycleAction) -> Tone {
    match action {
        CycleAction::Buy => Tone::Gain,
        CycleAction::Sell | CycleAction::Error => Tone::Loss,
        CycleAction::Hold | CycleAction::Other(_) => Tone::Warn,
    }
}

pub fn render(cycles: &[CycleLogEntry], loading: bool, opts: &RenderOptions) -> Panel {
    if loading {
        return Panel::skeleton(TITLE, 5);
    }
    let mut panel = Panel::new(TITLE);
    if cycles.is_empty() {
        panel.push(paint("No cycles yet", Tone::Muted, opts.color));
        return panel;
    }

    for cycle in cycles {
        let mut head = vec![paint(
            &format!("[{}]", cycle.action),
            action_tone(&cycle.action),
            opts.color,
        )];
        if let Some(symbol) = &cycle.symbol {
            head.push(symbol.clone());
        }
        if let Some(confidence) = cycle.confidence {
            head.push(format!("{}% confidence", confidence));
        }
        if let Some(fear_greed) = cycle.fear_greed {
            head.push(format!("F&G: {}", fear_greed));
        }
        head.push(format_usd(cycle.balance_usdc));
        panel.push(head.join("  "));

        if let Some(reasoning) = &cycle.reasoning {
            panel.push(format!("  {}", truncate(reasoning, REASONING_MAX_CHARS)));
        }
        if let Some(error) = &cycle.error {
            panel.push(paint(&format!("  ⚠️ {}", error), Tone::Loss, opts.color));
        }

        let mut foot = format!("  #{} {}", cycle.cycle_number, format_datetime(&cycle.created_at));
        if let Some(ms) = cycle.execution_ms {
            foot.push_str(&format!("  {}ms", ms));
        }
        panel.push(paint(&foot, Tone::Muted, opts.color));
    }
    panel
}
