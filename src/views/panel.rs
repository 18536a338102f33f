use crate::views::format::{paint, Tone};

/// 一块带标题的文本面板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub lines: Vec<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// 加载中的占位骨架
    pub fn skeleton(title: impl Into<String>, rows: usize) -> Self {
        let mut panel = Self::new(title);
        for _ in 0..rows.max(1) {
            panel.push("░░░░░░░░░░░░░░░░░░░░");
        }
        panel
    }

    pub fn render(&self, color: bool) -> String {
        let width = self.title.chars().count().max(24);
        let mut out = String::new();
        out.push_str(&paint(&self.title, Tone::Accent, color));
        out.push('\n');
        out.push_str(&paint(&"─".repeat(width), Tone::Muted, color));
        out.push('\n');
        for line in &self.lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// 全部行按换行拼接
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
