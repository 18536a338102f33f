//! 纯渲染视图：输入数据与加载标记，输出文本面板

pub mod balance;
pub mod controls;
pub mod cycles;
pub mod format;
pub mod frame;
pub mod panel;
pub mod positions;
pub mod status;
pub mod trades;

pub use controls::ControlsPanel;
pub use format::RenderOptions;
pub use frame::render_dashboard;
pub use panel::Panel;
