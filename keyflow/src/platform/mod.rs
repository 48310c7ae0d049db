//! 平台集成模块
//!
//! 快捷键子系统与宿主环境的三个接缝：
//!
//! - [`HotkeyBackend`] — 系统全局热键设施
//! - [`GlobalHotkeyBackend`] — 基于 `global-hotkey` 的生产实现
//! - [`AppWindow`] / [`WindowProvider`] — 宿主应用的窗口体系

mod backend;
mod global_backend;
mod window;

pub use backend::{BackendError, BackendResult, HotkeyBackend};
pub use global_backend::{GlobalHotkeyBackend, parse_accelerator};
pub use window::{AppWindow, WindowProvider, WindowRef, resolve_target_window};
