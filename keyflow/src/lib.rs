//! KeyFlow — 桌面应用的全局快捷键管理
//!
//! 以声明式定义表 + 用户偏好叠加的方式管理系统级全局快捷键，
//! 保证注册生命周期内不泄漏任何系统级热键注册。

/// Global shortcut management
pub mod shortcut;

/// Platform integration (OS hotkey facility, windows)
pub mod platform;

/// Preference persistence and sharing
pub mod state;

/// Utility modules
pub mod utils;
