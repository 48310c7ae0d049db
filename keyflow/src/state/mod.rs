//! 应用状态模块
//!
//! 快捷键偏好的持久化与进程内共享

mod preferences;

pub use preferences::{
    PreferenceError, PreferenceListener, PreferenceManager, PreferenceResult, SharedPreferences,
    watch_shortcuts,
};
