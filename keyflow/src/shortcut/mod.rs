//! 全局快捷键管理模块
//!
//! 提供快捷键定义、偏好叠加、加速键翻译与系统注册生命周期管理
//!
//! # 功能
//!
//! - 定义表：应用全部快捷键的只读静态描述
//! - 偏好叠加：把用户偏好与定义默认值合并为运行时映射
//! - 加速键翻译：语义按键 token → 系统加速键字符串（含平台修正）
//! - 注册管理：注销 → 重建 → 注册 → 跟踪 → 广播 的完整流程
//!
//! # 使用方法
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyflow::platform::GlobalHotkeyBackend;
//! use keyflow::shortcut::{DefinitionTable, ShortcutManager, handler};
//! use keyflow::state::{PreferenceManager, SharedPreferences, watch_shortcuts};
//!
//! let backend = Arc::new(GlobalHotkeyBackend::new()?);
//! let manager = Arc::new(ShortcutManager::new(
//!     DefinitionTable::builtin(),
//!     backend,
//!     windows,
//! ));
//!
//! manager.register_handler("show_app", handler(|window| async move {
//!     // 显示主窗口
//!     Ok(())
//! }));
//!
//! // 加载持久化偏好并建立订阅，偏好变更自动触发重新注册
//! let prefs = Arc::new(SharedPreferences::new(PreferenceManager::load()?));
//! manager.apply_preferences(&prefs.get());
//! watch_shortcuts(&prefs, Arc::clone(&manager));
//! ```

mod accelerator;
mod broadcast;
mod definitions;
mod error;
mod handlers;
mod hydrate;
mod manager;
mod quirks;

pub use accelerator::{is_modifier, translate};
pub use broadcast::{SHORTCUTS_UPDATED_EVENT, ShortcutBroadcaster};
pub use definitions::{DefinitionTable, ShortcutDefinition, ShortcutScope};
pub use error::{ShortcutError, ShortcutResult};
pub use handlers::{HandlerFuture, HandlerRegistry, ShortcutHandler, handler};
pub use hydrate::{
    HydratedMap, HydratedShortcut, PreferenceSnapshot, ShortcutPreference, hydrate,
};
pub use manager::{PassSummary, RegisteredAccelerator, RegistrationPhase, ShortcutManager};
pub use quirks::numpad_variant;
