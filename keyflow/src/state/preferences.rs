//! 快捷键偏好存储模块
//!
//! 提供偏好快照的加载、保存与进程内共享
//!
//! # 存储位置
//!
//! - Windows: `%APPDATA%/keyflow/shortcuts.json`
//! - macOS: `~/Library/Application Support/keyflow/shortcuts.json`
//! - Linux: `~/.config/keyflow/shortcuts.json`
//!
//! # 使用示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyflow::state::{PreferenceManager, SharedPreferences, watch_shortcuts};
//!
//! // 加载持久化偏好
//! let snapshot = PreferenceManager::load()?;
//! let prefs = Arc::new(SharedPreferences::new(snapshot));
//!
//! // 订阅变更，自动触发重新注册
//! watch_shortcuts(&prefs, Arc::clone(&manager));
//!
//! // 设置界面更新偏好
//! prefs.set_shortcut("zoom_in", ShortcutPreference::with_key(&["Alt", "Z"]));
//! PreferenceManager::save(&prefs.get())?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::shortcut::{PreferenceSnapshot, ShortcutManager, ShortcutPreference};

/// 偏好存储错误类型
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 路径错误
    #[error("Path error: {0}")]
    Path(String),
}

/// 偏好存储结果类型
pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// 偏好持久化管理器
///
/// 提供偏好快照的加载、保存和路径管理
pub struct PreferenceManager;

impl PreferenceManager {
    /// 从默认路径加载偏好快照
    ///
    /// 文件不存在时返回空快照
    pub fn load() -> PreferenceResult<PreferenceSnapshot> {
        Self::load_from(&Self::preference_path()?)
    }

    /// 从指定路径加载偏好快照
    pub fn load_from(path: &Path) -> PreferenceResult<PreferenceSnapshot> {
        tracing::debug!(path = %path.display(), "Loading shortcut preferences");

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let snapshot: PreferenceSnapshot = serde_json::from_str(&content)?;
            tracing::info!(
                path = %path.display(),
                entries = snapshot.len(),
                "Shortcut preferences loaded"
            );
            Ok(snapshot)
        } else {
            tracing::info!("Preference file not found, using empty snapshot");
            Ok(PreferenceSnapshot::new())
        }
    }

    /// 保存偏好快照到默认路径
    pub fn save(snapshot: &PreferenceSnapshot) -> PreferenceResult<()> {
        Self::save_to(&Self::preference_path()?, snapshot)
    }

    /// 保存偏好快照到指定路径
    pub fn save_to(path: &Path, snapshot: &PreferenceSnapshot) -> PreferenceResult<()> {
        tracing::debug!(path = %path.display(), "Saving shortcut preferences");

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Shortcut preferences saved");
        Ok(())
    }

    /// 偏好文件路径
    pub fn preference_path() -> PreferenceResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PreferenceError::Path("No config directory available".to_string()))?;
        Ok(config_dir.join("keyflow").join("shortcuts.json"))
    }

    /// 检查偏好文件是否存在
    pub fn exists() -> PreferenceResult<bool> {
        Ok(Self::preference_path()?.exists())
    }
}

/// 偏好变更监听器
pub type PreferenceListener = Box<dyn Fn(&PreferenceSnapshot) + Send + Sync>;

/// 进程内共享的偏好快照
///
/// 使用 ArcSwap 实现无锁读取；每次更新整体替换快照并通知全部订阅者
pub struct SharedPreferences {
    snapshot: ArcSwap<PreferenceSnapshot>,
    listeners: Mutex<Vec<(u64, PreferenceListener)>>,
    next_id: AtomicU64,
}

impl SharedPreferences {
    /// 创建共享偏好
    pub fn new(snapshot: PreferenceSnapshot) -> Self {
        Self {
            snapshot: ArcSwap::new(Arc::new(snapshot)),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// 获取当前快照
    pub fn get(&self) -> Arc<PreferenceSnapshot> {
        self.snapshot.load_full()
    }

    /// 整体替换快照并通知订阅者
    pub fn update(&self, snapshot: PreferenceSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot.store(Arc::clone(&snapshot));
        self.notify(&snapshot);
    }

    /// 更新单条快捷键偏好并通知订阅者
    pub fn set_shortcut(&self, name: impl Into<String>, pref: ShortcutPreference) {
        let mut snapshot = (*self.snapshot.load_full()).clone();
        snapshot.insert(name.into(), pref);
        self.update(snapshot);
    }

    /// 订阅快照变更
    ///
    /// 返回订阅 id，用于 [`Self::unsubscribe`]
    pub fn subscribe(&self, listener: PreferenceListener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.lock_listeners().push((id, listener));
        id
    }

    /// 取消订阅
    ///
    /// 返回是否存在该订阅
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn notify(&self, snapshot: &PreferenceSnapshot) {
        for (_, listener) in self.lock_listeners().iter() {
            listener(snapshot);
        }
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(u64, PreferenceListener)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for SharedPreferences {
    fn default() -> Self {
        Self::new(PreferenceSnapshot::new())
    }
}

/// 把快捷键管理器绑定到偏好变更
///
/// 每次快照更新都会触发一次完整的注册流程；返回订阅 id
pub fn watch_shortcuts(prefs: &SharedPreferences, manager: Arc<ShortcutManager>) -> u64 {
    prefs.subscribe(Box::new(move |snapshot| {
        manager.apply_preferences(snapshot);
    }))
}
