//! 快捷键注册管理器
//!
//! 驱动 `Idle → Unregistering → Rebuilding → Tracking → Broadcasting → Idle`
//! 的注册流程：先无条件注销所有已跟踪的加速键，再按当前偏好重建并逐个
//! 注册，只跟踪系统实际接受的加速键，最后把新快照广播给所有窗口。
//!
//! 流程串行化：一次注册流程完整结束前不会开始下一次，保证任意时刻
//! 跟踪集合恰好对应当前合并映射。单个加速键的失败只影响它自己。
//!
//! # 使用示例
//!
//! ```ignore
//! use std::sync::Arc;
//! use keyflow::shortcut::{DefinitionTable, ShortcutManager, handler};
//!
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
//! // 偏好变更时重新走一遍注册流程
//! manager.apply_preferences(&prefs.get());
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use serde::Serialize;
use tokio::runtime::Handle;

use super::accelerator;
use super::broadcast::ShortcutBroadcaster;
use super::definitions::DefinitionTable;
use super::error::ShortcutError;
use super::handlers::{HandlerRegistry, ShortcutHandler};
use super::hydrate::{HydratedMap, PreferenceSnapshot, hydrate};
use super::quirks;
use crate::platform::{HotkeyBackend, WindowProvider, WindowRef, resolve_target_window};

/// 注册流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegistrationPhase {
    /// 空闲
    Idle,
    /// 注销上一轮的全部加速键
    Unregistering,
    /// 合并偏好并逐个注册加速键
    Rebuilding,
    /// 记录系统接受的加速键
    Tracking,
    /// 向窗口广播新快照
    Broadcasting,
}

impl RegistrationPhase {
    /// 阶段名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Unregistering => "unregistering",
            Self::Rebuilding => "rebuilding",
            Self::Tracking => "tracking",
            Self::Broadcasting => "broadcasting",
        }
    }
}

/// 已注册的加速键及其归属快捷键
///
/// 一个快捷键可拥有多个加速键（平台修正变体）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredAccelerator {
    /// 系统加速键字符串
    pub accelerator: String,
    /// 归属快捷键名称
    pub shortcut: String,
}

/// 单次注册流程的结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassSummary {
    /// 系统接受并被跟踪的加速键数量
    pub registered: usize,
    /// 因翻译失败或系统拒绝而跳过的加速键数量
    pub skipped: usize,
}

/// 快捷键注册管理器
///
/// 持有合并映射、跟踪集合与处理器注册表，生命周期由宿主显式控制：
/// 构建后通过 [`Self::apply_preferences`] 驱动，退出前调用
/// [`Self::shutdown`] 释放全部系统注册。
pub struct ShortcutManager {
    table: DefinitionTable,
    backend: Arc<dyn HotkeyBackend>,
    windows: Arc<dyn WindowProvider>,
    broadcaster: ShortcutBroadcaster,
    handlers: HandlerRegistry,
    hydrated: ArcSwap<HydratedMap>,
    tracked: Mutex<Vec<RegisteredAccelerator>>,
    phase: ArcSwap<RegistrationPhase>,
    // 串行化注册流程
    pass_lock: Mutex<()>,
    // 构建时所在的运行时句柄；按键事件常来自运行时之外的原生事件循环线程
    runtime: Option<Handle>,
}

impl ShortcutManager {
    /// 创建管理器
    ///
    /// 初始合并映射由空偏好快照生成；尚未进行任何系统注册。
    /// 如果当前线程处于 tokio 运行时内，捕获其句柄供后续派发使用：
    /// 原生热键事件循环线程没有运行时上下文。
    pub fn new(
        table: DefinitionTable,
        backend: Arc<dyn HotkeyBackend>,
        windows: Arc<dyn WindowProvider>,
    ) -> Self {
        let initial = hydrate(&table, &PreferenceSnapshot::new());

        Self {
            broadcaster: ShortcutBroadcaster::new(Arc::clone(&windows)),
            table,
            backend,
            windows,
            handlers: HandlerRegistry::new(),
            hydrated: ArcSwap::new(Arc::new(initial)),
            tracked: Mutex::new(Vec::new()),
            phase: ArcSwap::new(Arc::new(RegistrationPhase::Idle)),
            pass_lock: Mutex::new(()),
            runtime: Handle::try_current().ok(),
        }
    }

    /// 定义表
    pub fn definitions(&self) -> &DefinitionTable {
        &self.table
    }

    /// 当前合并映射的只读快照
    ///
    /// 供设置界面等消费方渲染当前绑定
    pub fn hydrated(&self) -> Arc<HydratedMap> {
        self.hydrated.load_full()
    }

    /// 当前注册流程阶段
    pub fn phase(&self) -> RegistrationPhase {
        **self.phase.load()
    }

    /// 当前跟踪的加速键集合
    pub fn tracked_accelerators(&self) -> Vec<RegisteredAccelerator> {
        self.lock_tracked().clone()
    }

    /// 注册快捷键处理器
    ///
    /// 同名重复注册按后写覆盖处理（由注册表记录警告）。
    /// 处理器绑定与系统注册解耦，重新绑定按键无需重新注册处理器。
    pub fn register_handler(&self, name: impl Into<String>, callback: ShortcutHandler) {
        let name = name.into();
        if !self.table.contains(&name) {
            let err = ShortcutError::UnknownShortcut(name.clone());
            tracing::warn!(error = %err, "Registering handler for undefined shortcut");
        }
        self.handlers.register(name, callback);
    }

    /// 按偏好快照执行一次完整注册流程
    ///
    /// 注销上一轮全部加速键 → 重新合并 → 对每个启用的、主进程作用域的、
    /// 按键非空的快捷键做翻译 + 平台修正并逐个注册 → 跟踪成功项 →
    /// 广播新快照。单个加速键被拒绝或翻译失败只记录警告并跳过，
    /// 不影响同一轮中的其余注册。
    pub fn apply_preferences(&self, prefs: &PreferenceSnapshot) -> PassSummary {
        let _pass = self.lock_pass();

        self.set_phase(RegistrationPhase::Unregistering);
        self.unregister_all();

        self.set_phase(RegistrationPhase::Rebuilding);
        let hydrated = hydrate(&self.table, prefs);

        let mut summary = PassSummary::default();
        let mut tracked = Vec::new();

        for def in self.table.iter() {
            let Some(entry) = hydrated.get(&def.name) else {
                continue;
            };
            if !entry.enabled || !entry.scope.is_main() || entry.key.is_empty() {
                continue;
            }

            let primary = match accelerator::translate(&entry.key) {
                Ok(accel) => accel,
                Err(e) => {
                    tracing::warn!(
                        shortcut = %def.name,
                        error = %e,
                        "Skipping shortcut with untranslatable key combination"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            let mut accelerators = vec![primary];
            if let Some(extra) = quirks::numpad_variant(&def.name, &entry.key, &def.default_key) {
                accelerators.push(extra);
            }

            for accel in accelerators {
                match self.backend.register(&accel) {
                    Ok(()) => {
                        tracing::info!(shortcut = %def.name, accelerator = %accel, "Registered shortcut");
                        tracked.push(RegisteredAccelerator {
                            accelerator: accel,
                            shortcut: def.name.clone(),
                        });
                        summary.registered += 1;
                    }
                    Err(e) => {
                        match ShortcutError::from(e) {
                            err @ ShortcutError::RegistrationRejected { .. } => {
                                tracing::warn!(shortcut = %def.name, error = %err, "Accelerator rejected by OS, skipping");
                            }
                            err => {
                                tracing::warn!(shortcut = %def.name, error = %err, "Accelerator registration failed, skipping");
                            }
                        }
                        summary.skipped += 1;
                    }
                }
            }
        }

        self.set_phase(RegistrationPhase::Tracking);
        *self.lock_tracked() = tracked;
        self.hydrated.store(Arc::new(hydrated));

        self.set_phase(RegistrationPhase::Broadcasting);
        self.broadcaster.broadcast(&self.hydrated.load(), &self.table);

        self.set_phase(RegistrationPhase::Idle);
        tracing::info!(
            registered = summary.registered,
            skipped = summary.skipped,
            "Shortcut registration pass complete"
        );
        summary
    }

    /// 注销全部已跟踪的加速键
    ///
    /// 进程退出前必须调用，否则系统级注册会在进程结束后残留
    pub fn shutdown(&self) {
        let _pass = self.lock_pass();

        self.set_phase(RegistrationPhase::Unregistering);
        self.unregister_all();
        self.set_phase(RegistrationPhase::Idle);

        tracing::info!("Shortcut manager shut down, all accelerators released");
    }

    /// 处理一次系统按键事件
    ///
    /// 按加速键回查归属快捷键；未跟踪的加速键（上一轮残留事件）忽略
    pub fn handle_key_event(&self, accelerator: &str, source: Option<WindowRef>) {
        let owner = self
            .lock_tracked()
            .iter()
            .find(|r| r.accelerator == accelerator)
            .map(|r| r.shortcut.clone());

        let Some(name) = owner else {
            tracing::debug!(accelerator = %accelerator, "Key event for untracked accelerator ignored");
            return;
        };

        self.dispatch(&name, source);
    }

    /// 触发快捷键处理器
    ///
    /// 目标窗口解析：事件附带窗口（存活时）→ 主窗口（存活时）→ `None`。
    /// 处理器在独立任务中执行，故障被任务边界隔离，不影响后续按键事件；
    /// 管理器不等待处理器完成。
    ///
    /// 派发优先用当前线程的运行时，原生线程回退到构建时捕获的句柄；
    /// 两者都没有时丢弃该次按键并记录错误，绝不 panic。
    pub fn dispatch(&self, name: &str, source: Option<WindowRef>) {
        let Some(callback) = self.handlers.get(name) else {
            let err = ShortcutError::HandlerMissing(name.to_string());
            tracing::warn!(shortcut = %name, error = %err, "Key press consumed with no effect");
            return;
        };

        let Some(handle) = Handle::try_current().ok().or_else(|| self.runtime.clone()) else {
            tracing::error!(shortcut = %name, "No async runtime available, key event dropped");
            return;
        };

        let window = resolve_target_window(source, self.windows.as_ref());
        let shortcut = name.to_string();

        handle.spawn(async move {
            if let Err(e) = callback(window).await {
                tracing::error!(shortcut = %shortcut, error = %e, "Shortcut handler failed");
            }
        });
    }

    fn unregister_all(&self) {
        let drained: Vec<RegisteredAccelerator> = self.lock_tracked().drain(..).collect();

        for entry in drained {
            if let Err(e) = self.backend.unregister(&entry.accelerator) {
                tracing::warn!(
                    shortcut = %entry.shortcut,
                    error = %e,
                    "Failed to unregister accelerator"
                );
            }
        }
    }

    fn set_phase(&self, phase: RegistrationPhase) {
        tracing::debug!(phase = phase.name(), "Registration phase");
        self.phase.store(Arc::new(phase));
    }

    fn lock_pass(&self) -> MutexGuard<'_, ()> {
        match self.pass_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_tracked(&self) -> MutexGuard<'_, Vec<RegisteredAccelerator>> {
        match self.tracked.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{AppWindow, BackendError, BackendResult};
    use crate::shortcut::definitions::{ShortcutDefinition, ShortcutScope};
    use crate::shortcut::hydrate::ShortcutPreference;
    use serde_json::Value;
    use std::collections::HashSet;

    /// 记录注册调用的假后端，可配置拒绝/故障列表
    #[derive(Default)]
    struct FakeBackend {
        registered: Mutex<Vec<String>>,
        reject: Mutex<HashSet<String>>,
        fail: Mutex<HashSet<String>>,
    }

    impl FakeBackend {
        fn reject(&self, accelerator: &str) {
            self.reject.lock().unwrap().insert(accelerator.to_string());
        }

        fn fail(&self, accelerator: &str) {
            self.fail.lock().unwrap().insert(accelerator.to_string());
        }

        fn registered(&self) -> Vec<String> {
            self.registered.lock().unwrap().clone()
        }
    }

    impl HotkeyBackend for FakeBackend {
        fn register(&self, accelerator: &str) -> BackendResult<()> {
            if self.reject.lock().unwrap().contains(accelerator) {
                return Err(BackendError::Rejected {
                    accelerator: accelerator.to_string(),
                    reason: "claimed by another process".to_string(),
                });
            }
            if self.fail.lock().unwrap().contains(accelerator) {
                return Err(BackendError::Failed {
                    accelerator: accelerator.to_string(),
                    reason: "os call exploded".to_string(),
                });
            }
            self.registered.lock().unwrap().push(accelerator.to_string());
            Ok(())
        }

        fn unregister(&self, accelerator: &str) -> BackendResult<()> {
            self.registered.lock().unwrap().retain(|a| a != accelerator);
            Ok(())
        }
    }

    struct NoWindows;

    impl WindowProvider for NoWindows {
        fn windows(&self) -> Vec<WindowRef> {
            Vec::new()
        }

        fn main_window(&self) -> Option<WindowRef> {
            None
        }
    }

    #[allow(dead_code)]
    struct DummyWindow;

    impl AppWindow for DummyWindow {
        fn label(&self) -> String {
            "dummy".to_string()
        }

        fn is_alive(&self) -> bool {
            true
        }

        fn emit(&self, _event: &str, _payload: &Value) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn test_table() -> DefinitionTable {
        DefinitionTable::new(vec![
            ShortcutDefinition::new("zoom_in", &["CommandOrControl", "="], true, ShortcutScope::Main),
            ShortcutDefinition::new("show_app", &[], true, ShortcutScope::Main),
            ShortcutDefinition::new("disabled_one", &["F7"], false, ShortcutScope::Main),
            ShortcutDefinition::new("renderer_one", &["F8"], true, ShortcutScope::Renderer),
        ])
    }

    fn test_manager(backend: Arc<FakeBackend>) -> ShortcutManager {
        ShortcutManager::new(test_table(), backend, Arc::new(NoWindows))
    }

    #[test]
    fn test_initial_state() {
        let manager = test_manager(Arc::new(FakeBackend::default()));

        assert_eq!(manager.phase(), RegistrationPhase::Idle);
        assert!(manager.tracked_accelerators().is_empty());
        // 初始映射对定义表全覆盖
        assert_eq!(manager.hydrated().len(), 4);
    }

    #[test]
    fn test_pass_registers_only_eligible_shortcuts() {
        let backend = Arc::new(FakeBackend::default());
        let manager = test_manager(Arc::clone(&backend));

        let summary = manager.apply_preferences(&PreferenceSnapshot::new());

        // zoom_in 主加速键 + 小键盘变体；show_app 空按键、disabled/renderer 跳过
        assert_eq!(summary.registered, 2);
        assert_eq!(
            backend.registered(),
            vec!["CommandOrControl+=", "CommandOrControl+numadd"]
        );
        assert_eq!(manager.phase(), RegistrationPhase::Idle);
    }

    #[test]
    fn test_second_pass_replaces_tracked_set() {
        let backend = Arc::new(FakeBackend::default());
        let manager = test_manager(Arc::clone(&backend));

        manager.apply_preferences(&PreferenceSnapshot::new());

        let mut prefs = PreferenceSnapshot::new();
        prefs.insert(
            "zoom_in".to_string(),
            ShortcutPreference::with_key(&["Alt", "Z"]),
        );
        prefs.insert(
            "show_app".to_string(),
            ShortcutPreference::with_key(&["CommandOrControl", "E"]),
        );
        manager.apply_preferences(&prefs);

        // 自定义后的 zoom_in 不再有小键盘变体；第一轮的加速键全部消失
        assert_eq!(backend.registered(), vec!["Alt+Z", "CommandOrControl+E"]);

        let tracked = manager.tracked_accelerators();
        assert_eq!(tracked.len(), 2);
        assert!(tracked.iter().all(|r| r.accelerator != "CommandOrControl+="));
    }

    #[test]
    fn test_partial_rejection_keeps_siblings() {
        let backend = Arc::new(FakeBackend::default());
        backend.reject("CommandOrControl+numadd");
        let manager = test_manager(Arc::clone(&backend));

        let summary = manager.apply_preferences(&PreferenceSnapshot::new());

        assert_eq!(summary.registered, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(backend.registered(), vec!["CommandOrControl+="]);

        // 只跟踪系统接受的加速键
        let tracked = manager.tracked_accelerators();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].accelerator, "CommandOrControl+=");
        assert_eq!(tracked[0].shortcut, "zoom_in");
    }

    #[test]
    fn test_untranslatable_key_skips_shortcut_only() {
        let backend = Arc::new(FakeBackend::default());
        let manager = test_manager(Arc::clone(&backend));

        let mut prefs = PreferenceSnapshot::new();
        prefs.insert(
            "show_app".to_string(),
            ShortcutPreference::with_key(&["NotAKey???"]),
        );
        let summary = manager.apply_preferences(&prefs);

        assert_eq!(summary.skipped, 1);
        // zoom_in 不受影响
        assert_eq!(summary.registered, 2);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let backend = Arc::new(FakeBackend::default());
        let manager = test_manager(Arc::clone(&backend));

        manager.apply_preferences(&PreferenceSnapshot::new());
        assert!(!backend.registered().is_empty());

        manager.shutdown();
        assert!(backend.registered().is_empty());
        assert!(manager.tracked_accelerators().is_empty());
        assert_eq!(manager.phase(), RegistrationPhase::Idle);
    }

    #[test]
    fn test_hydrated_snapshot_replaced_wholesale() {
        let backend = Arc::new(FakeBackend::default());
        let manager = test_manager(backend);

        let mut prefs = PreferenceSnapshot::new();
        prefs.insert(
            "zoom_in".to_string(),
            ShortcutPreference::with_key(&["Alt", "Z"]),
        );
        manager.apply_preferences(&prefs);
        assert_eq!(manager.hydrated()["zoom_in"].key, vec!["Alt", "Z"]);

        manager.apply_preferences(&PreferenceSnapshot::new());
        assert_eq!(
            manager.hydrated()["zoom_in"].key,
            vec!["CommandOrControl", "="]
        );
    }

    #[test]
    fn test_backend_failure_skipped_like_rejection() {
        let backend = Arc::new(FakeBackend::default());
        backend.fail("CommandOrControl+=");
        let manager = test_manager(Arc::clone(&backend));

        let summary = manager.apply_preferences(&PreferenceSnapshot::new());

        // 意外故障与拒绝同样处理：跳过单个加速键，其余不受影响
        assert_eq!(summary.registered, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(backend.registered(), vec!["CommandOrControl+numadd"]);
    }

    #[tokio::test]
    async fn test_dispatch_without_handler_is_harmless() {
        let manager = test_manager(Arc::new(FakeBackend::default()));
        manager.apply_preferences(&PreferenceSnapshot::new());

        // 无处理器：按键被消费，仅记录警告
        manager.handle_key_event("CommandOrControl+=", None);
        manager.handle_key_event("Never+Registered", None);
    }

    #[test]
    fn test_dispatch_without_runtime_drops_event() {
        // 无任何运行时：按键事件被丢弃并记录错误，绝不 panic
        let manager = test_manager(Arc::new(FakeBackend::default()));

        let invoked = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&invoked);
        manager.register_handler(
            "show_app",
            crate::shortcut::handler(move |_| {
                let flag = Arc::clone(&flag);
                async move {
                    flag.store(true, std::sync::atomic::Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let mut prefs = PreferenceSnapshot::new();
        prefs.insert(
            "show_app".to_string(),
            ShortcutPreference::with_key(&["CommandOrControl", "E"]),
        );
        manager.apply_preferences(&prefs);

        manager.handle_key_event("CommandOrControl+E", None);
        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(RegistrationPhase::Idle.name(), "idle");
        assert_eq!(RegistrationPhase::Unregistering.name(), "unregistering");
        assert_eq!(RegistrationPhase::Rebuilding.name(), "rebuilding");
        assert_eq!(RegistrationPhase::Tracking.name(), "tracking");
        assert_eq!(RegistrationPhase::Broadcasting.name(), "broadcasting");
    }
}
