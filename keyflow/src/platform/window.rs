//! 窗口抽象模块
//!
//! 快捷键子系统只需要两个窗口能力：向窗口投递事件，以及回答
//! "当前有哪些活跃窗口 / 主窗口是哪个"。宿主应用通过实现
//! [`AppWindow`] 和 [`WindowProvider`] 接入自己的窗口体系。

use std::sync::Arc;

use serde_json::Value;

/// 单个应用窗口
pub trait AppWindow: Send + Sync {
    /// 窗口标识（用于日志）
    fn label(&self) -> String;

    /// 窗口是否仍然存活（未被销毁）
    fn is_alive(&self) -> bool;

    /// 向窗口投递事件
    fn emit(&self, event: &str, payload: &Value) -> anyhow::Result<()>;
}

/// 窗口引用
pub type WindowRef = Arc<dyn AppWindow>;

/// 窗口提供者
///
/// 宿主应用实现，供广播定向和处理器窗口解析使用
pub trait WindowProvider: Send + Sync {
    /// 当前全部窗口（可能包含已销毁的，由调用方过滤）
    fn windows(&self) -> Vec<WindowRef>;

    /// 应用主窗口
    fn main_window(&self) -> Option<WindowRef>;
}

/// 解析快捷键处理器的目标窗口
///
/// 优先级：触发事件附带的窗口（存活时）→ 主窗口（存活时）→ `None`。
/// 处理器必须容忍 `None`。
pub fn resolve_target_window(
    source: Option<WindowRef>,
    provider: &dyn WindowProvider,
) -> Option<WindowRef> {
    if let Some(window) = source {
        if window.is_alive() {
            return Some(window);
        }
        tracing::debug!(window = %window.label(), "Event window no longer alive, falling back");
    }

    provider.main_window().filter(|w| w.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestWindow {
        label: String,
        alive: AtomicBool,
    }

    impl TestWindow {
        fn new(label: &str, alive: bool) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_string(),
                alive: AtomicBool::new(alive),
            })
        }
    }

    impl AppWindow for TestWindow {
        fn label(&self) -> String {
            self.label.clone()
        }

        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }

        fn emit(&self, _event: &str, _payload: &Value) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct TestProvider {
        main: Option<WindowRef>,
    }

    impl WindowProvider for TestProvider {
        fn windows(&self) -> Vec<WindowRef> {
            self.main.iter().cloned().collect()
        }

        fn main_window(&self) -> Option<WindowRef> {
            self.main.clone()
        }
    }

    #[test]
    fn test_resolve_prefers_live_event_window() {
        let event_window = TestWindow::new("popup", true);
        let provider = TestProvider {
            main: Some(TestWindow::new("main", true) as WindowRef),
        };

        let resolved =
            resolve_target_window(Some(event_window.clone() as WindowRef), &provider).unwrap();
        assert_eq!(resolved.label(), "popup");
    }

    #[test]
    fn test_resolve_falls_back_to_main_window() {
        let dead_window = TestWindow::new("popup", false);
        let provider = TestProvider {
            main: Some(TestWindow::new("main", true) as WindowRef),
        };

        let resolved =
            resolve_target_window(Some(dead_window as WindowRef), &provider).unwrap();
        assert_eq!(resolved.label(), "main");
    }

    #[test]
    fn test_resolve_none_when_nothing_alive() {
        let provider = TestProvider {
            main: Some(TestWindow::new("main", false) as WindowRef),
        };
        assert!(resolve_target_window(None, &provider).is_none());

        let provider = TestProvider { main: None };
        assert!(resolve_target_window(None, &provider).is_none());
    }
}
