//! 快捷键处理器注册表
//!
//! 维护快捷键名称到回调的映射。每个名称恰好一个回调；
//! 重复注册按"后写覆盖"处理并记录警告，不视为错误。
//! 回调绑定与系统注册完全解耦：重新绑定按键不需要重新注册回调。

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::platform::WindowRef;

/// 处理器返回的 future 类型
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// 快捷键处理器
///
/// 接收解析后的目标窗口（可能为 `None`，处理器必须容忍）
pub type ShortcutHandler = Arc<dyn Fn(Option<WindowRef>) -> HandlerFuture + Send + Sync>;

/// 把异步闭包包装为 [`ShortcutHandler`]
///
/// # Examples
///
/// ```
/// use keyflow::shortcut::handler;
///
/// let show_app = handler(|_window| async move {
///     // 显示主窗口
///     Ok(())
/// });
/// ```
pub fn handler<F, Fut>(f: F) -> ShortcutHandler
where
    F: Fn(Option<WindowRef>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |window| Box::pin(f(window)))
}

/// 处理器注册表
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<String, ShortcutHandler>>,
}

impl HandlerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器
    ///
    /// 同名处理器已存在时覆盖旧值并记录警告（后写覆盖）
    pub fn register(&self, name: impl Into<String>, callback: ShortcutHandler) {
        let name = name.into();
        let mut handlers = match self.handlers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if handlers.insert(name.clone(), callback).is_some() {
            tracing::warn!(shortcut = %name, "Shortcut handler overwritten (last registration wins)");
        } else {
            tracing::debug!(shortcut = %name, "Shortcut handler registered");
        }
    }

    /// 查询处理器
    pub fn get(&self, name: &str) -> Option<ShortcutHandler> {
        let handlers = match self.handlers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        handlers.get(name).cloned()
    }

    /// 是否已有处理器
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// 已注册的处理器数量
    pub fn len(&self) -> usize {
        match self.handlers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// 注册表是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
