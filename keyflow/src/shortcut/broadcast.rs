//! 快捷键变更广播模块
//!
//! 每次注册流程完成后，把当前合并映射的不可变深拷贝推送给所有
//! 存活窗口。单个窗口投递失败只记录警告，不影响其余窗口。

use std::sync::Arc;

use super::definitions::DefinitionTable;
use super::hydrate::{HydratedMap, HydratedShortcut};
use crate::platform::WindowProvider;

/// 广播事件名称
pub const SHORTCUTS_UPDATED_EVENT: &str = "shortcuts:updated";

/// 快捷键变更广播器
pub struct ShortcutBroadcaster {
    windows: Arc<dyn WindowProvider>,
}

impl ShortcutBroadcaster {
    /// 创建广播器
    pub fn new(windows: Arc<dyn WindowProvider>) -> Self {
        Self { windows }
    }

    /// 向所有存活窗口广播当前合并映射
    ///
    /// 载荷为按定义表顺序排列的快捷键快照（序列化即深拷贝）。
    /// 返回成功投递的窗口数量。
    pub fn broadcast(&self, hydrated: &HydratedMap, table: &DefinitionTable) -> usize {
        // 按定义表顺序生成载荷，保证前端展示顺序稳定
        let snapshot: Vec<&HydratedShortcut> = table
            .iter()
            .filter_map(|def| hydrated.get(&def.name))
            .collect();

        let payload = match serde_json::to_value(&snapshot) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize shortcut snapshot");
                return 0;
            }
        };

        let mut delivered = 0;
        for window in self.windows.windows() {
            if !window.is_alive() {
                continue;
            }
            match window.emit(SHORTCUTS_UPDATED_EVENT, &payload) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        window = %window.label(),
                        error = %e,
                        "Failed to deliver shortcut update"
                    );
                }
            }
        }

        tracing::debug!(windows = delivered, "Broadcast shortcut snapshot");
        delivered
    }
}
