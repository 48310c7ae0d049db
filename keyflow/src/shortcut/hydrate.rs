//! 偏好叠加模块
//!
//! 将只读定义表与用户偏好快照合并为完整的运行时快捷键映射。
//! 合并是纯函数：相同输入必然产生相同输出，输出整体替换旧映射，
//! 绝不跨调用做部分合并。
//!
//! 本模块不做按键语法校验——校验推迟到加速键翻译阶段。
//!
//! 注：非 `editable` 的快捷键如带有偏好覆盖，合并时同样生效，
//! 与原始实现观察到的行为一致；`editable` 仅供设置界面展示。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::definitions::{DefinitionTable, ShortcutScope};

/// 单条用户偏好
///
/// 两个字段都可缺失，缺失的字段不覆盖定义默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutPreference {
    /// 覆盖的按键组合（语义 token 序列）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<String>>,
    /// 覆盖的启用开关
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ShortcutPreference {
    /// 创建只覆盖按键的偏好
    pub fn with_key(tokens: &[&str]) -> Self {
        Self {
            key: Some(tokens.iter().map(|t| t.to_string()).collect()),
            enabled: None,
        }
    }

    /// 创建只覆盖开关的偏好
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            key: None,
            enabled: Some(enabled),
        }
    }

    /// 设置启用开关
    pub fn and_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

/// 用户偏好快照，按快捷键名称索引；允许缺失任意条目
pub type PreferenceSnapshot = HashMap<String, ShortcutPreference>;

/// 合并完成的运行时快捷键
///
/// 定义字段加上解析后的按键与开关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedShortcut {
    /// 快捷键名称
    pub name: String,
    /// 解析后的按键组合
    pub key: Vec<String>,
    /// 解析后的启用开关
    pub enabled: bool,
    /// 作用域
    pub scope: ShortcutScope,
    /// 是否可编辑
    pub editable: bool,
    /// 是否为系统级快捷键
    pub system: bool,
    /// 描述文本
    pub description: String,
}

/// 合并后的映射，按快捷键名称索引
pub type HydratedMap = HashMap<String, HydratedShortcut>;

/// 将定义表与偏好快照合并为运行时映射
///
/// 对定义表中的每一条定义：
/// - 按键 = 偏好中的 `key`（存在且非空时），否则定义默认值
/// - 开关 = 偏好中的 `enabled`（存在时），否则定义默认值
///
/// 输出对定义表是全覆盖的：每条定义恰好产生一条结果；
/// 快照中多余的名称被忽略。
pub fn hydrate(table: &DefinitionTable, prefs: &PreferenceSnapshot) -> HydratedMap {
    let mut hydrated = HashMap::with_capacity(table.len());

    for def in table.iter() {
        let pref = prefs.get(&def.name);

        let key = pref
            .and_then(|p| p.key.as_ref())
            .filter(|k| !k.is_empty())
            .cloned()
            .unwrap_or_else(|| def.default_key.clone());

        let enabled = pref
            .and_then(|p| p.enabled)
            .unwrap_or(def.default_enabled);

        hydrated.insert(
            def.name.clone(),
            HydratedShortcut {
                name: def.name.clone(),
                key,
                enabled,
                scope: def.scope,
                editable: def.editable,
                system: def.system,
                description: def.description.clone(),
            },
        );
    }

    hydrated
}
