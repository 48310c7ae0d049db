//! 快捷键定义表
//!
//! 定义应用内全部快捷键的静态描述：名称、默认按键、默认开关、作用域等。
//! 定义表在启动时构建一次，进程生命周期内只读。
//!
//! # 使用示例
//!
//! ```
//! use keyflow::shortcut::{DefinitionTable, ShortcutScope};
//!
//! let table = DefinitionTable::builtin();
//! let zoom_in = table.get("zoom_in").unwrap();
//! assert_eq!(zoom_in.scope, ShortcutScope::Main);
//! assert_eq!(zoom_in.default_key, vec!["CommandOrControl", "="]);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 快捷键作用域
///
/// 决定快捷键动作在哪里执行：主进程直接处理，或转发给渲染窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutScope {
    /// 主进程作用域，由注册管理器注册为系统级全局快捷键
    Main,
    /// 渲染窗口作用域，只广播给窗口，不做系统级注册
    Renderer,
}

impl ShortcutScope {
    /// 检查是否为主进程作用域
    pub fn is_main(&self) -> bool {
        matches!(self, Self::Main)
    }
}

/// 单条快捷键定义
///
/// 定义一个快捷键的名称、默认按键组合（语义 token 序列）及属性。
/// 字段一经构建不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortcutDefinition {
    /// 唯一名称（如 `zoom_in`）
    pub name: String,
    /// 默认按键组合，有序的语义 token 序列；空序列表示默认未绑定
    pub default_key: Vec<String>,
    /// 默认是否启用
    pub default_enabled: bool,
    /// 作用域
    pub scope: ShortcutScope,
    /// 用户是否可在设置中修改按键
    pub editable: bool,
    /// 是否为系统级快捷键（动作由主进程直接处理）
    pub system: bool,
    /// 描述文本（供设置界面展示）
    pub description: String,
}

impl ShortcutDefinition {
    /// 创建新的快捷键定义
    ///
    /// 默认 `editable = true`、`system = false`、描述为空
    pub fn new(
        name: impl Into<String>,
        default_key: &[&str],
        default_enabled: bool,
        scope: ShortcutScope,
    ) -> Self {
        Self {
            name: name.into(),
            default_key: default_key.iter().map(|t| t.to_string()).collect(),
            default_enabled,
            scope,
            editable: true,
            system: false,
            description: String::new(),
        }
    }

    /// 设置是否可编辑
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// 标记为系统级快捷键
    pub fn with_system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    /// 设置描述文本
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 快捷键定义表
///
/// 保持定义顺序的只读列表，附带按名称的索引。
/// 查询不存在的名称属于调用方错误，返回 `None` 由调用方断言。
#[derive(Debug, Clone)]
pub struct DefinitionTable {
    definitions: Vec<ShortcutDefinition>,
    index: HashMap<String, usize>,
}

impl DefinitionTable {
    /// 由定义列表构建定义表
    ///
    /// 重复名称保留先出现的一条并记录警告
    pub fn new(definitions: Vec<ShortcutDefinition>) -> Self {
        let mut deduped: Vec<ShortcutDefinition> = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());

        for def in definitions {
            if index.contains_key(&def.name) {
                tracing::warn!(shortcut = %def.name, "Duplicate shortcut definition ignored");
                continue;
            }
            index.insert(def.name.clone(), deduped.len());
            deduped.push(def);
        }

        Self {
            definitions: deduped,
            index,
        }
    }

    /// 内置定义表
    ///
    /// 覆盖应用的全部快捷键；空的 `default_key` 表示出厂未绑定按键
    pub fn builtin() -> Self {
        use ShortcutScope::{Main, Renderer};

        Self::new(vec![
            ShortcutDefinition::new("zoom_in", &["CommandOrControl", "="], true, Main)
                .with_description("Zoom in the application window"),
            ShortcutDefinition::new("zoom_out", &["CommandOrControl", "-"], true, Main)
                .with_description("Zoom out the application window"),
            ShortcutDefinition::new("zoom_reset", &["CommandOrControl", "0"], true, Main)
                .with_description("Reset the window zoom level"),
            ShortcutDefinition::new("show_app", &[], true, Main)
                .with_system(true)
                .with_description("Show or hide the main window"),
            ShortcutDefinition::new("mini_window", &[], false, Main)
                .with_system(true)
                .with_description("Toggle the quick-assistant mini window"),
            ShortcutDefinition::new("selection_assistant_toggle", &[], false, Main)
                .with_system(true)
                .with_description("Enable or disable the selection assistant"),
            ShortcutDefinition::new("selection_assistant_select_text", &[], false, Main)
                .with_system(true)
                .with_description("Grab the current selection into the assistant"),
            ShortcutDefinition::new("show_settings", &["CommandOrControl", ","], true, Main)
                .with_description("Open the settings window"),
            ShortcutDefinition::new(
                "search_message",
                &["CommandOrControl", "Shift", "F"],
                true,
                Renderer,
            )
            .with_description("Search messages across all topics"),
            ShortcutDefinition::new(
                "search_message_in_chat",
                &["CommandOrControl", "F"],
                true,
                Renderer,
            )
            .with_description("Search messages in the current chat"),
            ShortcutDefinition::new("clear_topic", &["CommandOrControl", "L"], true, Renderer)
                .with_description("Clear the current topic"),
            ShortcutDefinition::new(
                "toggle_new_context",
                &["CommandOrControl", "R"],
                true,
                Renderer,
            )
            .with_description("Insert a context divider into the chat"),
            ShortcutDefinition::new("copy_last_message", &[], false, Renderer)
                .with_description("Copy the last assistant message"),
            ShortcutDefinition::new("exit_fullscreen", &["Escape"], true, Renderer)
                .with_editable(false)
                .with_description("Leave fullscreen mode"),
        ])
    }

    /// 按名称查询定义
    pub fn get(&self, name: &str) -> Option<&ShortcutDefinition> {
        self.index.get(name).map(|i| &self.definitions[*i])
    }

    /// 检查名称是否存在
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 按定义顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = &ShortcutDefinition> {
        self.definitions.iter()
    }

    /// 定义数量
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// 是否为空表
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 按定义顺序返回全部名称
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }
}
