//! 快捷键相关错误类型

use thiserror::Error;

use crate::platform::BackendError;

/// 快捷键相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShortcutError {
    /// 按键 token 无法翻译为系统加速键
    #[error("Unknown key token '{0}' in key combination")]
    UnknownToken(String),

    /// 按键组合为空
    #[error("Key combination is empty")]
    EmptyCombination,

    /// 系统拒绝注册加速键（通常已被其他程序占用）
    #[error("OS rejected accelerator '{accelerator}': {reason}")]
    RegistrationRejected { accelerator: String, reason: String },

    /// 注册调用意外失败
    #[error("Registering accelerator '{accelerator}' failed: {reason}")]
    RegistrationFailed { accelerator: String, reason: String },

    /// 已注册的快捷键没有绑定处理器
    #[error("No handler registered for shortcut '{0}'")]
    HandlerMissing(String),

    /// 定义表中不存在该快捷键
    #[error("Shortcut '{0}' is not defined")]
    UnknownShortcut(String),
}

impl From<BackendError> for ShortcutError {
    /// 后端错误分类对应到注册错误
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Rejected { accelerator, reason } => {
                Self::RegistrationRejected { accelerator, reason }
            }
            BackendError::Failed { accelerator, reason } => {
                Self::RegistrationFailed { accelerator, reason }
            }
        }
    }
}

/// 快捷键模块的结果类型
pub type ShortcutResult<T> = Result<T, ShortcutError>;
