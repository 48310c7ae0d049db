//! 系统热键设施接口
//!
//! 注册管理器通过 [`HotkeyBackend`] 与操作系统的全局热键设施交互。
//! 生产实现见 [`super::global_backend`]；测试用假实现只需实现本接口。

use thiserror::Error;

/// 后端错误
///
/// 区分"系统拒绝"（常见：加速键已被其他进程占用）与"调用意外失败"，
/// 两者在注册流程中都按警告跳过处理
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// 系统拒绝了语法合法的加速键
    #[error("OS rejected accelerator '{accelerator}': {reason}")]
    Rejected { accelerator: String, reason: String },

    /// 系统调用意外失败
    #[error("OS call failed for accelerator '{accelerator}': {reason}")]
    Failed { accelerator: String, reason: String },
}

impl BackendError {
    /// 被拒绝/失败的加速键
    pub fn accelerator(&self) -> &str {
        match self {
            Self::Rejected { accelerator, .. } | Self::Failed { accelerator, .. } => accelerator,
        }
    }
}

/// 后端结果类型
pub type BackendResult<T> = Result<T, BackendError>;

/// 系统全局热键设施
///
/// 注册与注销都是同步、可失败的调用；失败只影响单个加速键
pub trait HotkeyBackend: Send + Sync {
    /// 注册一个加速键
    fn register(&self, accelerator: &str) -> BackendResult<()>;

    /// 注销一个加速键
    fn unregister(&self, accelerator: &str) -> BackendResult<()>;
}
