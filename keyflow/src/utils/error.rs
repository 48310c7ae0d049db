//! 全局错误处理模块
//!
//! 聚合各模块错误类型，供宿主应用在集成边界统一处理

use thiserror::Error;

use crate::platform::BackendError;
use crate::shortcut::ShortcutError;
use crate::state::PreferenceError;

/// 应用错误类型
///
/// 聚合所有模块的错误类型，提供统一的错误处理接口
#[derive(Error, Debug)]
pub enum AppError {
    /// 快捷键错误
    #[error("Shortcut error: {0}")]
    Shortcut(#[from] ShortcutError),

    /// 偏好存储错误
    #[error("Preference error: {0}")]
    Preference(#[from] PreferenceError),

    /// 系统热键后端错误
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_from_shortcut_error() {
        let err: AppError = ShortcutError::EmptyCombination.into();
        assert!(err.to_string().contains("Shortcut error"));
    }

    #[test]
    fn test_app_error_from_backend_error() {
        let err: AppError = BackendError::Rejected {
            accelerator: "Ctrl+A".to_string(),
            reason: "busy".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Backend error"));
        assert!(err.to_string().contains("Ctrl+A"));
    }

    #[test]
    fn test_app_error_internal() {
        let err = AppError::Internal("something odd".to_string());
        assert!(err.to_string().contains("something odd"));
    }
}
