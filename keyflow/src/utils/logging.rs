//! 日志初始化模块
//!
//! 基于 tracing 的结构化日志。过滤规则优先取 `RUST_LOG` 环境变量，
//! 未设置时默认本 crate 为 debug、其余依赖为 warn。

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// 安装全局日志订阅器
///
/// 进程启动时调用一次；tracing 的全局订阅器只允许设置一次，
/// 重复调用会 panic。
///
/// ```no_run
/// keyflow::utils::logging::init_logging();
/// ```
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyflow=debug,warn"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("KeyFlow logging initialized");
}
