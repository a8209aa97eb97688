//! # 应用装配
//!
//! 从配置构建全部服务实例。

pub mod context;

pub use context::{AppContext, build_session_store};
