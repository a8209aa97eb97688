//! # Auth Gateway Library
//!
//! 外部身份提供商登录换取本服务签名令牌：令牌签发与验证、
//! 可撤销的会话存储、身份交换，以及承载它们的 HTTP API。

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AuthError, GatewayError, Result};
