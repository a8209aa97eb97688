//! # HTTP API
//!
//! 路由、处理器、提取器与错误响应

pub mod extract;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod server;

pub use extract::AuthenticatedUser;
pub use server::{AppState, create_router, serve};
