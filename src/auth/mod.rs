//! # 认证模块
//!
//! 令牌签发与验证、请求认证闸门、令牌生命周期以及外部身份交换。
//! 核心数据结构由 `types` 提供，服务通过子模块路径访问。

pub mod exchange;
pub mod jwt;
pub mod keys;
pub mod lifecycle;
pub mod middleware;
pub mod types;
pub mod utils;

pub use exchange::{IdentityExchange, LoginEvent, LoginOutput};
pub use jwt::TokenCodec;
pub use keys::SigningKey;
pub use lifecycle::TokenLifecycleService;
pub use middleware::AuthenticationGate;
pub use types::{RequestIdentity, Role, TokenClaims, TokenClass, TokenPair};
pub use utils::AuthUtils;
