//! # Entity 模块
//!
//! 包含身份网关的 Sea-ORM 实体定义

pub mod provider_credentials;
pub mod users;

pub use provider_credentials::Entity as ProviderCredentials;
pub use users::Entity as Users;

#[cfg(test)]
mod tests;
