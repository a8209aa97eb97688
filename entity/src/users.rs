//! # 用户实体定义
//!
//! 外部身份提供商用户在本服务中的映射记录

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 用户状态：当前仅有活跃用户
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// 用户实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 外部身份提供商的用户标识
    #[sea_orm(unique)]
    pub identity: String,
    pub status: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::provider_credentials::Entity")]
    ProviderCredential,
}

impl Related<super::provider_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProviderCredential.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
