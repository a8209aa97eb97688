//! # 实体定义测试

use crate::{provider_credentials, users};
use sea_orm::{EntityName, Set};

#[test]
fn test_user_active_model() {
    let user = users::ActiveModel {
        identity: Set("123".to_string()),
        status: Set(users::STATUS_ACTIVE.to_string()),
        ..Default::default()
    };

    assert_eq!(user.identity.as_ref(), "123");
    assert_eq!(user.status.as_ref(), "ACTIVE");
}

#[test]
fn test_provider_credential_allows_absent_value() {
    let credential = provider_credentials::ActiveModel {
        user_id: Set(1),
        refresh_credential: Set(None),
        ..Default::default()
    };

    assert_eq!(credential.user_id.as_ref(), &1);
    assert!(credential.refresh_credential.as_ref().is_none());
}

#[test]
fn test_table_names() {
    assert_eq!(users::Entity.table_name(), "users");
    assert_eq!(
        provider_credentials::Entity.table_name(),
        "provider_credentials"
    );
}
