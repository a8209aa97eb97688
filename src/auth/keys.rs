//! # 签名密钥
//!
//! 进程级的对称签名密钥，启动时构造一次，之后只读。

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::MIN_SECRET_LEN;
use crate::error::Result;

/// HS256 签名密钥
///
/// 编码与解码两半同源于一个 secret，构造后不可变，通过 `Arc` 在服务间共享。
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// 从原始 secret 构造
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        crate::ensure_config!(
            secret.len() >= MIN_SECRET_LEN,
            "签名密钥长度不足: 需要至少 {} 字节, 实际 {} 字节",
            MIN_SECRET_LEN,
            secret.len()
        );

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) const fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) const fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}
