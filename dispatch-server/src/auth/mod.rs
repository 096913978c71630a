//! 认证模块 - JWT 会话令牌
//!
//! 登录只校验用户名是否存在（数据库没有口令列），但会话仍通过签名令牌承载，
//! 使 API 有真实的 Bearer 认证边界。

mod extractor;
mod jwt;
mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;

use serde::{Deserialize, Serialize};

/// The authenticated user attached to each request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| format!("non-numeric subject: {}", claims.sub))?;
        Ok(Self {
            id,
            username: claims.username,
            display_name: claims.display_name,
        })
    }
}
