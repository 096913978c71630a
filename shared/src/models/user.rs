//! User Model

use serde::{Deserialize, Serialize};

/// User entity
///
/// Login only checks that the username exists; there is no password column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}
