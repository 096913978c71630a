//! Contact Model

use serde::{Deserialize, Serialize};

/// Contact entity (address book entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Contact {
    pub id: i64,
    pub name: String,
}

/// Create contact payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCreate {
    pub name: String,
}

/// Rename contact payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub name: String,
}
