//! Dispatch Record Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Office section a dispatch originates from
///
/// Stored as its uppercase name (`ACCTS`, `ESTAB`, `DB`, `CAMP`), which is
/// also the segment used in the formatted dispatch number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum Section {
    Accts,
    Estab,
    Db,
    Camp,
}

impl Section {
    /// All known sections, in form-display order
    pub const ALL: [Section; 4] = [Section::Accts, Section::Estab, Section::Db, Section::Camp];

    /// The uppercase name used in storage and in dispatch numbers
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Accts => "ACCTS",
            Section::Estab => "ESTAB",
            Section::Db => "DB",
            Section::Camp => "CAMP",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCTS" => Ok(Section::Accts),
            "ESTAB" => Ok(Section::Estab),
            "DB" => Ok(Section::Db),
            "CAMP" => Ok(Section::Camp),
            other => Err(format!("unknown section: {}", other)),
        }
    }
}

/// Dispatch record entity
///
/// `no` is derived by the allocator and immutable once assigned. Records are
/// never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DispatchRecord {
    pub id: i64,
    /// Formatted dispatch number, e.g. `HDU/ACCTS/42-44`
    pub no: String,
    pub date: NaiveDate,
    pub section: Section,
    /// Addressee contact name
    pub address: String,
    /// Carbon-copy recipient names (JSON array column)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub cc: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub remarks: String,
    pub created_at: i64,
}

/// Create dispatch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchCreate {
    pub section: Section,
    pub date: NaiveDate,
    pub address: String,
    #[serde(default)]
    pub cc: Vec<String>,
    pub subject: String,
    #[serde(default)]
    pub remarks: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_names_roundtrip() {
        for section in Section::ALL {
            assert_eq!(section.as_str().parse::<Section>(), Ok(section));
        }
        assert!("SALES".parse::<Section>().is_err());
    }

    #[test]
    fn section_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Section::Accts).unwrap(),
            "\"ACCTS\""
        );
    }
}
