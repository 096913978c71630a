//! Unified error codes for the dispatch register
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Dispatch errors
//! - 6xxx: Contact errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Username does not exist
    UnknownUser = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 4xxx: Dispatch ====================
    /// Dispatch sequence counter row is missing or unreachable
    SequenceUnavailable = 4001,
    /// Dispatch sequence contention persisted after bounded retries
    SequenceContention = 4002,
    /// Dispatch record insert failed after a number was reserved
    DispatchStoreFailed = 4003,
    /// Unknown dispatch section
    SectionInvalid = 4004,

    // ==================== 6xxx: Contact ====================
    /// Contact not found
    ContactNotFound = 6001,
    /// Contact name already exists
    ContactNameExists = 6002,
    /// Contact is referenced by dispatch records
    ContactInUse = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",
            Self::NotAuthenticated => "Authentication required",
            Self::UnknownUser => "Incorrect username",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",
            Self::SequenceUnavailable => "Dispatch sequence unavailable",
            Self::SequenceContention => "Dispatch sequence busy, try again",
            Self::DispatchStoreFailed => "Failed to store dispatch record",
            Self::SectionInvalid => "Unknown section",
            Self::ContactNotFound => "Contact not found",
            Self::ContactNameExists => "Contact name already exists",
            Self::ContactInUse => "Contact is referenced by dispatch records",
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,
            1001 => Self::NotAuthenticated,
            1002 => Self::UnknownUser,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            4001 => Self::SequenceUnavailable,
            4002 => Self::SequenceContention,
            4003 => Self::DispatchStoreFailed,
            4004 => Self::SectionInvalid,
            6001 => Self::ContactNotFound,
            6002 => Self::ContactNameExists,
            6003 => Self::ContactInUse,
            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::UnknownUser,
            ErrorCode::SequenceUnavailable,
            ErrorCode::SequenceContention,
            ErrorCode::ContactInUse,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(ErrorCode::try_from(42424), Err(InvalidErrorCode(42424)));
    }
}
