// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host-side view of the guest's status codes.

use serde::Serialize;
use thiserror::Error;

/// Raw code for success.
pub const STATUS_OK: u32 = 0;
/// Raw code for a rejected second empty load.
pub const STATUS_DUPLICATE_EMPTY_LOAD: u32 = 1000;
/// Raw code for policy text that is not UTF-8.
pub const STATUS_INVALID_UTF8: u32 = 1001;
/// Raw code for policy text that failed to parse.
pub const STATUS_PARSE_ERROR: u32 = 1002;
/// Raw code for an offset the guest never handed out (or already consumed).
pub const STATUS_UNKNOWN_REGION: u32 = 1003;

/// Recoverable failure categories reported by `load_policies`.
///
/// The instance stays usable after any of these. Codes the host does not
/// recognise are kept as [`LoadRejection::Unrecognized`] and must be
/// treated as a generic, non-retryable failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadRejection {
    #[error("empty policy set already loaded")]
    DuplicateEmptyLoad,

    #[error("policy text is not valid UTF-8")]
    InvalidUtf8,

    #[error("policy text failed to parse")]
    ParseError,

    #[error("offset was not handed out by allocate or was already consumed")]
    UnknownRegion,

    #[error("unrecognized status code {0}")]
    Unrecognized(u32),
}

impl LoadRejection {
    /// The raw code this rejection travels as.
    pub fn code(self) -> u32 {
        match self {
            LoadRejection::DuplicateEmptyLoad => STATUS_DUPLICATE_EMPTY_LOAD,
            LoadRejection::InvalidUtf8 => STATUS_INVALID_UTF8,
            LoadRejection::ParseError => STATUS_PARSE_ERROR,
            LoadRejection::UnknownRegion => STATUS_UNKNOWN_REGION,
            LoadRejection::Unrecognized(code) => code,
        }
    }

    /// Short stable label, used in reports.
    pub fn label(self) -> &'static str {
        match self {
            LoadRejection::DuplicateEmptyLoad => "duplicate_empty_load",
            LoadRejection::InvalidUtf8 => "invalid_utf8",
            LoadRejection::ParseError => "parse_error",
            LoadRejection::UnknownRegion => "unknown_region",
            LoadRejection::Unrecognized(_) => "unrecognized",
        }
    }
}

/// A status code as returned by the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Rejected(LoadRejection),
}

impl StatusCode {
    pub fn from_raw(code: u32) -> Self {
        match code {
            STATUS_OK => StatusCode::Ok,
            STATUS_DUPLICATE_EMPTY_LOAD => StatusCode::Rejected(LoadRejection::DuplicateEmptyLoad),
            STATUS_INVALID_UTF8 => StatusCode::Rejected(LoadRejection::InvalidUtf8),
            STATUS_PARSE_ERROR => StatusCode::Rejected(LoadRejection::ParseError),
            STATUS_UNKNOWN_REGION => StatusCode::Rejected(LoadRejection::UnknownRegion),
            other => StatusCode::Rejected(LoadRejection::Unrecognized(other)),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            StatusCode::Ok => STATUS_OK,
            StatusCode::Rejected(rejection) => rejection.code(),
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    pub fn into_result(self) -> Result<(), LoadRejection> {
        match self {
            StatusCode::Ok => Ok(()),
            StatusCode::Rejected(rejection) => Err(rejection),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::Rejected(rejection) => rejection.label(),
        }
    }
}

impl From<u32> for StatusCode {
    fn from(code: u32) -> Self {
        StatusCode::from_raw(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(StatusCode::from_raw(0), StatusCode::Ok);
        assert_eq!(
            StatusCode::from_raw(1000),
            StatusCode::Rejected(LoadRejection::DuplicateEmptyLoad)
        );
        assert_eq!(
            StatusCode::from_raw(1001),
            StatusCode::Rejected(LoadRejection::InvalidUtf8)
        );
        assert_eq!(
            StatusCode::from_raw(1002),
            StatusCode::Rejected(LoadRejection::ParseError)
        );
        assert_eq!(
            StatusCode::from_raw(1003),
            StatusCode::Rejected(LoadRejection::UnknownRegion)
        );
    }

    #[test]
    fn test_unrecognized_code_is_generic_failure() {
        let status = StatusCode::from_raw(42);
        assert!(!status.is_ok());
        assert_eq!(status.into_result(), Err(LoadRejection::Unrecognized(42)));
        assert_eq!(status.raw(), 42);
        assert_eq!(status.label(), "unrecognized");
    }

    #[test]
    fn test_raw_is_preserved() {
        for code in [0, 1000, 1001, 1002, 1003, 7, u32::MAX] {
            assert_eq!(StatusCode::from(code).raw(), code);
        }
    }

    #[test]
    fn test_duplicate_empty_differs_from_parse_error() {
        assert_ne!(
            LoadRejection::DuplicateEmptyLoad.code(),
            LoadRejection::ParseError.code()
        );
        assert_ne!(
            LoadRejection::DuplicateEmptyLoad.to_string(),
            LoadRejection::ParseError.to_string()
        );
    }
}
