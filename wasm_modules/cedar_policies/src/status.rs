// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Status codes returned across the ABI boundary.
//!
//! Values are part of the host contract and must never be renumbered.

use thiserror::Error;

/// The operation succeeded.
pub const STATUS_OK: u32 = 0;
/// An empty policy set was loaded twice in a row.
pub const STATUS_DUPLICATE_EMPTY_LOAD: u32 = 1000;
/// The policy text is not valid UTF-8.
pub const STATUS_INVALID_UTF8: u32 = 1001;
/// The policy text failed to parse.
pub const STATUS_PARSE_ERROR: u32 = 1002;
/// The offset does not name an outstanding region.
pub const STATUS_UNKNOWN_REGION: u32 = 1003;

/// Recoverable failures of `load_policies`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("empty policy set already loaded")]
    DuplicateEmptyLoad,
    #[error("invalid utf-8 input")]
    InvalidUtf8,
    #[error("failed to parse policy")]
    PolicyParsing,
    #[error("offset does not name an outstanding region")]
    UnknownRegion,
}

impl LoadError {
    pub fn code(self) -> u32 {
        match self {
            LoadError::DuplicateEmptyLoad => STATUS_DUPLICATE_EMPTY_LOAD,
            LoadError::InvalidUtf8 => STATUS_INVALID_UTF8,
            LoadError::PolicyParsing => STATUS_PARSE_ERROR,
            LoadError::UnknownRegion => STATUS_UNKNOWN_REGION,
        }
    }
}

/// Collapse a load result into its wire status.
pub fn status_of<T>(result: &Result<T, LoadError>) -> u32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => e.code(),
    }
}
