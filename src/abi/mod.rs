// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The integer ABI shared with the Cedar policy guest.
//!
//! Everything that crosses the boundary is an `i32` at the WASM level: byte
//! counts, offsets into linear memory, status codes and policy counts. This
//! module names the exports the host relies on and maps raw status codes
//! back into a closed Rust type.

pub mod status;

pub use status::{LoadRejection, StatusCode};

/// Linear memory the host writes policy text into.
pub const MEMORY_EXPORT: &str = "memory";
/// `(size: i32) -> offset: i32`
pub const ALLOCATE_EXPORT: &str = "allocate";
/// `(offset: i32) -> status: i32`
pub const LOAD_POLICIES_EXPORT: &str = "load_policies";
/// `() -> count: i32`
pub const COUNT_POLICIES_EXPORT: &str = "count_num_policies";
/// `() -> count: i32`, optional
pub const COUNT_TEMPLATES_EXPORT: &str = "count_num_templates";
/// `() -> bytes: i32`, optional
pub const ALLOCATED_BYTES_EXPORT: &str = "allocated_bytes";

/// Shape of a function export, in number of `i32` params and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSignature {
    pub name: &'static str,
    pub params: usize,
    pub results: usize,
    pub required: bool,
}

/// Every function export the host knows about.
pub const FUNCTION_EXPORTS: [ExportSignature; 5] = [
    ExportSignature {
        name: ALLOCATE_EXPORT,
        params: 1,
        results: 1,
        required: true,
    },
    ExportSignature {
        name: LOAD_POLICIES_EXPORT,
        params: 1,
        results: 1,
        required: true,
    },
    ExportSignature {
        name: COUNT_POLICIES_EXPORT,
        params: 0,
        results: 1,
        required: true,
    },
    ExportSignature {
        name: COUNT_TEMPLATES_EXPORT,
        params: 0,
        results: 1,
        required: false,
    },
    ExportSignature {
        name: ALLOCATED_BYTES_EXPORT,
        params: 0,
        results: 1,
        required: false,
    },
];

impl std::fmt::Display for ExportSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = vec!["i32"; self.params].join(", ");
        let results = vec!["i32"; self.results].join(", ");
        write!(f, "'{}' with signature ({}) -> ({})", self.name, params, results)
    }
}
