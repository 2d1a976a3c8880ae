// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for driving the policy guest.
//!
//! Two classes of failure exist. A [`WasmError::PolicyRejected`] carries a
//! status code the guest returned on purpose; the instance stays usable.
//! Every other variant means the module could not be loaded or the instance
//! broke the memory contract, trapped or ran out of fuel, and the instance
//! must be discarded.

use crate::abi::LoadRejection;
use thiserror::Error;

/// Error message for component-model binaries, which cannot carry the
/// integer ABI.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: the policy store must be a \
core WASM module exporting 'memory', 'allocate', 'load_policies' and 'count_num_policies'.";

#[derive(Error, Debug)]
pub enum WasmError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Binary is a component or legacy preview-1 component.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),

    /// Module compilation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// Instance creation failed (memory limits, start function trap, ...).
    #[error("Instantiation error: {0}")]
    InstantiationError(String),

    /// File I/O error during module loading.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Module or input failed a host-side check.
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// A region returned by the guest, or a write into it, falls outside
    /// linear memory.
    #[error("Memory access out of bounds: {0}")]
    OutOfBounds(String),

    /// The instance exhausted its fuel budget.
    #[error("Guest ran out of fuel in '{function}'")]
    OutOfFuel { function: &'static str },

    /// The guest trapped.
    #[error("Guest trapped in '{function}': {reason}")]
    Trap {
        function: &'static str,
        reason: String,
    },

    /// The guest reported a recoverable failure through its status code.
    #[error("Policy load rejected: {0}")]
    PolicyRejected(#[from] LoadRejection),
}

impl WasmError {
    /// Whether the instance that produced this error can keep being used.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, WasmError::PolicyRejected(_))
    }

    /// The guest rejection carried by this error, if any.
    pub fn rejection(&self) -> Option<LoadRejection> {
        match self {
            WasmError::PolicyRejected(rejection) => Some(*rejection),
            _ => None,
        }
    }
}

/// Result type alias for WASM operations.
pub type WasmResult<T> = Result<T, WasmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rejections_are_recoverable() {
        let rejected = WasmError::PolicyRejected(LoadRejection::ParseError);
        assert!(rejected.is_recoverable());
        assert_eq!(rejected.rejection(), Some(LoadRejection::ParseError));

        let trapped = WasmError::Trap {
            function: "load_policies",
            reason: "unreachable".to_string(),
        };
        assert!(!trapped.is_recoverable());
        assert_eq!(trapped.rejection(), None);

        assert!(!WasmError::OutOfFuel { function: "allocate" }.is_recoverable());
        assert!(!WasmError::OutOfBounds("write".to_string()).is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = WasmError::from(LoadRejection::DuplicateEmptyLoad);
        assert_eq!(
            err.to_string(),
            "Policy load rejected: empty policy set already loaded"
        );

        let err = WasmError::OutOfFuel {
            function: "count_num_policies",
        };
        assert_eq!(
            err.to_string(),
            "Guest ran out of fuel in 'count_num_policies'"
        );
    }
}
