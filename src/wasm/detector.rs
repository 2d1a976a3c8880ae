// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM binary encoding detection
//!
//! The policy store speaks a C-style integer ABI, which only a classic core
//! module can carry. This module inspects the binary header with wasmparser
//! before anything is compiled.

use crate::wasm::error::{WasmError, WASM_UNSUPPORTED_ENCODING};

use wasmparser::{Encoding, Parser, Payload};

/// Encodings a WASM binary can declare.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModuleEncoding {
    /// Classic core module (binary version 1, no component section)
    Core,
    /// Component Model binary (version 2+), or a legacy preview-1 component
    Component,
}

impl ModuleEncoding {
    #[inline]
    pub fn is_core(self) -> bool {
        matches!(self, Self::Core)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core-module",
            Self::Component => "component",
        }
    }
}

/// Detect the encoding of a WebAssembly binary by inspecting its version
/// header and, for version 1, its custom sections.
///
/// # Errors
/// Returns an error if the input is empty, truncated, or otherwise invalid
/// as a WebAssembly binary.
pub fn detect_encoding(bytes: &[u8]) -> Result<ModuleEncoding, WasmError> {
    let parser = Parser::new(0);
    let mut encoding = None;
    let mut has_component_section = false;

    for payload in parser.parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                encoding = Some(enc);
            }
            Payload::CustomSection(reader) if reader.name() == "component" => {
                has_component_section = true;
            }
            _ => {}
        }
    }

    let encoding =
        encoding.ok_or_else(|| WasmError::InvalidWasmBinary("Invalid WASM binary".to_string()))?;

    match encoding {
        Encoding::Component => Ok(ModuleEncoding::Component),
        Encoding::Module if has_component_section => Ok(ModuleEncoding::Component),
        Encoding::Module => Ok(ModuleEncoding::Core),
    }
}

/// Accept only core modules.
pub fn require_core_module(encoding: ModuleEncoding) -> Result<(), WasmError> {
    match encoding {
        ModuleEncoding::Core => Ok(()),
        ModuleEncoding::Component => Err(WasmError::UnsupportedEncoding(
            WASM_UNSUPPORTED_ENCODING.to_string(),
        )),
    }
}
