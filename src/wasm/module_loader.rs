// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Policy Module Loading and Validation
//!
//! This module turns a WASM binary into a [`PolicyModule`] ready to be
//! instantiated:
//! - File I/O and size validation
//! - Encoding detection (core modules only)
//! - Compilation with a locked-down wasmtime engine
//! - Import rejection: the guest must be self-contained
//! - Export validation against the integer ABI

use crate::abi::{FUNCTION_EXPORTS, MEMORY_EXPORT};
use crate::config::WasmConfig;
use crate::observability::messages::wasm::{EncodingDetected, ModuleLoadFailed, ModuleLoaded};
use crate::wasm::detector::{detect_encoding, require_core_module};
use crate::wasm::error::{WasmError, WasmResult};
use crate::wasm::module::{InstanceLimits, PolicyModule};
use std::path::Path;
use wasmtime::{Config, Engine, ExternType, Module, ValType};

/// Policy Module Loader - handles loading, validation and compilation
pub struct PolicyModuleLoader;

impl PolicyModuleLoader {
    /// Load and validate a policy module from the filesystem
    pub fn load_module<P: AsRef<Path>>(
        module_path: P,
        config: &WasmConfig,
    ) -> WasmResult<PolicyModule> {
        let module_path = module_path.as_ref();
        let module_name = module_path.to_string_lossy().to_string();

        let result = std::fs::read(module_path)
            .map_err(WasmError::IoError)
            .and_then(|bytes| Self::load_bytes(&bytes, &module_name, config));

        if let Err(e) = &result {
            tracing::error!(
                "{}",
                ModuleLoadFailed {
                    module_name: &module_name,
                    error: e,
                }
            );
        }
        result
    }

    /// Validate and compile a policy module from raw bytes
    pub fn load_bytes(
        module_bytes: &[u8],
        module_name: &str,
        config: &WasmConfig,
    ) -> WasmResult<PolicyModule> {
        let max_size = config.get_max_module_size();
        if module_bytes.len() > max_size {
            return Err(WasmError::ValidationError(format!(
                "WASM module too large: {} bytes (max: {} bytes)",
                module_bytes.len(),
                max_size
            )));
        }

        let fuel = config
            .fuel
            .effective()
            .map_err(|e| WasmError::ValidationError(e.to_string()))?;

        let encoding = detect_encoding(module_bytes)?;
        tracing::debug!(
            "{}",
            EncodingDetected {
                module_name,
                encoding: encoding.as_str(),
            }
        );
        require_core_module(encoding)?;

        let engine = Self::create_engine()?;
        let module =
            Module::new(&engine, module_bytes).map_err(|e| WasmError::ModuleError(e.to_string()))?;

        Self::validate_imports(&module)?;
        Self::validate_exports(&module)?;

        tracing::info!(
            "{}",
            ModuleLoaded {
                module_name,
                size_bytes: module_bytes.len(),
            }
        );

        let limits = InstanceLimits {
            fuel,
            max_memory_bytes: config.memory.get_max_bytes(),
        };
        Ok(PolicyModule::new(engine, module, module_name, limits))
    }

    /// Create wasmtime engine with security-focused configuration
    fn create_engine() -> WasmResult<Engine> {
        let mut config = Config::new();

        config.wasm_threads(false);
        config.wasm_simd(false);
        config.wasm_relaxed_simd(false);
        config.wasm_multi_memory(false);
        config.wasm_memory64(false);
        config.wasm_component_model(false);

        // Fuel bounds the total work an instance may do over its lifetime
        config.consume_fuel(true);
        config.epoch_interruption(false);

        Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
    }

    /// The guest is instantiated without a linker, so it must not import
    /// anything.
    fn validate_imports(module: &Module) -> WasmResult<()> {
        let imports: Vec<String> = module
            .imports()
            .map(|i| format!("{}::{}", i.module(), i.name()))
            .collect();

        if imports.is_empty() {
            Ok(())
        } else {
            Err(WasmError::ValidationError(format!(
                "Policy module must not import host functions, found: {}",
                imports.join(", ")
            )))
        }
    }

    /// Check the module exports memory and every required ABI function with
    /// the right shape. Optional exports are checked only when present.
    fn validate_exports(module: &Module) -> WasmResult<()> {
        match module.get_export(MEMORY_EXPORT) {
            Some(ExternType::Memory(_)) => {}
            _ => {
                return Err(WasmError::ValidationError(format!(
                    "WASM module must export '{}'",
                    MEMORY_EXPORT
                )))
            }
        }

        for signature in FUNCTION_EXPORTS.iter() {
            let matches = match module.get_export(signature.name) {
                Some(ExternType::Func(func)) => {
                    func.params().len() == signature.params
                        && func.results().len() == signature.results
                        && func.params().all(|p| matches!(p, ValType::I32))
                        && func.results().all(|r| matches!(r, ValType::I32))
                }
                Some(_) => false,
                None if !signature.required => continue,
                None => false,
            };

            if !matches {
                return Err(WasmError::ValidationError(format!(
                    "WASM module must export {}",
                    signature
                )));
            }
        }

        Ok(())
    }
}
