// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_FUEL_LEVEL, DEFAULT_MAX_MEMORY_BYTES, DEFAULT_MAX_MODULE_SIZE, DEFAULT_MODULE_PATH,
    MAX_FUEL_LEVEL, MIN_FUEL_LEVEL, WASM_PAGE_SIZE,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a host configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// Host configuration for driving the Cedar policy module.
///
/// Every field is optional; an empty document yields the built-in defaults.
///
/// # Example
/// ```yaml
/// module: wasm_modules/cedar_policies.wasm
/// wasm:
///   max_module_size: 16777216
///   fuel:
///     default: 100000000
///   memory:
///     max_bytes: 67108864
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct HostConfig {
    pub module: Option<PathBuf>,
    #[serde(default)]
    pub wasm: WasmConfig,
}

impl HostConfig {
    /// Path of the guest module, falling back to the default build output.
    pub fn module_path(&self) -> PathBuf {
        self.module
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_PATH))
    }
}

/// WASM-specific configuration options.
///
/// These options control the resource limits each guest instance runs
/// under.
///
/// # Fields
/// * `fuel` - Fuel consumption configuration for execution limits
/// * `memory` - Linear memory cap per instance
/// * `max_module_size` - Largest module binary accepted by the loader
#[derive(Debug, Default, Deserialize)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    pub max_module_size: Option<usize>,
}

impl WasmConfig {
    pub fn get_max_module_size(&self) -> usize {
        self.max_module_size.unwrap_or(DEFAULT_MAX_MODULE_SIZE)
    }
}

/// Fuel consumption configuration for WASM execution.
///
/// Fuel limits prevent runaway parsing by limiting the number of
/// instructions a guest instance can execute over its lifetime. All values
/// are optional and validated against security bounds.
///
/// # Example
/// ```yaml
/// fuel:
///   default: 100000000   # 100 million instructions
///   minimum: 1000000     # 1 million instructions
///   maximum: 500000000   # 500 million instructions (hard limit)
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    /// Get the default fuel level, using built-in default if not configured.
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    /// Get the minimum fuel level, using built-in default if not configured.
    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    /// Get the maximum fuel level, using built-in default if not configured.
    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Validate and clamp a fuel level to configured bounds.
    ///
    /// # Example
    /// ```
    /// use cedarwasm::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// let fuel = config.validate_and_clamp(1_000_000_000); // Too high
    /// assert_eq!(fuel, 500_000_000); // Clamped to maximum
    /// ```
    ///
    /// Inverted bounds never panic here; the maximum wins. Use
    /// [`FuelConfig::effective`] to have them reported instead.
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        let min = self.get_minimum();
        let max = self.get_maximum();

        if requested < min || requested > max {
            tracing::warn!(
                "Requested fuel {} outside [{}, {}], clamping",
                requested,
                min,
                max
            );
        }
        requested.max(min).min(max)
    }

    /// Fuel each new instance starts with.
    pub fn effective(&self) -> Result<u64, ConfigError> {
        let (min, max) = (self.get_minimum(), self.get_maximum());
        if min > max {
            return Err(ConfigError::Invalid(vec![inverted_fuel_bounds(min, max)]));
        }
        Ok(self.validate_and_clamp(self.get_default()))
    }
}

/// Linear memory cap for each guest instance.
#[derive(Debug, Default, Deserialize)]
pub struct MemoryConfig {
    pub max_bytes: Option<usize>,
}

impl MemoryConfig {
    pub fn get_max_bytes(&self) -> usize {
        self.max_bytes.unwrap_or(DEFAULT_MAX_MEMORY_BYTES)
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HostConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: HostConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<HostConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn inverted_fuel_bounds(min: u64, max: u64) -> String {
    format!("fuel minimum {} exceeds fuel maximum {}", min, max)
}

/// Check the limits in `cfg` for internal consistency.
pub fn validate_config(cfg: &HostConfig) -> Result<(), ConfigError> {
    let mut problems = Vec::new();
    let fuel = &cfg.wasm.fuel;

    if fuel.get_minimum() > fuel.get_maximum() {
        problems.push(inverted_fuel_bounds(fuel.get_minimum(), fuel.get_maximum()));
    }
    if fuel.get_minimum() == 0 {
        problems.push("fuel minimum must be greater than zero".to_string());
    }

    let max_bytes = cfg.wasm.memory.get_max_bytes();
    if max_bytes < WASM_PAGE_SIZE {
        problems.push(format!(
            "memory max_bytes {} is smaller than one WASM page ({} bytes)",
            max_bytes, WASM_PAGE_SIZE
        ));
    }

    if cfg.wasm.get_max_module_size() == 0 {
        problems.push("max_module_size must be greater than zero".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(problems))
    }
}
