// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for WASM module loading and instance lifecycle events.

use std::fmt::{Display, Formatter};

/// WASM module loaded and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use cedarwasm::observability::messages::wasm::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_name: "wasm_modules/cedar_policies.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_name: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded WASM module: {} ({} bytes)",
            self.module_name, self.size_bytes
        )
    }
}

/// WASM module loading failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use cedarwasm::observability::messages::wasm::ModuleLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let msg = ModuleLoadFailed {
///     module_name: "wasm_modules/missing.wasm",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ModuleLoadFailed<'a> {
    pub module_name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load WASM module '{}': {}",
            self.module_name, self.error
        )
    }
}

/// WASM binary encoding detected.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct EncodingDetected<'a> {
    pub module_name: &'a str,
    pub encoding: &'a str,
}

impl Display for EncodingDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Detected {} encoding for module: {}",
            self.encoding, self.module_name
        )
    }
}

/// Guest instance created with its resource limits.
///
/// # Log Level
/// `debug!` - One per load cycle, too chatty for `info!`
///
/// # Example
/// ```
/// use cedarwasm::observability::messages::wasm::InstanceCreated;
///
/// let msg = InstanceCreated {
///     module_name: "cedar_policies.wasm",
///     fuel_level: 100_000_000,
///     max_memory_bytes: 64 * 1024 * 1024,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct InstanceCreated<'a> {
    pub module_name: &'a str,
    pub fuel_level: u64,
    pub max_memory_bytes: usize,
}

impl Display for InstanceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Instantiated '{}' with fuel_level={} max_memory_bytes={}",
            self.module_name, self.fuel_level, self.max_memory_bytes
        )
    }
}

/// A guest export trapped or ran out of fuel.
///
/// # Log Level
/// `error!` - The instance is unusable afterwards
///
/// # Example
/// ```
/// use cedarwasm::observability::messages::wasm::GuestTrapped;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "unreachable");
/// let msg = GuestTrapped {
///     module_name: "cedar_policies.wasm",
///     function: "allocate",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct GuestTrapped<'a> {
    pub module_name: &'a str,
    pub function: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for GuestTrapped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest '{}' trapped in '{}': {}",
            self.module_name, self.function, self.error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_loaded() {
        let msg = ModuleLoaded {
            module_name: "policies.wasm",
            size_bytes: 10,
        };
        assert_eq!(msg.to_string(), "Loaded WASM module: policies.wasm (10 bytes)");
    }

    #[test]
    fn test_instance_created() {
        let msg = InstanceCreated {
            module_name: "policies.wasm",
            fuel_level: 5,
            max_memory_bytes: 65536,
        };
        assert_eq!(
            msg.to_string(),
            "Instantiated 'policies.wasm' with fuel_level=5 max_memory_bytes=65536"
        );
    }
}
