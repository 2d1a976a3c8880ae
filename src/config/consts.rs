// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default fuel level for a guest instance (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Size of one WASM linear memory page
pub const WASM_PAGE_SIZE: usize = 64 * 1024;
/// Default cap on a guest instance's linear memory (64MB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 64 * 1024 * 1024;

/// Maximum allowed WASM module size (16MB)
pub const DEFAULT_MAX_MODULE_SIZE: usize = 16 * 1024 * 1024;

/// Where the guest build drops the compiled policy store
pub const DEFAULT_MODULE_PATH: &str = "wasm_modules/cedar_policies.wasm";
