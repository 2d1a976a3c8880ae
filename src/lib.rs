// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod abi;           // integer ABI shared with the guest
pub mod config;        // host configuration
pub mod observability;
pub mod report;        // per-load reports for the CLI
pub mod wasm;          // module loading + instance driver
