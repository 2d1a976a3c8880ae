// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `wasm` - module loading, engine and instance lifecycle, traps
//! * `policy` - the allocate / load / count exchange with the guest

pub mod policy;
pub mod wasm;
