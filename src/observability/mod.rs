// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! This module provides centralized message types for diagnostic and
//! operational logging. Message types follow a struct-based pattern with a
//! `Display` implementation so that log text lives in one place instead of
//! being scattered across call sites.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::wasm` - module loading, engine and instance lifecycle, traps
//! * `messages::policy` - the allocate / load / count exchange with the guest
//!
//! # Usage
//!
//! ```rust
//! use cedarwasm::observability::messages::policy::PolicyLoadRejected;
//!
//! let msg = PolicyLoadRejected {
//!     module_name: "cedar_policies.wasm",
//!     status_code: 1002,
//!     reason: "policy text failed to parse",
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

pub mod messages;
