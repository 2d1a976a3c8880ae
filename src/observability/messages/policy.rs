// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the allocate / load / count exchange with the guest.

use std::fmt::{Display, Formatter};

/// Guest reserved a region for the host to write into.
///
/// # Log Level
/// `trace!` - Per-call detail
pub struct RegionAllocated<'a> {
    pub module_name: &'a str,
    pub offset: u32,
    pub len: u32,
}

impl Display for RegionAllocated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest '{}' allocated {} bytes at offset {:#x}",
            self.module_name, self.len, self.offset
        )
    }
}

/// Guest accepted the supplied policy text.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use cedarwasm::observability::messages::policy::PoliciesLoaded;
///
/// let msg = PoliciesLoaded {
///     module_name: "cedar_policies.wasm",
///     input_size: 128,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PoliciesLoaded<'a> {
    pub module_name: &'a str,
    pub input_size: usize,
}

impl Display for PoliciesLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest '{}' accepted policy text: input_size={} bytes",
            self.module_name, self.input_size
        )
    }
}

/// Guest rejected the supplied policy text with a non-zero status.
///
/// # Log Level
/// `warn!` - Recoverable; the instance remains usable
pub struct PolicyLoadRejected<'a> {
    pub module_name: &'a str,
    pub status_code: u32,
    pub reason: &'a str,
}

impl Display for PolicyLoadRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest '{}' rejected policy text with status {}: {}",
            self.module_name, self.status_code, self.reason
        )
    }
}

/// Policy count queried from the guest.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PoliciesCounted<'a> {
    pub module_name: &'a str,
    pub count: u32,
}

impl Display for PoliciesCounted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Guest '{}' holds {} policies",
            self.module_name, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_allocated_hex_offset() {
        let msg = RegionAllocated {
            module_name: "m",
            offset: 1024,
            len: 5,
        };
        assert_eq!(msg.to_string(), "Guest 'm' allocated 5 bytes at offset 0x400");
    }

    #[test]
    fn test_rejected() {
        let msg = PolicyLoadRejected {
            module_name: "m",
            status_code: 1000,
            reason: "empty policy set already loaded",
        };
        assert_eq!(
            msg.to_string(),
            "Guest 'm' rejected policy text with status 1000: empty policy set already loaded"
        );
    }
}
