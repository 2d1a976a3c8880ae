// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A live guest instance and the host half of the marshalling protocol.
//!
//! Loading policy text is a three step exchange:
//! 1. `allocate(len)` - the guest reserves a region and returns its offset
//! 2. the host writes exactly `len` bytes at that offset
//! 3. `load_policies(offset)` - the guest consumes the region and returns a
//!    status code
//!
//! The guest owns its memory layout. The host never computes an offset of
//! its own; it only checks that what the guest returned lies inside linear
//! memory before writing.

use std::sync::Arc;

use wasmtime::{
    Engine, Instance, Memory, Module, Store, StoreLimits, StoreLimitsBuilder, Trap, TypedFunc,
};

use crate::abi::{
    StatusCode, ALLOCATED_BYTES_EXPORT, ALLOCATE_EXPORT, COUNT_POLICIES_EXPORT,
    COUNT_TEMPLATES_EXPORT, LOAD_POLICIES_EXPORT, MEMORY_EXPORT,
};
use crate::observability::messages::policy::{
    PoliciesCounted, PoliciesLoaded, PolicyLoadRejected, RegionAllocated,
};
use crate::observability::messages::wasm::{GuestTrapped, InstanceCreated};
use crate::wasm::error::{WasmError, WasmResult};
use crate::wasm::module::InstanceLimits;

/// Per-store host state.
pub struct GuestState {
    limits: StoreLimits,
}

impl GuestState {
    fn new(max_memory_bytes: usize) -> Self {
        Self {
            limits: StoreLimitsBuilder::new()
                .memory_size(max_memory_bytes)
                .instances(1)
                .memories(1)
                .build(),
        }
    }
}

/// A region of guest memory handed out by `allocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestRegion {
    pub offset: u32,
    pub len: u32,
}

impl GuestRegion {
    fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.len)
    }
}

/// One instance of the policy module.
///
/// Calls are synchronous and the instance is never shared between threads
/// while a call runs. Once any method returns a non-recoverable error (see
/// [`WasmError::is_recoverable`]) the instance should be dropped.
pub struct PolicyInstance {
    store: Store<GuestState>,
    memory: Memory,
    allocate: TypedFunc<u32, u32>,
    load_policies: TypedFunc<u32, u32>,
    count_policies: TypedFunc<(), u32>,
    count_templates: Option<TypedFunc<(), u32>>,
    allocated_bytes: Option<TypedFunc<(), u32>>,
    module_name: Arc<str>,
}

impl PolicyInstance {
    pub(crate) fn new(
        engine: &Engine,
        module: &Module,
        module_name: Arc<str>,
        limits: InstanceLimits,
    ) -> WasmResult<Self> {
        let mut store = Store::new(engine, GuestState::new(limits.max_memory_bytes));
        store.limiter(|state| &mut state.limits);
        store
            .set_fuel(limits.fuel)
            .map_err(|e| WasmError::EngineError(e.to_string()))?;

        let instance = Instance::new(&mut store, module, &[])
            .map_err(|e| WasmError::InstantiationError(e.to_string()))?;

        let memory = instance
            .get_memory(&mut store, MEMORY_EXPORT)
            .ok_or_else(|| {
                WasmError::ValidationError(format!("WASM module must export '{}'", MEMORY_EXPORT))
            })?;

        let allocate = required_func::<u32, u32>(&instance, &mut store, ALLOCATE_EXPORT)?;
        let load_policies = required_func::<u32, u32>(&instance, &mut store, LOAD_POLICIES_EXPORT)?;
        let count_policies = required_func::<(), u32>(&instance, &mut store, COUNT_POLICIES_EXPORT)?;
        let count_templates = instance
            .get_typed_func::<(), u32>(&mut store, COUNT_TEMPLATES_EXPORT)
            .ok();
        let allocated_bytes = instance
            .get_typed_func::<(), u32>(&mut store, ALLOCATED_BYTES_EXPORT)
            .ok();

        tracing::debug!(
            "{}",
            InstanceCreated {
                module_name: &module_name,
                fuel_level: limits.fuel,
                max_memory_bytes: limits.max_memory_bytes,
            }
        );

        Ok(Self {
            store,
            memory,
            allocate,
            load_policies,
            count_policies,
            count_templates,
            allocated_bytes,
            module_name,
        })
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Ask the guest to reserve `size` bytes.
    ///
    /// A guest that cannot satisfy the request traps, which surfaces here
    /// as a fatal [`WasmError::Trap`].
    pub fn allocate(&mut self, size: usize) -> WasmResult<GuestRegion> {
        let len = u32::try_from(size).map_err(|_| {
            WasmError::ValidationError(format!(
                "{} bytes do not fit the guest's 32-bit address space",
                size
            ))
        })?;

        let offset = self
            .allocate
            .call(&mut self.store, len)
            .map_err(|e| self.call_failed(ALLOCATE_EXPORT, e))?;
        let region = GuestRegion { offset, len };

        let memory_size = self.memory.data_size(&self.store) as u64;
        if region.end() > memory_size {
            return Err(WasmError::OutOfBounds(format!(
                "guest returned region [{:#x}, {:#x}) beyond linear memory of {} bytes",
                region.offset,
                region.end(),
                memory_size
            )));
        }

        tracing::trace!(
            "{}",
            RegionAllocated {
                module_name: &self.module_name,
                offset,
                len,
            }
        );
        Ok(region)
    }

    /// Write `bytes` into `region`. The length must match the declared size
    /// exactly, since the guest reads back precisely that many bytes.
    pub fn write_region(&mut self, region: GuestRegion, bytes: &[u8]) -> WasmResult<()> {
        if bytes.len() != region.len as usize {
            return Err(WasmError::ValidationError(format!(
                "region at {:#x} was declared for {} bytes, refusing to write {}",
                region.offset,
                region.len,
                bytes.len()
            )));
        }

        self.memory
            .write(&mut self.store, region.offset as usize, bytes)
            .map_err(|e| {
                WasmError::OutOfBounds(format!(
                    "failed to write {} bytes at {:#x}: {}",
                    bytes.len(),
                    region.offset,
                    e
                ))
            })
    }

    /// Hand a written region to `load_policies` and decode the status.
    pub fn load_region(&mut self, region: GuestRegion) -> WasmResult<StatusCode> {
        let raw = self
            .load_policies
            .call(&mut self.store, region.offset)
            .map_err(|e| self.call_failed(LOAD_POLICIES_EXPORT, e))?;
        Ok(StatusCode::from_raw(raw))
    }

    /// Run the full allocate / write / load exchange and return the raw
    /// status code exactly as the guest produced it.
    pub fn load_policies_raw(&mut self, bytes: &[u8]) -> WasmResult<u32> {
        let region = self.allocate(bytes.len())?;
        self.write_region(region, bytes)?;
        let status = self.load_region(region)?;

        match status.into_result() {
            Ok(()) => tracing::info!(
                "{}",
                PoliciesLoaded {
                    module_name: &self.module_name,
                    input_size: bytes.len(),
                }
            ),
            Err(rejection) => {
                let reason = rejection.to_string();
                tracing::warn!(
                    "{}",
                    PolicyLoadRejected {
                        module_name: &self.module_name,
                        status_code: rejection.code(),
                        reason: &reason,
                    }
                );
            }
        }

        Ok(status.raw())
    }

    /// Load Cedar policy text into the guest.
    ///
    /// Guest rejections come back as [`WasmError::PolicyRejected`]; the
    /// instance remains usable after them.
    pub fn load_policies(&mut self, text: &str) -> WasmResult<()> {
        self.load_bytes(text.as_bytes())
    }

    /// Same as [`load_policies`](Self::load_policies), for text that has not
    /// been checked for UTF-8 yet. The guest does the checking.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> WasmResult<()> {
        let raw = self.load_policies_raw(bytes)?;
        StatusCode::from_raw(raw)
            .into_result()
            .map_err(WasmError::PolicyRejected)
    }

    /// Number of policies the guest currently holds.
    pub fn count_num_policies(&mut self) -> WasmResult<u32> {
        let count = self
            .count_policies
            .call(&mut self.store, ())
            .map_err(|e| self.call_failed(COUNT_POLICIES_EXPORT, e))?;

        tracing::debug!(
            "{}",
            PoliciesCounted {
                module_name: &self.module_name,
                count,
            }
        );
        Ok(count)
    }

    /// Number of templates the guest holds, if it exports that query.
    pub fn count_num_templates(&mut self) -> WasmResult<Option<u32>> {
        let Some(func) = self.count_templates.clone() else {
            return Ok(None);
        };
        func.call(&mut self.store, ())
            .map(Some)
            .map_err(|e| self.call_failed(COUNT_TEMPLATES_EXPORT, e))
    }

    /// Bytes reserved by the guest allocator, if it exports that query.
    pub fn allocated_bytes(&mut self) -> WasmResult<Option<u32>> {
        let Some(func) = self.allocated_bytes.clone() else {
            return Ok(None);
        };
        func.call(&mut self.store, ())
            .map(Some)
            .map_err(|e| self.call_failed(ALLOCATED_BYTES_EXPORT, e))
    }

    /// Fuel left in this instance's budget.
    pub fn remaining_fuel(&self) -> Option<u64> {
        self.store.get_fuel().ok()
    }

    /// Current size of the guest's linear memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    fn call_failed(&self, function: &'static str, error: wasmtime::Error) -> WasmError {
        let err = match error.downcast_ref::<Trap>() {
            Some(Trap::OutOfFuel) => WasmError::OutOfFuel { function },
            _ => WasmError::Trap {
                function,
                reason: format!("{:#}", error),
            },
        };

        tracing::error!(
            "{}",
            GuestTrapped {
                module_name: &self.module_name,
                function,
                error: &err,
            }
        );
        err
    }
}

fn required_func<Params, Results>(
    instance: &Instance,
    store: &mut Store<GuestState>,
    name: &str,
) -> WasmResult<TypedFunc<Params, Results>>
where
    Params: wasmtime::WasmParams,
    Results: wasmtime::WasmResults,
{
    instance
        .get_typed_func::<Params, Results>(&mut *store, name)
        .map_err(|e| {
            WasmError::ValidationError(format!("WASM module export '{}' unusable: {}", name, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_end_does_not_overflow() {
        let region = GuestRegion {
            offset: u32::MAX,
            len: u32::MAX,
        };
        assert_eq!(region.end(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_guest_state_limits_build() {
        // One page cap; constructing the limiter must not panic
        let _state = GuestState::new(64 * 1024);
    }
}
