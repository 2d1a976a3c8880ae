// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use wasmtime::{Engine, Module};

use crate::wasm::error::WasmResult;
use crate::wasm::instance::PolicyInstance;

/// Resource limits applied to every instance of a [`PolicyModule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceLimits {
    /// Fuel each instance starts with; never replenished.
    pub fuel: u64,
    /// Cap on the instance's linear memory.
    pub max_memory_bytes: usize,
}

/// A validated, compiled policy module.
///
/// Cloning is cheap and clones can be moved across threads; each call to
/// [`PolicyModule::instantiate`] yields an independent instance with its
/// own memory, policy store and fuel budget.
#[derive(Clone)]
pub struct PolicyModule {
    engine: Engine,
    module: Module,
    name: Arc<str>,
    limits: InstanceLimits,
}

impl PolicyModule {
    pub(crate) fn new(engine: Engine, module: Module, name: &str, limits: InstanceLimits) -> Self {
        Self {
            engine,
            module,
            name: Arc::from(name),
            limits,
        }
    }

    /// Create a fresh instance.
    pub fn instantiate(&self) -> WasmResult<PolicyInstance> {
        PolicyInstance::new(
            &self.engine,
            &self.module,
            Arc::clone(&self.name),
            self.limits,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limits(&self) -> InstanceLimits {
        self.limits
    }

    /// Same module, different fuel budget for new instances.
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.limits.fuel = fuel;
        self
    }

    /// Same module, different memory cap for new instances.
    pub fn with_max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.limits.max_memory_bytes = max_memory_bytes;
        self
    }
}

impl std::fmt::Debug for PolicyModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyModule")
            .field("name", &self.name)
            .field("limits", &self.limits)
            .finish()
    }
}
