// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod detector;
pub mod error;
pub mod instance;
pub mod module;
pub mod module_loader;

pub use detector::{detect_encoding, require_core_module, ModuleEncoding};
pub use error::{WasmError, WasmResult};
pub use instance::{GuestRegion, PolicyInstance};
pub use module::{InstanceLimits, PolicyModule};
pub use module_loader::PolicyModuleLoader;
