// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cedar policy store exposed as a C-style WASM module.
//!
//! The host drives the module through a narrow integer ABI:
//!
//! 1. `allocate(size)` reserves `size` bytes and returns their offset
//! 2. the host writes UTF-8 policy text at that offset
//! 3. `load_policies(offset)` parses the text and returns a status code
//! 4. `count_num_policies()` reports how many policies are held
//!
//! Status codes are defined in [`status`]. Expected failures never trap;
//! only an allocation that cannot be satisfied aborts the instance.

pub mod arena;
pub mod status;
pub mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};

use arena::BumpArena;
use status::{status_of, LoadError};
use store::PolicyStore;

static ARENA: Mutex<BumpArena> = Mutex::new(BumpArena::new());
static POLICIES: Mutex<PolicyStore> = Mutex::new(PolicyStore::new());

// A module instance is single threaded; the locks only satisfy `static`.
fn arena() -> MutexGuard<'static, BumpArena> {
    ARENA.lock().unwrap_or_else(PoisonError::into_inner)
}

fn policies() -> MutexGuard<'static, PolicyStore> {
    POLICIES.lock().unwrap_or_else(PoisonError::into_inner)
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Reserve `size` bytes of linear memory for the host to write into.
///
/// The region stays reserved until it is consumed by `load_policies`; its
/// memory is never reused. If the request cannot be satisfied the instance
/// is aborted, since no valid region can be returned.
#[no_mangle]
pub extern "C" fn allocate(size: usize) -> *mut u8 {
    match arena().allocate(size) {
        Some(region) => region.base as *mut u8,
        None => std::process::abort(),
    }
}

/// Parse the policy text previously written at `ptr` and apply it.
///
/// `ptr` must come from `allocate`, and the host must have written exactly
/// the declared number of bytes there. Returns `0` on success or one of the
/// non-zero codes in [`status`].
#[no_mangle]
pub extern "C" fn load_policies(ptr: *const u8) -> u32 {
    let region = arena().take(ptr as usize);
    let result = match region {
        // SAFETY: the region came out of the arena and was consumed above,
        // so nothing else reads or hands it out again.
        Some(region) => policies().load(unsafe { region.bytes() }),
        None => Err(LoadError::UnknownRegion),
    };
    status_of(&result)
}

/// Number of policies currently held.
#[no_mangle]
pub extern "C" fn count_num_policies() -> u32 {
    saturate(policies().count_policies())
}

/// Number of policy templates currently held.
#[no_mangle]
pub extern "C" fn count_num_templates() -> u32 {
    saturate(policies().count_templates())
}

/// Total bytes reserved by the allocator so far.
#[no_mangle]
pub extern "C" fn allocated_bytes() -> u32 {
    saturate(arena().reserved_bytes())
}
