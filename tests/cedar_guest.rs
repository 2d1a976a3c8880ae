// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host/guest scenarios run against the real Cedar guest.
//!
//! Build the guest first with `make -C wasm_modules/cedar_policies build`,
//! which compiles it for wasm32-unknown-unknown and copies it to
//! `wasm_modules/cedar_policies.wasm`. Scenario tests are skipped when it is
//! missing; `cargo test -- --ignored` fails loudly instead.

mod common;

use cedarwasm::abi::LoadRejection;
use cedarwasm::config::WasmConfig;
use cedarwasm::wasm::{PolicyModule, PolicyModuleLoader};
use std::path::PathBuf;

const POLICIES_1: &str = r#"
permit(
	principal == User::"alice",
	action == Action::"view",
	resource == File::"93"
);"#;

const TWO_POLICIES: &str = r#"
permit(principal, action == Action::"view", resource);
forbid(principal == User::"mallory", action, resource);
"#;

const BUILD_HINT: &str = "Run 'make -C wasm_modules/cedar_policies build' to compile the guest.";

fn guest_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("wasm_modules/cedar_policies.wasm")
}

fn cedar_module() -> Option<PolicyModule> {
    let wasm_path = guest_path();

    if !wasm_path.exists() {
        eprintln!(
            "Skipping test: {} not found. {}",
            wasm_path.display(),
            BUILD_HINT
        );
        return None;
    }

    Some(
        PolicyModuleLoader::load_module(&wasm_path, &WasmConfig::default())
            .expect("Failed to load cedar_policies module"),
    )
}

#[test]
#[ignore = "needs the built guest: make -C wasm_modules/cedar_policies build"]
fn test_guest_artifact_is_built() {
    let wasm_path = guest_path();
    assert!(
        wasm_path.exists(),
        "{} not found. {}",
        wasm_path.display(),
        BUILD_HINT
    );

    // import-free and every export has the i32 shape the host expects
    PolicyModuleLoader::load_module(&wasm_path, &WasmConfig::default())
        .expect("built guest failed host validation");
}

#[test]
fn test_invalid_policy() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    assert_eq!(instance.load_policies_raw(b"bogus").unwrap(), 1002);
    assert_eq!(instance.count_num_policies().unwrap(), 0);
}

#[test]
fn test_empty_policy_twice() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    assert_eq!(instance.load_policies_raw(b"").unwrap(), 0);
    assert_eq!(instance.load_policies_raw(b"").unwrap(), 1000);
}

#[test]
fn test_load_policies() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    assert_eq!(instance.load_policies_raw(POLICIES_1.as_bytes()).unwrap(), 0);
    assert_eq!(instance.count_num_policies().unwrap(), 1);
}

#[test]
fn test_load_empty_policy() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    assert_eq!(instance.load_policies_raw(b"").unwrap(), 0);
    assert_eq!(instance.count_num_policies().unwrap(), 0);
}

#[test]
fn test_replace_and_reject_sequence() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    instance.load_policies(TWO_POLICIES).unwrap();
    assert_eq!(instance.count_num_policies().unwrap(), 2);

    instance.load_policies(common::ALICE_VIEW).unwrap();
    assert_eq!(instance.count_num_policies().unwrap(), 1);

    let err = instance.load_policies("permit(principal, action, resource)").unwrap_err();
    assert_eq!(err.rejection(), Some(LoadRejection::ParseError));
    assert_eq!(instance.count_num_policies().unwrap(), 1);

    let err = instance.load_bytes(b"permit(\xF0\x28\x8C\xBC);").unwrap_err();
    assert_eq!(err.rejection(), Some(LoadRejection::InvalidUtf8));
    assert_eq!(instance.count_num_policies().unwrap(), 1);
}

#[test]
fn test_templates_and_allocator_introspection() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    let before = instance.allocated_bytes().unwrap().unwrap();
    instance
        .load_policies("permit(principal == ?principal, action, resource);")
        .unwrap();

    assert_eq!(instance.count_num_templates().unwrap(), Some(1));
    assert_eq!(instance.count_num_policies().unwrap(), 0);
    assert!(instance.allocated_bytes().unwrap().unwrap() > before);
}

#[test]
fn test_consumed_region_cannot_be_reloaded() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    let region = instance.allocate(common::ALICE_VIEW.len()).unwrap();
    instance
        .write_region(region, common::ALICE_VIEW.as_bytes())
        .unwrap();
    assert!(instance.load_region(region).unwrap().is_ok());

    let second = instance.load_region(region).unwrap();
    assert_eq!(second.into_result(), Err(LoadRejection::UnknownRegion));
    assert_eq!(instance.count_num_policies().unwrap(), 1);
}

#[test]
fn test_blank_text_replaces_policy_set() {
    let Some(module) = cedar_module() else { return };
    let mut instance = module.instantiate().unwrap();

    instance.load_policies(TWO_POLICIES).unwrap();
    assert_eq!(instance.load_policies_raw(b"\n").unwrap(), 0);
    assert_eq!(instance.count_num_policies().unwrap(), 0);

    assert_eq!(instance.load_policies_raw(b"// comment\n").unwrap(), 0);
    assert_eq!(instance.load_policies_raw(b"").unwrap(), 0);
    assert_eq!(instance.load_policies_raw(b"").unwrap(), 1000);
}
