// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use cedarwasm::config::WasmConfig;
use cedarwasm::wasm::{PolicyModule, PolicyModuleLoader};

/// A stand-in guest speaking the same integer ABI as the Cedar module.
///
/// Every region is preceded by a 4-byte length header so `load_policies`
/// can recover the declared size from the offset alone. Text counts as a
/// policy set when it starts with `p` or `f`; each `;` is one statement.
pub const MOCK_GUEST: &str = r#"
(module
  (memory (export "memory") 1)
  (global $heap (mut i32) (i32.const 1024))
  (global $count (mut i32) (i32.const 0))
  (global $empty_seen (mut i32) (i32.const 0))

  (func (export "allocate") (param $size i32) (result i32)
    (local $base i32)
    (local $end i32)
    (local $have i32)
    (local.set $base (i32.add (global.get $heap) (i32.const 4)))
    (local.set $end (i32.add (local.get $base) (local.get $size)))
    (local.set $have (i32.mul (memory.size) (i32.const 65536)))
    (if (i32.gt_u (local.get $end) (local.get $have))
      (then
        (if (i32.eq
              (memory.grow
                (i32.add
                  (i32.div_u (i32.sub (local.get $end) (local.get $have)) (i32.const 65536))
                  (i32.const 1)))
              (i32.const -1))
          (then unreachable))))
    (i32.store (global.get $heap) (local.get $size))
    (global.set $heap
      (i32.and (i32.add (local.get $end) (i32.const 7)) (i32.const -8)))
    (local.get $base))

  (func (export "load_policies") (param $ptr i32) (result i32)
    (local $len i32)
    (local $i i32)
    (local $n i32)
    (local $first i32)
    (local.set $len (i32.load (i32.sub (local.get $ptr) (i32.const 4))))
    (if (i32.eqz (local.get $len))
      (then
        (if (global.get $empty_seen)
          (then (return (i32.const 1000))))
        (global.set $empty_seen (i32.const 1))
        (return (i32.const 0))))
    (local.set $first (i32.load8_u (local.get $ptr)))
    (if (i32.and
          (i32.ne (local.get $first) (i32.const 112))
          (i32.ne (local.get $first) (i32.const 102)))
      (then (return (i32.const 1002))))
    (block $done
      (loop $scan
        (br_if $done (i32.ge_u (local.get $i) (local.get $len)))
        (if (i32.eq (i32.load8_u (i32.add (local.get $ptr) (local.get $i))) (i32.const 59))
          (then (local.set $n (i32.add (local.get $n) (i32.const 1)))))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $scan)))
    (if (i32.eqz (local.get $n))
      (then (return (i32.const 1002))))
    (global.set $count (local.get $n))
    (global.set $empty_seen (i32.const 0))
    (i32.const 0))

  (func (export "count_num_policies") (result i32)
    (global.get $count))

  (func (export "allocated_bytes") (result i32)
    (i32.sub (global.get $heap) (i32.const 1024))))
"#;

pub const ALICE_VIEW: &str = r#"permit(principal == User::"alice", action == Action::"view", resource == File::"93");"#;

pub fn module_from_wat(wat: &str, config: &WasmConfig) -> PolicyModule {
    let bytes = wat::parse_str(wat).expect("invalid test WAT");
    PolicyModuleLoader::load_bytes(&bytes, "mock_guest.wasm", config)
        .expect("failed to load test module")
}

pub fn mock_module() -> PolicyModule {
    module_from_wat(MOCK_GUEST, &WasmConfig::default())
}
