// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bump arena backing the exported `allocate` function.
//!
//! Memory handed to the host is carved out of leaked chunks and is never
//! returned: the whole arena lives exactly as long as the module instance.
//! Every region the host has not yet passed to `load_policies` is tracked in
//! an outstanding table keyed by its base address, which is how the load
//! path recovers the declared length from a bare offset.

use std::collections::BTreeMap;
use std::mem;

/// Alignment of every region base.
pub const ALIGN: usize = mem::size_of::<u64>();

/// Size of a regular backing chunk (one wasm page).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A byte range handed out by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub base: usize,
    pub len: usize,
}

impl Region {
    /// View the region as bytes.
    ///
    /// # Safety
    ///
    /// The region must have been produced by a [`BumpArena`] (chunks are
    /// leaked, so the memory stays valid for the rest of the program) and no
    /// one may be writing into it while the returned slice is alive.
    pub unsafe fn bytes(&self) -> &'static [u8] {
        std::slice::from_raw_parts(self.base as *const u8, self.len)
    }
}

#[derive(Debug)]
struct Chunk {
    base: usize,
    capacity: usize,
    used: usize,
}

impl Chunk {
    /// Reserve a zeroed, `ALIGN`-aligned chunk of `capacity` bytes.
    ///
    /// `capacity` must be a multiple of `ALIGN`. Returns `None` when the
    /// allocator cannot satisfy the request.
    fn reserve(capacity: usize) -> Option<Self> {
        let words = capacity / ALIGN;
        let mut backing: Vec<u64> = Vec::new();
        backing.try_reserve_exact(words).ok()?;
        backing.resize(words, 0);
        let base = Box::leak(backing.into_boxed_slice()).as_mut_ptr() as usize;

        Some(Self {
            base,
            capacity,
            used: 0,
        })
    }

    fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    fn bump(&mut self, slot: usize) -> usize {
        let base = self.base + self.used;
        self.used += slot;
        base
    }
}

/// Monotonic bump allocator with an outstanding-region table.
#[derive(Debug)]
pub struct BumpArena {
    current: Option<Chunk>,
    outstanding: BTreeMap<usize, usize>,
    reserved: usize,
}

impl BumpArena {
    pub const fn new() -> Self {
        Self {
            current: None,
            outstanding: BTreeMap::new(),
            reserved: 0,
        }
    }

    /// Reserve a region able to hold `size` bytes.
    ///
    /// Zero-sized requests still consume one aligned slot so that every
    /// outstanding region has a distinct base. Returns `None` if the size
    /// overflows or the backing memory cannot grow.
    pub fn allocate(&mut self, size: usize) -> Option<Region> {
        let slot = size.max(1).checked_next_multiple_of(ALIGN)?;

        let base = if slot > CHUNK_SIZE {
            // oversized requests get their own chunk and leave `current` alone
            Chunk::reserve(slot)?.bump(slot)
        } else {
            match self.current.as_mut() {
                Some(chunk) if chunk.remaining() >= slot => chunk.bump(slot),
                _ => {
                    let mut chunk = Chunk::reserve(CHUNK_SIZE)?;
                    let base = chunk.bump(slot);
                    self.current = Some(chunk);
                    base
                }
            }
        };

        self.reserved += slot;
        self.outstanding.insert(base, size);

        Some(Region { base, len: size })
    }

    /// Consume the outstanding region starting at `base`.
    ///
    /// A base that was never handed out, or was already consumed, yields
    /// `None`.
    pub fn take(&mut self, base: usize) -> Option<Region> {
        self.outstanding
            .remove(&base)
            .map(|len| Region { base, len })
    }

    /// Total bytes reserved so far, including alignment padding.
    pub fn reserved_bytes(&self) -> usize {
        self.reserved
    }

    /// Number of regions handed out and not yet consumed.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

impl Default for BumpArena {
    fn default() -> Self {
        Self::new()
    }
}
