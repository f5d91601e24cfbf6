// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Handle allocation with generation recycling.

use std::collections::BTreeSet;
use strata_core::{Handle, ResourceKind, ResourceKindId};

/// One allocator slot.
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Bumped on every occupied to free transition.
    generation: u32,
    /// The kind currently occupying the slot, `None` while free.
    occupant: Option<ResourceKindId>,
}

/// Issues and invalidates `(index, generation)` handles.
///
/// Every resource kind draws from one shared index space. A slot remembers the
/// kind that occupies it, so a handle reinterpreted as another kind never
/// validates. Freed indices are reused lowest first.
///
/// Allocation and freeing never fail. Using a freed handle is detected by the
/// caller of [`is_valid`](Self::is_valid), typically a
/// [`ResourcePool`](crate::ResourcePool).
#[derive(Debug, Clone, Default)]
pub struct HandleAllocator {
    slots: Vec<Slot>,
    free: BTreeSet<u32>,
    live: [usize; 6],
}

impl HandleAllocator {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty allocator with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Allocates a handle of kind `K`.
    ///
    /// Reuses the lowest free index if there is one, at the generation its last
    /// free left it at. Otherwise appends a fresh slot at generation 0.
    pub fn allocate<K: ResourceKind>(&mut self) -> Handle<K> {
        self.live[kind_index(K::KIND)] += 1;

        if let Some(index) = self.free.pop_first() {
            let slot = &mut self.slots[index as usize];
            slot.occupant = Some(K::KIND);
            return Handle::from_parts(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            occupant: Some(K::KIND),
        });
        Handle::from_parts(index, 0)
    }

    /// Frees a handle, making it and every copy of it invalid for good.
    ///
    /// Returns `false`, and changes nothing, if the handle was not valid.
    /// The generation wraps at `u32::MAX`; a wrap is not detected.
    pub fn free<K: ResourceKind>(&mut self, handle: Handle<K>) -> bool {
        if !self.is_valid(handle) {
            log::warn!("Ignoring free of stale handle {handle:?}");
            return false;
        }

        let slot = &mut self.slots[handle.index() as usize];
        slot.occupant = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.insert(handle.index());
        self.live[kind_index(K::KIND)] -= 1;
        true
    }

    /// Returns `true` if `handle` names a live resource of kind `K`.
    ///
    /// Read-only; safe to call at any time.
    pub fn is_valid<K: ResourceKind>(&self, handle: Handle<K>) -> bool {
        self.slots
            .get(handle.index() as usize)
            .is_some_and(|slot| {
                slot.occupant == Some(K::KIND) && slot.generation == handle.generation()
            })
    }

    /// Frees every live handle at once. Used when the device is lost.
    ///
    /// Returns the number of handles invalidated.
    pub fn invalidate_all(&mut self) -> usize {
        let mut count = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.occupant.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.insert(index as u32);
                count += 1;
            }
        }
        self.live = Default::default();
        count
    }

    /// The number of live handles of every kind.
    pub fn live_count(&self) -> usize {
        self.live.iter().sum()
    }

    /// The number of live handles of one kind.
    pub fn live_count_of(&self, kind: ResourceKindId) -> usize {
        self.live[kind_index(kind)]
    }

    /// The number of slots ever created, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

fn kind_index(kind: ResourceKindId) -> usize {
    match kind {
        ResourceKindId::Buffer => 0,
        ResourceKindId::Texture => 1,
        ResourceKindId::Framebuffer => 2,
        ResourceKindId::Sampler => 3,
        ResourceKindId::ShaderProgram => 4,
        ResourceKindId::Pipeline => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{BufferHandle, SamplerHandle, TextureHandle};

    #[test]
    fn first_allocation_is_index_zero_generation_zero() {
        let mut allocator = HandleAllocator::new();

        let handle: BufferHandle = allocator.allocate();

        assert_eq!(handle.index(), 0);
        assert_eq!(handle.generation(), 0);
        assert!(allocator.is_valid(handle));
    }

    #[test]
    fn reuse_bumps_generation_by_exactly_one() {
        // --- ARRANGE ---
        let mut allocator = HandleAllocator::new();
        let first: BufferHandle = allocator.allocate();

        // --- ACT ---
        assert!(allocator.free(first));
        let second: BufferHandle = allocator.allocate();

        // --- ASSERT ---
        assert_eq!(second.index(), first.index());
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!allocator.is_valid(first), "A freed handle must stay invalid");
        assert!(allocator.is_valid(second));
    }

    #[test]
    fn freed_handle_stays_invalid_across_many_reuses() {
        let mut allocator = HandleAllocator::new();
        let original: TextureHandle = allocator.allocate();
        allocator.free(original);

        for _ in 0..100 {
            let reused: TextureHandle = allocator.allocate();
            assert!(!allocator.is_valid(original));
            allocator.free(reused);
        }
        assert!(!allocator.is_valid(original));
    }

    #[test]
    fn lowest_free_index_is_reused_first() {
        let mut allocator = HandleAllocator::new();
        let handles: Vec<BufferHandle> = (0..4).map(|_| allocator.allocate()).collect();

        allocator.free(handles[3]);
        allocator.free(handles[1]);

        let next: BufferHandle = allocator.allocate();
        assert_eq!(next.index(), 1);
        let after: BufferHandle = allocator.allocate();
        assert_eq!(after.index(), 3);
        let fresh: BufferHandle = allocator.allocate();
        assert_eq!(fresh.index(), 4);
    }

    #[test]
    fn index_space_is_shared_across_kinds() {
        // --- ARRANGE ---
        let mut allocator = HandleAllocator::new();
        let buffer: BufferHandle = allocator.allocate();
        allocator.free(buffer);

        // --- ACT ---
        let texture: TextureHandle = allocator.allocate();

        // --- ASSERT ---
        assert_eq!((texture.index(), texture.generation()), (0, 1));
        let forged = BufferHandle::from_raw(texture.to_raw());
        assert!(
            !allocator.is_valid(forged),
            "A texture slot must not validate a buffer handle"
        );
        assert!(allocator.is_valid(texture));
    }

    #[test]
    fn double_free_is_ignored() {
        let mut allocator = HandleAllocator::new();
        let sampler: SamplerHandle = allocator.allocate();

        assert!(allocator.free(sampler));
        assert!(!allocator.free(sampler));

        let next: SamplerHandle = allocator.allocate();
        assert_eq!(next.generation(), 1, "A rejected free must not bump the generation");
    }

    #[test]
    fn generation_wraps_without_detection() {
        let mut allocator = HandleAllocator::new();
        let handle: BufferHandle = allocator.allocate();
        allocator.slots[0].generation = u32::MAX;
        let handle = BufferHandle::from_parts(handle.index(), u32::MAX);

        allocator.free(handle);
        let wrapped: BufferHandle = allocator.allocate();

        assert_eq!(wrapped.generation(), 0);
    }

    #[test]
    fn invalidate_all_kills_every_handle() {
        let mut allocator = HandleAllocator::new();
        let buffer: BufferHandle = allocator.allocate();
        let texture: TextureHandle = allocator.allocate();
        let freed: BufferHandle = allocator.allocate();
        allocator.free(freed);

        let count = allocator.invalidate_all();

        assert_eq!(count, 2);
        assert!(!allocator.is_valid(buffer));
        assert!(!allocator.is_valid(texture));
        assert_eq!(allocator.live_count(), 0);
        let next: BufferHandle = allocator.allocate();
        assert_eq!(next.index(), 0);
        assert_eq!(next.generation(), 1);
    }

    #[test]
    fn live_counts_per_kind() {
        let mut allocator = HandleAllocator::with_capacity(8);
        let _a: BufferHandle = allocator.allocate();
        let b: BufferHandle = allocator.allocate();
        let _t: TextureHandle = allocator.allocate();
        allocator.free(b);

        assert_eq!(allocator.live_count_of(ResourceKindId::Buffer), 1);
        assert_eq!(allocator.live_count_of(ResourceKindId::Texture), 1);
        assert_eq!(allocator.live_count(), 2);
        assert_eq!(allocator.slot_count(), 3);
    }
}
