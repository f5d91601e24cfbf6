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

//! Per-kind, index-addressed resource storage.

use crate::HandleAllocator;
use std::marker::PhantomData;
use strata_core::{Handle, InvalidHandleError, ResourceKind};

/// Stores the resources of one kind, addressed by handle index.
///
/// Every read goes through the [`HandleAllocator`] first: a handle that does
/// not validate there never reaches a stored value. The lookup methods are
/// `#[track_caller]`, so the [`InvalidHandleError`] they return names the
/// line that used the stale handle.
#[derive(Debug)]
pub struct ResourcePool<K: ResourceKind, T> {
    /// Sparse: the index space is shared with other kinds.
    entries: Vec<Option<(u32, T)>>,
    len: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind, T> Default for ResourcePool<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            _kind: PhantomData,
        }
    }
}

impl<K: ResourceKind, T> ResourcePool<K, T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under a freshly allocated `handle`.
    ///
    /// The handle must come straight from [`HandleAllocator::allocate`]; a
    /// value still stored at that index is replaced and returned.
    pub fn store(&mut self, handle: Handle<K>, value: T) -> Option<T> {
        let index = handle.index() as usize;
        if index >= self.entries.len() {
            self.entries.resize_with(index + 1, || None);
        }
        let previous = self.entries[index].replace((handle.generation(), value));
        if previous.is_none() {
            self.len += 1;
        }
        previous.map(|(_, value)| value)
    }

    /// Resolves a handle.
    #[track_caller]
    pub fn get(&self, allocator: &HandleAllocator, handle: Handle<K>) -> Result<&T, InvalidHandleError> {
        if !allocator.is_valid(handle) {
            return Err(InvalidHandleError::new(handle));
        }
        match self.entries.get(handle.index() as usize) {
            Some(Some((generation, value))) if *generation == handle.generation() => Ok(value),
            _ => Err(InvalidHandleError::new(handle)),
        }
    }

    /// Resolves a handle mutably.
    #[track_caller]
    pub fn get_mut(
        &mut self,
        allocator: &HandleAllocator,
        handle: Handle<K>,
    ) -> Result<&mut T, InvalidHandleError> {
        if !allocator.is_valid(handle) {
            return Err(InvalidHandleError::new(handle));
        }
        match self.entries.get_mut(handle.index() as usize) {
            Some(Some((generation, value))) if *generation == handle.generation() => Ok(value),
            _ => Err(InvalidHandleError::new(handle)),
        }
    }

    /// Detaches the value stored for a valid handle.
    ///
    /// The handle itself is not freed here; the caller frees it in the same
    /// step, so no state exposes a freed handle that still resolves.
    #[track_caller]
    pub fn remove(
        &mut self,
        allocator: &HandleAllocator,
        handle: Handle<K>,
    ) -> Result<T, InvalidHandleError> {
        if !allocator.is_valid(handle) {
            return Err(InvalidHandleError::new(handle));
        }
        let index = handle.index() as usize;
        match self.entries.get(index) {
            Some(Some((generation, _))) if *generation == handle.generation() => {}
            _ => return Err(InvalidHandleError::new(handle)),
        }
        match self.entries[index].take() {
            Some((_, value)) => {
                self.len -= 1;
                Ok(value)
            }
            None => Err(InvalidHandleError::new(handle)),
        }
    }

    /// Iterates over every stored value with the handle it was stored under.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<K>, &T)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .as_ref()
                .map(|(generation, value)| (Handle::from_parts(index as u32, *generation), value))
        })
    }

    /// Removes and returns every stored value.
    pub fn drain(&mut self) -> Vec<(Handle<K>, T)> {
        self.len = 0;
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry
                    .take()
                    .map(|(generation, value)| (Handle::from_parts(index as u32, generation), value))
            })
            .collect()
    }

    /// The number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{kind, BufferHandle, TextureHandle};

    #[test]
    fn get_revalidates_through_the_allocator() {
        // --- ARRANGE ---
        let mut allocator = HandleAllocator::new();
        let mut pool: ResourcePool<kind::Buffer, &str> = ResourcePool::new();
        let handle: BufferHandle = allocator.allocate();
        pool.store(handle, "vertices");

        // --- ACT ---
        allocator.free(handle);

        // --- ASSERT ---
        assert!(
            pool.get(&allocator, handle).is_err(),
            "A freed handle must not resolve, even before removal"
        );
    }

    #[test]
    fn remove_detaches_the_value() {
        let mut allocator = HandleAllocator::new();
        let mut pool: ResourcePool<kind::Texture, u64> = ResourcePool::new();
        let handle: TextureHandle = allocator.allocate();
        pool.store(handle, 42);

        let value = pool.remove(&allocator, handle).unwrap();
        allocator.free(handle);

        assert_eq!(value, 42);
        assert!(pool.is_empty());
        assert!(pool.remove(&allocator, handle).is_err());
    }

    #[test]
    fn stale_handle_does_not_alias_the_next_occupant() {
        let mut allocator = HandleAllocator::new();
        let mut pool: ResourcePool<kind::Buffer, &str> = ResourcePool::new();
        let old: BufferHandle = allocator.allocate();
        pool.store(old, "old");
        pool.remove(&allocator, old).unwrap();
        allocator.free(old);

        let new: BufferHandle = allocator.allocate();
        pool.store(new, "new");

        assert_eq!(new.index(), old.index());
        assert_eq!(*pool.get(&allocator, new).unwrap(), "new");
        assert!(pool.get(&allocator, old).is_err());
    }

    #[test]
    fn error_points_at_the_calling_line() {
        let allocator = HandleAllocator::new();
        let pool: ResourcePool<kind::Buffer, ()> = ResourcePool::new();
        let never_allocated = BufferHandle::from_parts(9, 0);

        let line = line!() + 1;
        let error = pool.get(&allocator, never_allocated).unwrap_err();

        assert_eq!(error.location.line(), line);
        assert_eq!(error.index, 9);
    }

    #[test]
    fn iter_and_drain_report_handles() {
        let mut allocator = HandleAllocator::new();
        let mut pool: ResourcePool<kind::Buffer, u32> = ResourcePool::new();
        let a: BufferHandle = allocator.allocate();
        let _gap: TextureHandle = allocator.allocate();
        let b: BufferHandle = allocator.allocate();
        pool.store(a, 1);
        pool.store(b, 2);
        *pool.get_mut(&allocator, b).unwrap() += 10;

        let seen: Vec<_> = pool.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(seen, vec![(a, 1), (b, 12)]);

        let drained = pool.drain();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty());
    }
}
