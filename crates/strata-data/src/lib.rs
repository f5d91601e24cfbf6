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

//! # Strata Data
//!
//! Storage primitives of the GPU resource layer. Nothing in this crate talks to
//! a backend: it only tracks which handles are alive, what they point at, what
//! is waiting to be torn down, and which state objects were already built.
//!
//! - [`HandleAllocator`]: issues and invalidates generation-tagged handles.
//! - [`ResourcePool`]: per-kind storage, revalidating every access.
//! - [`DestructionQueue`]: teardown deferred until the GPU reports completion.
//! - [`StateCache`]: permanent map from structural keys to built objects.

#![warn(missing_docs)]

pub mod destruction_queue;
pub mod handle_allocator;
pub mod resource_pool;
pub mod state_cache;

pub use self::destruction_queue::{
    CompletionSource, DestructionError, DestructionQueue, TeardownFn, TokenStatus,
};
pub use self::handle_allocator::HandleAllocator;
pub use self::resource_pool::ResourcePool;
pub use self::state_cache::{CacheStats, StateCache};
