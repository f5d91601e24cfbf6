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

//! Generation-tagged handles to pooled GPU resources.
//!
//! A [`Handle`] combines a slot index with a generation count to solve the
//! "ABA problem": when a resource is destroyed its index can be recycled for a
//! new resource, but the generation is incremented, so an old handle pointing
//! at the recycled index no longer validates. The resource kind lives only in
//! the type parameter; it is never encoded in the bits.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Runtime identifier of a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKindId {
    /// A GPU buffer.
    Buffer,
    /// A GPU texture.
    Texture,
    /// A set of render attachments.
    Framebuffer,
    /// A texture sampler.
    Sampler,
    /// A linked shader program.
    ShaderProgram,
    /// A complete graphics pipeline.
    Pipeline,
}

impl ResourceKindId {
    /// Every resource kind, in a stable order.
    pub const ALL: [ResourceKindId; 6] = [
        ResourceKindId::Buffer,
        ResourceKindId::Texture,
        ResourceKindId::Framebuffer,
        ResourceKindId::Sampler,
        ResourceKindId::ShaderProgram,
        ResourceKindId::Pipeline,
    ];

    /// A lowercase human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKindId::Buffer => "buffer",
            ResourceKindId::Texture => "texture",
            ResourceKindId::Framebuffer => "framebuffer",
            ResourceKindId::Sampler => "sampler",
            ResourceKindId::ShaderProgram => "shader program",
            ResourceKindId::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for ResourceKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type-level tag naming the resource kind a [`Handle`] refers to.
///
/// Implemented only by the uninhabited markers in [`kind`].
pub trait ResourceKind: 'static {
    /// The runtime identifier matching this marker.
    const KIND: ResourceKindId;
}

/// Uninhabited marker types, one per resource kind.
pub mod kind {
    use super::{ResourceKind, ResourceKindId};

    macro_rules! resource_kinds {
        ($($(#[$attr:meta])* $name:ident,)*) => {
            $(
                $(#[$attr])*
                #[derive(Debug)]
                pub enum $name {}

                impl ResourceKind for $name {
                    const KIND: ResourceKindId = ResourceKindId::$name;
                }
            )*
        };
    }

    resource_kinds! {
        /// Marker for buffer handles.
        Buffer,
        /// Marker for texture handles.
        Texture,
        /// Marker for framebuffer handles.
        Framebuffer,
        /// Marker for sampler handles.
        Sampler,
        /// Marker for shader program handles.
        ShaderProgram,
        /// Marker for pipeline handles.
        Pipeline,
    }
}

/// An opaque, freely copyable reference into a resource pool slot.
///
/// Handles carry no ownership. A handle stays valid until the resource it names
/// is destroyed; from then on every lookup through it fails, even after the
/// index is reused by a new resource.
pub struct Handle<K: ResourceKind> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

/// A handle to a buffer.
pub type BufferHandle = Handle<kind::Buffer>;
/// A handle to a texture.
pub type TextureHandle = Handle<kind::Texture>;
/// A handle to a framebuffer.
pub type FramebufferHandle = Handle<kind::Framebuffer>;
/// A handle to a sampler.
pub type SamplerHandle = Handle<kind::Sampler>;
/// A handle to a shader program.
pub type ShaderProgramHandle = Handle<kind::ShaderProgram>;
/// A handle to a pipeline.
pub type PipelineHandle = Handle<kind::Pipeline>;

impl<K: ResourceKind> Handle<K> {
    /// Builds a handle from its parts. Only allocators should need this.
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _kind: PhantomData,
        }
    }

    /// The slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The generation of the slot at the time this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// The runtime kind of this handle.
    pub const fn kind(self) -> ResourceKindId {
        K::KIND
    }

    /// Packs the handle into its 64-bit interop layout.
    pub const fn to_raw(self) -> RawHandle {
        RawHandle(((self.generation as u64) << 32) | self.index as u64)
    }

    /// Reinterprets a raw value as a handle of kind `K`.
    ///
    /// The kind is not stored in the bits, so this cannot be checked here;
    /// a mismatched kind is caught on the first validated lookup.
    pub const fn from_raw(raw: RawHandle) -> Self {
        Self::from_parts(raw.index(), raw.generation())
    }
}

impl<K: ResourceKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: ResourceKind> Copy for Handle<K> {}

impl<K: ResourceKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<K: ResourceKind> Eq for Handle<K> {}

impl<K: ResourceKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_raw().0.hash(state);
    }
}

impl<K: ResourceKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handle<{}>({}v{})",
            K::KIND.name(),
            self.index,
            self.generation
        )
    }
}

/// The 64-bit interop layout of a handle: generation in the upper 32 bits,
/// index in the lower 32 bits.
///
/// A raw handle has lost its kind. Raw values of different kinds may be equal
/// and must never be compared with each other.
#[repr(transparent)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RawHandle(pub u64);

impl RawHandle {
    /// The index half.
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation half.
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}
