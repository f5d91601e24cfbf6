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

//! Leaf error types of the resource layer.
//!
//! The device crate wraps these into its own error enum; they are defined here
//! so that storage primitives and backends can produce them without depending
//! on the device.

use crate::api::{BufferUsage, DeviceFeatures, FormatFeatures, TextureFormat, TextureUsage};
use crate::handle::{Handle, ResourceKind, ResourceKindId};
use crate::native::NativeFormat;
use std::panic::Location;
use thiserror::Error;

/// A stale or foreign-kind handle was used.
///
/// Carries the source location of the offending call so the report points at
/// the caller rather than at the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid {kind} handle ({index}v{generation}) used at {location}")]
pub struct InvalidHandleError {
    /// The kind the handle was typed as.
    pub kind: ResourceKindId,
    /// The handle's index.
    pub index: u32,
    /// The handle's generation.
    pub generation: u32,
    /// Where the handle was used.
    pub location: &'static Location<'static>,
}

impl InvalidHandleError {
    /// Builds the error for `handle`, recording the caller's location.
    #[track_caller]
    pub fn new<K: ResourceKind>(handle: Handle<K>) -> Self {
        Self {
            kind: K::KIND,
            index: handle.index(),
            generation: handle.generation(),
            location: Location::caller(),
        }
    }
}

/// A format is not in the capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsupportedFormatError {
    /// The abstract format is not supported by the active backend.
    #[error("Texture format {0:?} is not supported by this device")]
    Abstract(TextureFormat),
    /// The native code maps to no supported abstract format.
    #[error("Native format {0:#x} maps to no supported texture format")]
    Native(NativeFormat),
}

/// A creation description or a recorded command is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A buffer of size zero was requested.
    #[error("Buffer size must be greater than zero")]
    ZeroSizedBuffer,
    /// A buffer exceeds the device limit.
    #[error("Buffer size {size} exceeds the device limit of {max} bytes")]
    BufferTooLarge {
        /// Requested size.
        size: u64,
        /// Device limit.
        max: u64,
    },
    /// A resource was described with no usage at all.
    #[error("A {kind} must declare at least one usage")]
    EmptyUsage {
        /// The kind being created.
        kind: ResourceKindId,
    },
    /// A texture has a zero extent.
    #[error("Texture extent must be non-zero in every dimension")]
    ZeroSizedTexture,
    /// A texture extent exceeds the device limit.
    #[error("Texture extent {size} exceeds the device limit of {max}")]
    TextureTooLarge {
        /// The offending extent.
        size: u32,
        /// Device limit.
        max: u32,
    },
    /// The mip level count is zero or longer than the full chain.
    #[error("Mip level count {requested} is invalid, the full chain has {max} levels")]
    InvalidMipLevelCount {
        /// Requested count.
        requested: u32,
        /// Full chain length.
        max: u32,
    },
    /// The sample count exceeds the device limit, or multisampling was combined
    /// with mips or a non-2D dimension.
    #[error("Sample count {requested} is not allowed here (device maximum {max})")]
    InvalidSampleCount {
        /// Requested count.
        requested: u32,
        /// Device maximum.
        max: u32,
    },
    /// A compressed texture is not a 2D texture with block-aligned dimensions.
    #[error("Compressed format {format:?} needs a 2D texture with dimensions in multiples of 4, got {width}x{height}")]
    CompressedTextureShape {
        /// The format.
        format: TextureFormat,
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The format lacks a feature the requested usage needs.
    #[error("Format {format:?} does not support {required:?}")]
    FormatFeatureMissing {
        /// The format.
        format: TextureFormat,
        /// The missing features.
        required: FormatFeatures,
    },
    /// A device feature is required but not available.
    #[error("Device feature {0:?} is not available")]
    MissingFeature(DeviceFeatures),
    /// A sampler's anisotropy exceeds the device limit.
    #[error("Sampler anisotropy {requested} exceeds the device limit of {max}")]
    AnisotropyTooHigh {
        /// Requested clamp.
        requested: u16,
        /// Device limit.
        max: u16,
    },
    /// A sampler's LOD range is empty or negative.
    #[error("Sampler LOD range is empty or negative")]
    InvalidLodRange,
    /// A framebuffer has no attachment at all.
    #[error("A framebuffer needs at least one attachment")]
    EmptyFramebuffer,
    /// Too many color attachments.
    #[error("{count} color attachments exceed the device limit of {max}")]
    TooManyColorAttachments {
        /// Requested count.
        count: u32,
        /// Device limit.
        max: u32,
    },
    /// Framebuffer attachments do not share one size.
    #[error("Framebuffer attachments differ in size: {expected:?} and {found:?}")]
    AttachmentSizeMismatch {
        /// Size of the first attachment.
        expected: (u32, u32),
        /// Size of the offending attachment.
        found: (u32, u32),
    },
    /// A color attachment has a depth format or a depth attachment has a color format.
    #[error("Format {format:?} cannot be used as a {role} attachment")]
    AttachmentFormat {
        /// The attachment's format.
        format: TextureFormat,
        /// "color" or "depth/stencil".
        role: &'static str,
    },
    /// A texture lacks a usage flag its use requires.
    #[error("Texture lacks the {required:?} usage")]
    MissingTextureUsage {
        /// The missing usage.
        required: TextureUsage,
    },
    /// A buffer lacks a usage flag its use requires.
    #[error("Buffer lacks the {required:?} usage")]
    MissingBufferUsage {
        /// The missing usage.
        required: BufferUsage,
    },
    /// A shader stage has no code or no entry point.
    #[error("The {stage} stage has no code or no entry point")]
    EmptyShaderStage {
        /// "vertex" or "fragment".
        stage: &'static str,
    },
    /// A stage was supplied in the wrong slot of a program descriptor.
    #[error("Expected a {expected} stage, found a {found} stage")]
    ShaderStageMismatch {
        /// The slot's stage.
        expected: &'static str,
        /// The stage supplied.
        found: &'static str,
    },
    /// Source text is not valid UTF-8.
    #[error("Shader source of the {stage} stage is not valid UTF-8")]
    ShaderSourceEncoding {
        /// The stage.
        stage: &'static str,
    },
    /// The vertex layout exceeds a device limit or is inconsistent.
    #[error("Invalid vertex layout: {reason}")]
    InvalidVertexLayout {
        /// What is wrong.
        reason: String,
    },
    /// A pipeline's depth state and depth format disagree.
    #[error("Depth/stencil state and depth target format are inconsistent")]
    DepthStateWithoutTarget,
    /// A pipeline has no render target at all.
    #[error("A pipeline needs at least one color target or a depth target")]
    NoRenderTargets,
    /// A bind slot is outside the device limit.
    #[error("{bind_point} slot {slot} is out of range (device limit {max})")]
    SlotOutOfRange {
        /// The bind point.
        bind_point: &'static str,
        /// Requested slot.
        slot: u32,
        /// Device limit.
        max: u32,
    },
    /// A draw was recorded with no pipeline bound.
    #[error("Draw recorded with no pipeline bound")]
    NoPipelineBound,
    /// An indexed draw was recorded with no index buffer bound.
    #[error("Indexed draw recorded with no index buffer bound")]
    NoIndexBufferBound,
    /// A draw range ends before it starts.
    #[error("Draw range {start}..{end} is inverted")]
    InvalidDrawRange {
        /// Start of the range.
        start: u32,
        /// End of the range.
        end: u32,
    },
    /// A write or bind offset lies outside the resource.
    #[error("Range {offset}..{end} is out of bounds for a resource of {size} bytes")]
    OutOfBounds {
        /// Start of the range.
        offset: u64,
        /// End of the range.
        end: u64,
        /// Size of the resource.
        size: u64,
    },
    /// A mip level does not exist.
    #[error("Mip level {level} does not exist (texture has {count})")]
    MipLevelOutOfRange {
        /// Requested level.
        level: u32,
        /// Level count.
        count: u32,
    },
    /// Upload data has the wrong size for the target.
    #[error("Expected {expected} bytes of texel data, got {actual}")]
    DataSizeMismatch {
        /// Expected size.
        expected: u64,
        /// Supplied size.
        actual: u64,
    },
    /// A viewport or scissor rectangle is empty or outside the target.
    #[error("Invalid viewport or scissor rectangle")]
    InvalidRect,
    /// The backend's capability report is inconsistent.
    #[error("Invalid capability report: {reason}")]
    InvalidCapabilities {
        /// What is wrong.
        reason: String,
    },
}

/// A failure reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend could not allocate memory for the object.
    #[error("Out of device memory ({requested} bytes requested)")]
    OutOfMemory {
        /// Bytes requested.
        requested: u64,
    },
    /// The device is gone. Nothing created on it is usable anymore.
    #[error("The graphics device was lost")]
    DeviceLost,
    /// The backend refused the request.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),
    /// An internal backend failure.
    #[error("Internal backend error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Returns `true` for device loss.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, BackendError::DeviceLost)
    }
}
