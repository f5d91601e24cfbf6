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

//! What a backend reports about itself when a device is constructed.

use crate::api::adapter::GraphicsAdapterInfo;
use crate::api::format::{CompressionFamily, FormatFeatures, TextureFormat};
use crate::native::NativeFormat;
use crate::strata_bitflags;
use serde::{Deserialize, Serialize};

/// One supported format and the native code the backend uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSupport {
    /// The abstract format.
    pub format: TextureFormat,
    /// The backend's code for it.
    pub native: NativeFormat,
    /// What the backend can do with it.
    pub features: FormatFeatures,
}

impl FormatSupport {
    /// Shorthand constructor.
    pub const fn new(format: TextureFormat, native: u32, features: FormatFeatures) -> Self {
        Self {
            format,
            native: NativeFormat(native),
            features,
        }
    }
}

/// Numeric limits of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceLimits {
    /// Largest width or height of a 1D or 2D texture.
    pub max_texture_dimension_2d: u32,
    /// Largest extent of a 3D texture.
    pub max_texture_dimension_3d: u32,
    /// Largest array layer count.
    pub max_texture_array_layers: u32,
    /// Largest number of color attachments in a framebuffer.
    pub max_color_attachments: u32,
    /// Vertex buffer slots.
    pub max_vertex_buffers: u32,
    /// Vertex attributes across every vertex buffer.
    pub max_vertex_attributes: u32,
    /// Uniform buffer (resource set) slots.
    pub max_uniform_buffers: u32,
    /// Texture slots.
    pub max_texture_slots: u32,
    /// Sampler slots.
    pub max_sampler_slots: u32,
    /// Largest buffer size in bytes.
    pub max_buffer_size: u64,
    /// Largest sampler anisotropy.
    pub max_sampler_anisotropy: u16,
    /// Largest multisample count.
    pub max_sample_count: u32,
}

impl Default for DeviceLimits {
    /// Limits every supported backend is expected to meet.
    fn default() -> Self {
        Self {
            max_texture_dimension_2d: 4096,
            max_texture_dimension_3d: 256,
            max_texture_array_layers: 256,
            max_color_attachments: 4,
            max_vertex_buffers: 8,
            max_vertex_attributes: 16,
            max_uniform_buffers: 12,
            max_texture_slots: 16,
            max_sampler_slots: 16,
            max_buffer_size: 256 << 20,
            max_sampler_anisotropy: 1,
            max_sample_count: 4,
        }
    }
}

strata_bitflags! {
    /// Optional backend features.
    pub struct DeviceFeatures: u32 {
        /// BCn texture compression.
        const TEXTURE_COMPRESSION_BC = 1 << 0;
        /// ETC2/EAC texture compression.
        const TEXTURE_COMPRESSION_ETC2 = 1 << 1;
        /// ASTC texture compression.
        const TEXTURE_COMPRESSION_ASTC = 1 << 2;
        /// Anisotropic filtering.
        const SAMPLER_ANISOTROPY = 1 << 3;
        /// Wireframe rasterization.
        const POLYGON_MODE_LINE = 1 << 4;
        /// The `ClampToBorder` address mode.
        const ADDRESS_MODE_CLAMP_TO_BORDER = 1 << 5;
        /// Per-target blend state.
        const INDEPENDENT_BLEND = 1 << 6;
    }
}

impl DeviceFeatures {
    /// The feature a compressed family depends on.
    pub const fn for_compression(family: CompressionFamily) -> Self {
        match family {
            CompressionFamily::Bc => Self::TEXTURE_COMPRESSION_BC,
            CompressionFamily::Etc2 => Self::TEXTURE_COMPRESSION_ETC2,
            CompressionFamily::Astc => Self::TEXTURE_COMPRESSION_ASTC,
        }
    }
}

/// Everything a backend reports about itself.
#[derive(Debug, Clone, Default)]
pub struct BackendCapabilities {
    /// The adapter the backend runs on.
    pub adapter: GraphicsAdapterInfo,
    /// Supported formats with their native codes.
    pub formats: Vec<FormatSupport>,
    /// Numeric limits.
    pub limits: DeviceLimits,
    /// Optional features.
    pub features: DeviceFeatures,
}
