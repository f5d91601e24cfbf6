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

//! Defines data structures related to GPU texture resources.

use crate::api::format::TextureFormat;
use crate::strata_bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The size of a texture: width, height, and depth or array layer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent3D {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth for 3D textures, array layer count otherwise.
    pub depth_or_array_layers: u32,
}

impl Extent3D {
    /// A single-layer 2D extent.
    pub const fn d2(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    /// The extent of the given mip level, never smaller than one texel.
    pub fn mip_level(self, level: u32, dimension: TextureDimension) -> Self {
        let shrink = |value: u32| (value >> level.min(31)).max(1);
        Self {
            width: shrink(self.width),
            height: shrink(self.height),
            depth_or_array_layers: match dimension {
                TextureDimension::D3 => shrink(self.depth_or_array_layers),
                _ => self.depth_or_array_layers,
            },
        }
    }

    /// The number of mip levels of a full chain for this extent.
    pub fn max_mips(self, dimension: TextureDimension) -> u32 {
        let largest = match dimension {
            TextureDimension::D1 => self.width,
            TextureDimension::D2 => self.width.max(self.height),
            TextureDimension::D3 => self
                .width
                .max(self.height)
                .max(self.depth_or_array_layers),
        };
        32 - largest.max(1).leading_zeros()
    }
}

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture (or 2D array).
    D2,
    /// A three-dimensional texture.
    D3,
}

/// The number of samples per texel for multisampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleCount {
    /// One sample per texel (no multisampling).
    #[default]
    X1,
    /// Two samples per texel.
    X2,
    /// Four samples per texel.
    X4,
    /// Eight samples per texel.
    X8,
    /// Sixteen samples per texel.
    X16,
}

impl SampleCount {
    /// The sample count as a number.
    pub const fn count(self) -> u32 {
        match self {
            SampleCount::X1 => 1,
            SampleCount::X2 => 2,
            SampleCount::X4 => 4,
            SampleCount::X8 => 8,
            SampleCount::X16 => 16,
        }
    }
}

strata_bitflags! {
    /// A set of flags describing the allowed usages of a texture.
    pub struct TextureUsage: u32 {
        /// The texture can be the source of a copy.
        const COPY_SRC = 1 << 0;
        /// The texture can be the destination of a copy or a CPU upload.
        const COPY_DST = 1 << 1;
        /// The texture can be bound for sampling.
        const TEXTURE_BINDING = 1 << 2;
        /// The texture can be bound as a storage image.
        const STORAGE_BINDING = 1 << 3;
        /// The texture can be a color or depth/stencil render attachment.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// A descriptor used to create a texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The size of mip level 0.
    pub size: Extent3D,
    /// The number of mip levels.
    pub mip_level_count: u32,
    /// The number of samples per texel.
    pub sample_count: SampleCount,
    /// The dimensionality.
    pub dimension: TextureDimension,
    /// The abstract texel format.
    pub format: TextureFormat,
    /// How the texture will be used.
    pub usage: TextureUsage,
}

impl<'a> TextureDescriptor<'a> {
    /// A single-mip, single-sample 2D texture.
    pub fn d2(
        label: &'a str,
        width: u32,
        height: u32,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> Self {
        Self {
            label: Some(Cow::Borrowed(label)),
            size: Extent3D::d2(width, height),
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_length() {
        assert_eq!(Extent3D::d2(1, 1).max_mips(TextureDimension::D2), 1);
        assert_eq!(Extent3D::d2(256, 64).max_mips(TextureDimension::D2), 9);
        assert_eq!(Extent3D::d2(300, 1).max_mips(TextureDimension::D2), 9);
    }

    #[test]
    fn mip_levels_clamp_to_one() {
        let extent = Extent3D {
            width: 8,
            height: 2,
            depth_or_array_layers: 6,
        };
        let level = extent.mip_level(2, TextureDimension::D2);
        assert_eq!(level, Extent3D { width: 2, height: 1, depth_or_array_layers: 6 });
        let level = extent.mip_level(2, TextureDimension::D3);
        assert_eq!(level.depth_or_array_layers, 1);
    }
}
