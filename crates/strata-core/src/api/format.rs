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

//! The abstract texture format set.
//!
//! Which of these a device can actually use is never assumed: it is read from
//! the backend's capability report when the device is constructed.

use crate::strata_bitflags;
use serde::{Deserialize, Serialize};

/// The memory layout of texels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureFormat {
    // 8-bit normalized
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Two 8-bit unsigned normalized components.
    Rg8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA), sRGB encoded.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA).
    Bgra8Unorm,
    /// Four 8-bit unsigned normalized components (BGRA), sRGB encoded.
    Bgra8UnormSrgb,
    /// Packed 10-bit RGB with a 2-bit alpha.
    Rgb10a2Unorm,
    // Float and integer
    /// One 16-bit float component.
    R16Float,
    /// Two 16-bit float components.
    Rg16Float,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit unsigned integer component.
    R32Uint,
    /// One 32-bit float component.
    R32Float,
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    // Depth/stencil
    /// 16-bit unsigned normalized depth.
    Depth16Unorm,
    /// At least 24 bits of depth, no stencil.
    Depth24Plus,
    /// At least 24 bits of depth with 8-bit stencil.
    Depth24PlusStencil8,
    /// 32-bit float depth.
    Depth32Float,
    /// 32-bit float depth with 8-bit stencil.
    Depth32FloatStencil8,
    // Block compressed
    /// BC1 (DXT1) RGBA, 4x4 blocks of 8 bytes.
    Bc1RgbaUnorm,
    /// BC1 (DXT1) RGBA, sRGB encoded.
    Bc1RgbaUnormSrgb,
    /// BC2 (DXT3) RGBA, 4x4 blocks of 16 bytes.
    Bc2RgbaUnorm,
    /// BC3 (DXT5) RGBA, 4x4 blocks of 16 bytes.
    Bc3RgbaUnorm,
    /// BC3 (DXT5) RGBA, sRGB encoded.
    Bc3RgbaUnormSrgb,
    /// BC7 RGBA, 4x4 blocks of 16 bytes.
    Bc7RgbaUnorm,
    /// ETC2 RGB, 4x4 blocks of 8 bytes.
    Etc2Rgb8Unorm,
    /// ETC2 RGBA (EAC alpha), 4x4 blocks of 16 bytes.
    Etc2Rgba8Unorm,
    /// ASTC LDR, 4x4 blocks of 16 bytes.
    Astc4x4Unorm,
}

/// The compressed-format family a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionFamily {
    /// S3TC / BCn.
    Bc,
    /// ETC2 / EAC.
    Etc2,
    /// ASTC.
    Astc,
}

impl TextureFormat {
    /// Every abstract format, in declaration order.
    pub const ALL: &'static [TextureFormat] = &[
        TextureFormat::R8Unorm,
        TextureFormat::Rg8Unorm,
        TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Bgra8Unorm,
        TextureFormat::Bgra8UnormSrgb,
        TextureFormat::Rgb10a2Unorm,
        TextureFormat::R16Float,
        TextureFormat::Rg16Float,
        TextureFormat::Rgba16Float,
        TextureFormat::R32Uint,
        TextureFormat::R32Float,
        TextureFormat::Rg32Float,
        TextureFormat::Rgba32Float,
        TextureFormat::Depth16Unorm,
        TextureFormat::Depth24Plus,
        TextureFormat::Depth24PlusStencil8,
        TextureFormat::Depth32Float,
        TextureFormat::Depth32FloatStencil8,
        TextureFormat::Bc1RgbaUnorm,
        TextureFormat::Bc1RgbaUnormSrgb,
        TextureFormat::Bc2RgbaUnorm,
        TextureFormat::Bc3RgbaUnorm,
        TextureFormat::Bc3RgbaUnormSrgb,
        TextureFormat::Bc7RgbaUnorm,
        TextureFormat::Etc2Rgb8Unorm,
        TextureFormat::Etc2Rgba8Unorm,
        TextureFormat::Astc4x4Unorm,
    ];

    /// The width and height in texels of one storage block (1x1 for uncompressed).
    pub const fn block_dimensions(self) -> (u32, u32) {
        if self.is_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }

    /// The size in bytes of one storage block (one texel for uncompressed formats).
    ///
    /// Depth formats report the size a backend typically allocates; the exact
    /// footprint of `Depth24Plus` is implementation-defined.
    pub const fn block_size(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rg8Unorm | TextureFormat::Depth16Unorm | TextureFormat::R16Float => 2,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Rgb10a2Unorm
            | TextureFormat::Rg16Float
            | TextureFormat::R32Uint
            | TextureFormat::R32Float
            | TextureFormat::Depth24Plus
            | TextureFormat::Depth24PlusStencil8
            | TextureFormat::Depth32Float => 4,
            TextureFormat::Rgba16Float
            | TextureFormat::Rg32Float
            | TextureFormat::Depth32FloatStencil8 => 8,
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Bc1RgbaUnorm
            | TextureFormat::Bc1RgbaUnormSrgb
            | TextureFormat::Etc2Rgb8Unorm => 8,
            TextureFormat::Bc2RgbaUnorm
            | TextureFormat::Bc3RgbaUnorm
            | TextureFormat::Bc3RgbaUnormSrgb
            | TextureFormat::Bc7RgbaUnorm
            | TextureFormat::Etc2Rgba8Unorm
            | TextureFormat::Astc4x4Unorm => 16,
        }
    }

    /// The compressed family, or `None` for uncompressed formats.
    pub const fn compression(self) -> Option<CompressionFamily> {
        match self {
            TextureFormat::Bc1RgbaUnorm
            | TextureFormat::Bc1RgbaUnormSrgb
            | TextureFormat::Bc2RgbaUnorm
            | TextureFormat::Bc3RgbaUnorm
            | TextureFormat::Bc3RgbaUnormSrgb
            | TextureFormat::Bc7RgbaUnorm => Some(CompressionFamily::Bc),
            TextureFormat::Etc2Rgb8Unorm | TextureFormat::Etc2Rgba8Unorm => {
                Some(CompressionFamily::Etc2)
            }
            TextureFormat::Astc4x4Unorm => Some(CompressionFamily::Astc),
            _ => None,
        }
    }

    /// Returns `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        self.compression().is_some()
    }

    /// Returns `true` if the format has a depth aspect.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth16Unorm
                | TextureFormat::Depth24Plus
                | TextureFormat::Depth24PlusStencil8
                | TextureFormat::Depth32Float
                | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` if the format has a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24PlusStencil8 | TextureFormat::Depth32FloatStencil8
        )
    }

    /// Returns `true` if the color channels are sRGB encoded.
    pub const fn is_srgb(self) -> bool {
        matches!(
            self,
            TextureFormat::Rgba8UnormSrgb
                | TextureFormat::Bgra8UnormSrgb
                | TextureFormat::Bc1RgbaUnormSrgb
                | TextureFormat::Bc3RgbaUnormSrgb
        )
    }

    /// The number of bytes needed to store one mip level of the given size.
    pub fn level_size_in_bytes(self, width: u32, height: u32, depth_or_layers: u32) -> u64 {
        let (block_w, block_h) = self.block_dimensions();
        let blocks_x = width.div_ceil(block_w) as u64;
        let blocks_y = height.div_ceil(block_h) as u64;
        blocks_x * blocks_y * depth_or_layers as u64 * self.block_size() as u64
    }
}

strata_bitflags! {
    /// What a backend can do with a texture of a given format.
    pub struct FormatFeatures: u32 {
        /// The format can be sampled from shaders.
        const SAMPLED = 1 << 0;
        /// Sampling can use linear filtering.
        const FILTERABLE = 1 << 1;
        /// The format can be a color render attachment.
        const COLOR_ATTACHMENT = 1 << 2;
        /// The format supports blending when used as a color attachment.
        const BLENDABLE = 1 << 3;
        /// The format can be a depth/stencil attachment.
        const DEPTH_STENCIL_ATTACHMENT = 1 << 4;
        /// The format can be used for storage images.
        const STORAGE = 1 << 5;
    }
}

impl FormatFeatures {
    /// The features of a typical color format usable everywhere.
    pub const COLOR_RENDERABLE: Self = Self::from_bits_truncate(
        Self::SAMPLED.bits()
            | Self::FILTERABLE.bits()
            | Self::COLOR_ATTACHMENT.bits()
            | Self::BLENDABLE.bits(),
    );
    /// The features of a depth format.
    pub const DEPTH: Self = Self::from_bits_truncate(
        Self::SAMPLED.bits() | Self::DEPTH_STENCIL_ATTACHMENT.bits(),
    );
    /// The features of a compressed, sample-only format.
    pub const SAMPLE_ONLY: Self =
        Self::from_bits_truncate(Self::SAMPLED.bits() | Self::FILTERABLE.bits());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_formats_use_4x4_blocks() {
        for &format in TextureFormat::ALL {
            if format.is_compressed() {
                assert_eq!(format.block_dimensions(), (4, 4), "{format:?}");
                assert!(!format.is_depth());
            } else {
                assert_eq!(format.block_dimensions(), (1, 1), "{format:?}");
            }
        }
    }

    #[test]
    fn level_size_rounds_up_to_whole_blocks() {
        // 6x6 BC1 needs 2x2 blocks of 8 bytes.
        assert_eq!(TextureFormat::Bc1RgbaUnorm.level_size_in_bytes(6, 6, 1), 32);
        assert_eq!(TextureFormat::Rgba8Unorm.level_size_in_bytes(4, 2, 3), 96);
    }

    #[test]
    fn stencil_implies_depth() {
        for &format in TextureFormat::ALL {
            if format.has_stencil() {
                assert!(format.is_depth(), "{format:?}");
            }
        }
    }
}
