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

//! Defines data structures related to texture samplers.

use crate::api::state::CompareFunction;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Specifies how texture coordinates outside the [0, 1] range are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddressMode {
    /// Coordinates are clamped to the edge texel.
    #[default]
    ClampToEdge,
    /// The texture repeats.
    Repeat,
    /// The texture repeats, mirrored on every other repetition.
    MirrorRepeat,
    /// Coordinates outside the range read the border color.
    ClampToBorder,
}

/// Specifies the filtering between texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest-neighbor.
    #[default]
    Nearest,
    /// Bilinear interpolation.
    Linear,
}

/// Specifies the filtering between mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MipmapFilterMode {
    /// The nearest mip level is used.
    #[default]
    Nearest,
    /// The two nearest levels are blended.
    Linear,
}

/// The color read outside the texture when an address mode is `ClampToBorder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplerBorderColor {
    /// `[0.0, 0.0, 0.0, 0.0]`.
    TransparentBlack,
    /// `[0.0, 0.0, 0.0, 1.0]`.
    OpaqueBlack,
    /// `[1.0, 1.0, 1.0, 1.0]`.
    OpaqueWhite,
}

/// A descriptor used to create a sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Address mode for the U coordinate.
    pub address_mode_u: AddressMode,
    /// Address mode for the V coordinate.
    pub address_mode_v: AddressMode,
    /// Address mode for the W coordinate.
    pub address_mode_w: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Filter between mip levels.
    pub mipmap_filter: MipmapFilterMode,
    /// Lowest mip level the sampler may read.
    pub lod_min_clamp: f32,
    /// Highest mip level the sampler may read.
    pub lod_max_clamp: f32,
    /// If `Some`, a comparison sampler (shadow maps).
    pub compare: Option<CompareFunction>,
    /// Maximum anisotropy; `1` disables anisotropic filtering.
    pub anisotropy_clamp: u16,
    /// Border color for `ClampToBorder`.
    pub border_color: Option<SamplerBorderColor>,
}

impl SamplerDescriptor<'_> {
    /// Returns `true` if any axis uses `ClampToBorder`.
    pub fn uses_border(&self) -> bool {
        [self.address_mode_u, self.address_mode_v, self.address_mode_w]
            .contains(&AddressMode::ClampToBorder)
    }

    /// A trilinear, repeating sampler.
    pub fn linear_repeat() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: MipmapFilterMode::Linear,
            ..Self::default()
        }
    }
}

impl Default for SamplerDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            address_mode_u: AddressMode::default(),
            address_mode_v: AddressMode::default(),
            address_mode_w: AddressMode::default(),
            mag_filter: FilterMode::default(),
            min_filter: FilterMode::default(),
            mipmap_filter: MipmapFilterMode::default(),
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp: 1,
            border_color: None,
        }
    }
}
