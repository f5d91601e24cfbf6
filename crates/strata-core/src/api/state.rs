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

//! Immutable fixed-function state keys.
//!
//! Every key is a plain value that fully encodes one piece of fixed-function
//! state. Equal keys always map to the same cached native state object, so
//! every field takes part in `Eq` and `Hash`; floats are stored as
//! [`FloatBits`].

use crate::strata_bitflags;
use crate::utils::FloatBits;
use serde::{Deserialize, Serialize};

/// A comparison function for depth, stencil and sampler comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// Always passes.
    #[default]
    Always,
}

/// A multiplier applied to a source or destination color in the blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// Source color.
    Src,
    /// `1.0 - source color`
    OneMinusSrc,
    /// Source alpha.
    SrcAlpha,
    /// `1.0 - source alpha`
    OneMinusSrcAlpha,
    /// Destination color.
    Dst,
    /// `1.0 - destination color`
    OneMinusDst,
    /// Destination alpha.
    DstAlpha,
    /// `1.0 - destination alpha`
    OneMinusDstAlpha,
    /// `min(source alpha, 1.0 - destination alpha)`
    SrcAlphaSaturated,
    /// The blend constant.
    Constant,
    /// `1.0 - blend constant`
    OneMinusConstant,
}

/// How the weighted source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// `src + dst`
    #[default]
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

/// One blend equation, for either the color or the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendComponent {
    /// Factor applied to the fragment output.
    pub src_factor: BlendFactor,
    /// Factor applied to the framebuffer value.
    pub dst_factor: BlendFactor,
    /// The combining operation.
    pub operation: BlendOperation,
}

impl BlendComponent {
    /// Overwrites the destination.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };
    /// Classic "over" alpha blending.
    pub const OVER: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::OneMinusSrcAlpha,
        operation: BlendOperation::Add,
    };
    /// Adds the source to the destination.
    pub const ADD: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
    /// Adds the alpha-weighted source to the destination.
    pub const ADD_ALPHA: Self = Self {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    };
}

strata_bitflags! {
    /// A mask of color channels written by a color target.
    pub struct ColorWrites: u8 {
        /// Red.
        const R = 0b0001;
        /// Green.
        const G = 0b0010;
        /// Blue.
        const B = 0b0100;
        /// Alpha.
        const A = 0b1000;
        /// Every channel.
        const ALL = 0b1111;
    }
}

/// Blend state of a pipeline's color targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendStateKey {
    /// When `false`, `color` and `alpha` are ignored and fragments overwrite.
    pub enabled: bool,
    /// The color equation.
    pub color: BlendComponent,
    /// The alpha equation.
    pub alpha: BlendComponent,
    /// Channels written.
    pub write_mask: ColorWrites,
}

impl BlendStateKey {
    /// Blending disabled.
    pub const OPAQUE: Self = Self {
        enabled: false,
        color: BlendComponent::REPLACE,
        alpha: BlendComponent::REPLACE,
        write_mask: ColorWrites::ALL,
    };
    /// Alpha blending.
    pub const ALPHA_BLEND: Self = Self {
        enabled: true,
        color: BlendComponent::OVER,
        alpha: BlendComponent::OVER,
        write_mask: ColorWrites::ALL,
    };
    /// Additive blending.
    pub const ADDITIVE: Self = Self {
        enabled: true,
        color: BlendComponent::ADD,
        alpha: BlendComponent::ADD,
        write_mask: ColorWrites::ALL,
    };
    /// Additive blending weighted by source alpha.
    pub const ADDITIVE_ALPHA: Self = Self {
        enabled: true,
        color: BlendComponent::ADD_ALPHA,
        alpha: BlendComponent::ADD_ALPHA,
        write_mask: ColorWrites::ALL,
    };
}

impl Default for BlendStateKey {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// What happens to a stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set to zero.
    Zero,
    /// Set to the reference value.
    Replace,
    /// Bitwise invert.
    Invert,
    /// Increment, clamping at the maximum.
    IncrementClamp,
    /// Decrement, clamping at zero.
    DecrementClamp,
    /// Increment, wrapping to zero.
    IncrementWrap,
    /// Decrement, wrapping to the maximum.
    DecrementWrap,
}

/// Stencil test and operations for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StencilFaceState {
    /// The stencil comparison.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes and the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

/// Depth and stencil test state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthStencilStateKey {
    /// Enables the depth test.
    pub depth_test_enabled: bool,
    /// Enables depth writes.
    pub depth_write_enabled: bool,
    /// The depth comparison.
    pub depth_compare: CompareFunction,
    /// Enables the stencil test.
    pub stencil_enabled: bool,
    /// Stencil state of front faces.
    pub stencil_front: StencilFaceState,
    /// Stencil state of back faces.
    pub stencil_back: StencilFaceState,
    /// Mask applied when reading stencil values.
    pub stencil_read_mask: u8,
    /// Mask applied when writing stencil values.
    pub stencil_write_mask: u8,
}

impl DepthStencilStateKey {
    /// No depth or stencil testing.
    pub const DISABLED: Self = Self {
        depth_test_enabled: false,
        depth_write_enabled: false,
        depth_compare: CompareFunction::Always,
        stencil_enabled: false,
        stencil_front: StencilFaceState::KEEP,
        stencil_back: StencilFaceState::KEEP,
        stencil_read_mask: 0xFF,
        stencil_write_mask: 0xFF,
    };
    /// Depth test and write with `LessEqual`.
    pub const DEPTH_READ_WRITE: Self = Self {
        depth_test_enabled: true,
        depth_write_enabled: true,
        depth_compare: CompareFunction::LessEqual,
        ..Self::DISABLED
    };
    /// Depth test with `LessEqual`, no writes.
    pub const DEPTH_READ_ONLY: Self = Self {
        depth_test_enabled: true,
        depth_write_enabled: false,
        depth_compare: CompareFunction::LessEqual,
        ..Self::DISABLED
    };

    /// Returns `true` if this state reads or writes depth or stencil at all.
    pub const fn needs_depth_attachment(&self) -> bool {
        self.depth_test_enabled || self.depth_write_enabled || self.stencil_enabled
    }
}

impl StencilFaceState {
    /// Always passes and never modifies the stencil buffer.
    pub const KEEP: Self = Self {
        compare: CompareFunction::Always,
        fail_op: StencilOperation::Keep,
        depth_fail_op: StencilOperation::Keep,
        pass_op: StencilOperation::Keep,
    };
}

impl Default for DepthStencilStateKey {
    fn default() -> Self {
        Self::DEPTH_READ_WRITE
    }
}

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

/// The winding order of front faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonMode {
    /// Filled.
    #[default]
    Fill,
    /// Edges only. Needs the `POLYGON_MODE_LINE` feature.
    Line,
}

/// A depth bias, stored bit-exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DepthBias {
    /// Constant bias added to every fragment.
    pub constant: i32,
    /// Bias scaled by the fragment's depth slope.
    pub slope_scale: FloatBits,
    /// Maximum bias; zero means unclamped.
    pub clamp: FloatBits,
}

impl DepthBias {
    /// No bias.
    pub const NONE: Self = Self {
        constant: 0,
        slope_scale: FloatBits::ZERO,
        clamp: FloatBits::ZERO,
    };

    /// Builds a bias from float parameters.
    pub fn new(constant: i32, slope_scale: f32, clamp: f32) -> Self {
        Self {
            constant,
            slope_scale: FloatBits::new(slope_scale),
            clamp: FloatBits::new(clamp),
        }
    }
}

/// Rasterizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterizerStateKey {
    /// Face culling.
    pub cull_mode: CullMode,
    /// Front face winding.
    pub front_face: FrontFace,
    /// Fill or wireframe.
    pub polygon_mode: PolygonMode,
    /// Clip fragments outside the depth range.
    pub depth_clip_enabled: bool,
    /// Enables the scissor test.
    pub scissor_test_enabled: bool,
    /// Depth bias.
    pub depth_bias: DepthBias,
}

impl RasterizerStateKey {
    /// Solid, back-face culled.
    pub const CULL_BACK: Self = Self {
        cull_mode: CullMode::Back,
        front_face: FrontFace::Ccw,
        polygon_mode: PolygonMode::Fill,
        depth_clip_enabled: true,
        scissor_test_enabled: false,
        depth_bias: DepthBias::NONE,
    };
    /// Solid, no culling.
    pub const CULL_NONE: Self = Self {
        cull_mode: CullMode::None,
        ..Self::CULL_BACK
    };
    /// Wireframe, no culling.
    pub const WIREFRAME: Self = Self {
        cull_mode: CullMode::None,
        polygon_mode: PolygonMode::Line,
        ..Self::CULL_BACK
    };
}

impl Default for RasterizerStateKey {
    fn default() -> Self {
        Self::CULL_BACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_keys_hash_equal() {
        let a = RasterizerStateKey {
            depth_bias: DepthBias::new(2, -0.0, 0.0),
            ..RasterizerStateKey::CULL_BACK
        };
        let b = RasterizerStateKey {
            depth_bias: DepthBias::new(2, 0.0, 0.0),
            ..RasterizerStateKey::CULL_BACK
        };
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn presets_are_distinct() {
        let blends: HashSet<_> = [
            BlendStateKey::OPAQUE,
            BlendStateKey::ALPHA_BLEND,
            BlendStateKey::ADDITIVE,
            BlendStateKey::ADDITIVE_ALPHA,
        ]
        .into_iter()
        .collect();
        assert_eq!(blends.len(), 4);
        assert!(!DepthStencilStateKey::DISABLED.needs_depth_attachment());
        assert!(DepthStencilStateKey::DEPTH_READ_ONLY.needs_depth_attachment());
    }
}
