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

//! Uniform buffer slots shared with the shader conventions of the renderer.
//!
//! Pass these as the `slot` of `bind_uniform_buffer`.

/// Per-frame constants (camera, time).
pub const GLOBAL_CONSTANTS: u32 = 0;
/// Per-pass constants.
pub const PASS_CONSTANTS: u32 = 1;
/// Per-material constants.
pub const MATERIAL_CONSTANTS: u32 = 2;
/// Per-object constants.
pub const RENDER_ITEM_CONSTANTS: u32 = 3;
/// Water animation constants.
pub const WATER_ANIMATION_CONSTANTS: u32 = 4;

/// The number of slots used by the conventions above.
pub const COUNT: u32 = 5;
