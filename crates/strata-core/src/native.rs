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

//! Opaque identifiers for objects owned by a native backend.
//!
//! The resource layer never looks inside these values; it only stores them and
//! hands them back to the backend that issued them.

use std::fmt;

macro_rules! native_ids {
    ($($(#[$attr:meta])* $name:ident,)*) => {
        $(
            $(#[$attr])*
            #[derive(Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub u64);

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}({:#x})", stringify!($name), self.0)
                }
            }
        )*
    };
}

native_ids! {
    /// A backend buffer object.
    NativeBuffer,
    /// A backend texture object.
    NativeTexture,
    /// A backend framebuffer (attachment set) object.
    NativeFramebuffer,
    /// A backend sampler object.
    NativeSampler,
    /// A compiled shader stage.
    NativeShaderModule,
    /// A linked shader program.
    NativeProgram,
    /// A blend state object.
    NativeBlendState,
    /// A depth/stencil state object.
    NativeDepthStencilState,
    /// A rasterizer state object.
    NativeRasterizerState,
    /// A complete pipeline state object.
    NativePipeline,
}

/// A backend-specific texture format code (a `VkFormat`, a `DXGI_FORMAT`,
/// an `MTLPixelFormat`, a GL internal format, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeFormat(pub u32);

impl fmt::LowerHex for NativeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A monotonically increasing marker of GPU progress through submitted work.
///
/// Every submission yields a token strictly greater than the previous one.
/// Once a backend reports a token as completed, every smaller token is
/// completed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CompletionToken(pub u64);

impl CompletionToken {
    /// The token that precedes every submission.
    pub const NONE: Self = Self(0);

    /// The token immediately after this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns `true` if `self` has been reached once `completed` is known complete.
    pub const fn is_reached_by(self, completed: CompletionToken) -> bool {
        self.0 <= completed.0
    }
}

impl fmt::Display for CompletionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
