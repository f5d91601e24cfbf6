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

//! Framebuffers: sets of render attachments.
//!
//! Consumers describe a framebuffer with texture handles. The device resolves
//! them and hands the backend a [`NativeFramebufferDescriptor`] that only
//! references native objects.

use crate::handle::TextureHandle;
use crate::native::{NativeFormat, NativeTexture};
use std::borrow::Cow;

/// A descriptor used to create a framebuffer.
#[derive(Debug, Clone, Default)]
pub struct FramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Color attachments, in render target order.
    pub color_attachments: Cow<'a, [TextureHandle]>,
    /// An optional depth/stencil attachment.
    pub depth_stencil_attachment: Option<TextureHandle>,
}

/// One resolved attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeAttachment {
    /// The native texture.
    pub texture: NativeTexture,
    /// Its native format.
    pub format: NativeFormat,
}

/// A framebuffer description in backend terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFramebufferDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// Color attachments, in render target order.
    pub color_attachments: Vec<NativeAttachment>,
    /// An optional depth/stencil attachment.
    pub depth_stencil_attachment: Option<NativeAttachment>,
    /// Width shared by every attachment.
    pub width: u32,
    /// Height shared by every attachment.
    pub height: u32,
}
