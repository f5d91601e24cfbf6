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

use super::{Device, TextureResource};
use crate::error::{DeviceError, DeviceResult};
use crate::validation;
use std::sync::Arc;
use strata_core::api::{
    FramebufferDescriptor, NativeAttachment, NativeFramebufferDescriptor, TextureFormat,
};
use strata_core::error::ValidationError;
use strata_core::handle::{kind, FramebufferHandle, ResourceKindId, TextureHandle};
use strata_core::native::NativeFramebuffer;

/// A live framebuffer.
///
/// It records the handles of its attachments, not the textures themselves:
/// destroying an attachment does not destroy the framebuffer, but binding it
/// fails from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferResource {
    /// The backend object.
    pub native: NativeFramebuffer,
    /// Color attachments, in render target order.
    pub color_attachments: Vec<TextureHandle>,
    /// Depth/stencil attachment.
    pub depth_stencil_attachment: Option<TextureHandle>,
    /// Width shared by every attachment.
    pub width: u32,
    /// Height shared by every attachment.
    pub height: u32,
    /// Formats of the color attachments.
    pub color_formats: Vec<TextureFormat>,
    /// Format of the depth/stencil attachment.
    pub depth_format: Option<TextureFormat>,
    /// Debug label.
    pub label: Option<String>,
}

impl FramebufferResource {
    /// Every attachment handle, colors first.
    pub fn attachments(&self) -> impl Iterator<Item = TextureHandle> + '_ {
        self.color_attachments
            .iter()
            .copied()
            .chain(self.depth_stencil_attachment)
    }
}

fn native_attachment(texture: &TextureResource) -> NativeAttachment {
    NativeAttachment {
        texture: texture.native,
        format: texture.native_format,
    }
}

impl Device {
    /// Creates a framebuffer from live textures.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidHandle`] if an attachment is stale, and
    /// [`ValidationError::EmptyFramebuffer`] without attachments, whatever the
    /// validation mode.
    #[track_caller]
    pub fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> DeviceResult<FramebufferHandle> {
        self.ensure_recording("create_framebuffer")?;
        if descriptor.color_attachments.is_empty() && descriptor.depth_stencil_attachment.is_none() {
            return Err(ValidationError::EmptyFramebuffer.into());
        }

        let mut colors = Vec::with_capacity(descriptor.color_attachments.len());
        for &handle in descriptor.color_attachments.iter() {
            colors.push(self.textures.get(&self.handles, handle)?);
        }
        let depth = match descriptor.depth_stencil_attachment {
            Some(handle) => Some(self.textures.get(&self.handles, handle)?),
            None => None,
        };
        if self.validate {
            validation::framebuffer(&colors, depth, &self.capabilities)?;
        }

        let first = colors.first().copied().or(depth);
        let (width, height) = first.map_or((0, 0), |texture| (texture.size.width, texture.size.height));
        let color_formats: Vec<_> = colors.iter().map(|texture| texture.format).collect();
        let depth_format = depth.map(|texture| texture.format);
        let native_descriptor = NativeFramebufferDescriptor {
            label: descriptor.label.as_deref(),
            color_attachments: colors.iter().map(|&texture| native_attachment(texture)).collect(),
            depth_stencil_attachment: depth.map(native_attachment),
            width,
            height,
        };

        let native = match self.backend.create_framebuffer(&native_descriptor) {
            Ok(native) => native,
            Err(error) => return Err(self.creation_failed(ResourceKindId::Framebuffer, error)),
        };
        let handle = self.handles.allocate::<kind::Framebuffer>();
        self.framebuffers.store(
            handle,
            FramebufferResource {
                native,
                color_attachments: descriptor.color_attachments.to_vec(),
                depth_stencil_attachment: descriptor.depth_stencil_attachment,
                width,
                height,
                color_formats,
                depth_format,
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::debug!("Created framebuffer {handle:?} ({width}x{height})");
        Ok(handle)
    }

    /// Destroys a framebuffer. Its attachments are left alone.
    #[track_caller]
    pub fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_framebuffer")?;
        let resource = self.framebuffers.remove(&self.handles, framebuffer)?;
        self.handles.free(framebuffer);

        let backend = Arc::clone(&self.backend);
        self.queues.framebuffers.enqueue_pending(
            resource.native,
            Box::new(move |native| backend.destroy_framebuffer(native)),
        );
        log::debug!("Destroyed framebuffer {framebuffer:?}, release deferred");
        Ok(())
    }

    /// The metadata of a live framebuffer.
    #[track_caller]
    pub fn framebuffer_info(&self, framebuffer: FramebufferHandle) -> DeviceResult<&FramebufferResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.framebuffers.get(&self.handles, framebuffer)?)
    }
}
