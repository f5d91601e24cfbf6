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

use super::Device;
use crate::error::{DeviceError, DeviceResult};
use crate::validation;
use std::sync::Arc;
use strata_core::api::{
    Extent3D, SampleCount, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage,
};
use strata_core::error::ValidationError;
use strata_core::handle::{kind, ResourceKindId, TextureHandle};
use strata_core::native::{NativeFormat, NativeTexture};

/// A live texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureResource {
    /// The backend object.
    pub native: NativeTexture,
    /// The backend code of `format`.
    pub native_format: NativeFormat,
    /// The abstract texel format.
    pub format: TextureFormat,
    /// Size of mip level 0.
    pub size: Extent3D,
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Number of mip levels.
    pub mip_level_count: u32,
    /// Samples per texel.
    pub sample_count: SampleCount,
    /// Allowed usages.
    pub usage: TextureUsage,
    /// Debug label.
    pub label: Option<String>,
}

impl TextureResource {
    /// The extent of mip level `level`.
    pub fn mip_size(&self, level: u32) -> Extent3D {
        self.size.mip_level(level, self.dimension)
    }

    /// The number of bytes a full upload of mip level `level` carries.
    pub fn level_size_in_bytes(&self, level: u32) -> u64 {
        let extent = self.mip_size(level);
        self.format
            .level_size_in_bytes(extent.width, extent.height, extent.depth_or_array_layers)
    }
}

impl Device {
    /// Creates a texture.
    ///
    /// The format must be in the capability table whatever the validation
    /// mode; the backend only ever receives native codes from the table.
    ///
    /// # Errors
    ///
    /// [`DeviceError::UnsupportedFormat`] for a format the backend lacks,
    /// [`DeviceError::Validation`] for a malformed description and
    /// [`DeviceError::ResourceCreation`] if the backend refuses it.
    pub fn create_texture(&mut self, descriptor: &TextureDescriptor) -> DeviceResult<TextureHandle> {
        self.ensure_recording("create_texture")?;
        let native_format = self.capabilities.to_native(descriptor.format)?;
        if self.validate {
            let features = self.capabilities.format_features(descriptor.format);
            validation::texture(descriptor, features, &self.capabilities)?;
        }

        let native = match self.backend.create_texture(descriptor, native_format) {
            Ok(native) => native,
            Err(error) => return Err(self.creation_failed(ResourceKindId::Texture, error)),
        };
        let handle = self.handles.allocate::<kind::Texture>();
        self.textures.store(
            handle,
            TextureResource {
                native,
                native_format,
                format: descriptor.format,
                size: descriptor.size,
                dimension: descriptor.dimension,
                mip_level_count: descriptor.mip_level_count,
                sample_count: descriptor.sample_count,
                usage: descriptor.usage,
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::debug!(
            "Created texture {handle:?} ({:?} {}x{}x{}, {} mips)",
            descriptor.format,
            descriptor.size.width,
            descriptor.size.height,
            descriptor.size.depth_or_array_layers,
            descriptor.mip_level_count
        );
        Ok(handle)
    }

    /// Uploads every texel of mip level `mip_level`.
    ///
    /// `data` must be exactly [`TextureResource::level_size_in_bytes`] long
    /// and the texture needs [`TextureUsage::COPY_DST`].
    #[track_caller]
    pub fn write_texture(
        &mut self,
        texture: TextureHandle,
        mip_level: u32,
        data: &[u8],
    ) -> DeviceResult<()> {
        self.ensure_recording("write_texture")?;
        let resource = self.textures.get(&self.handles, texture)?;
        if self.validate {
            if !resource.usage.contains(TextureUsage::COPY_DST) {
                return Err(ValidationError::MissingTextureUsage {
                    required: TextureUsage::COPY_DST,
                }
                .into());
            }
            if mip_level >= resource.mip_level_count {
                return Err(ValidationError::MipLevelOutOfRange {
                    level: mip_level,
                    count: resource.mip_level_count,
                }
                .into());
            }
            let expected = resource.level_size_in_bytes(mip_level);
            if data.len() as u64 != expected {
                return Err(ValidationError::DataSizeMismatch {
                    expected,
                    actual: data.len() as u64,
                }
                .into());
            }
        }

        let native = resource.native;
        self.backend
            .write_texture(native, mip_level, data)
            .map_err(|error| self.upload_failed(ResourceKindId::Texture, error))
    }

    /// Destroys a texture. The native release is deferred like buffers.
    ///
    /// Framebuffers using the texture keep existing but can no longer be
    /// bound.
    #[track_caller]
    pub fn destroy_texture(&mut self, texture: TextureHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_texture")?;
        let resource = self.textures.remove(&self.handles, texture)?;
        self.handles.free(texture);

        let backend = Arc::clone(&self.backend);
        self.queues.textures.enqueue_pending(
            resource.native,
            Box::new(move |native| backend.destroy_texture(native)),
        );
        log::debug!("Destroyed texture {texture:?}, release deferred");
        Ok(())
    }

    /// The metadata of a live texture.
    #[track_caller]
    pub fn texture_info(&self, texture: TextureHandle) -> DeviceResult<&TextureResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.textures.get(&self.handles, texture)?)
    }
}
