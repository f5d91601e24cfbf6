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
use strata_core::api::{BufferDescriptor, BufferUsage};
use strata_core::error::ValidationError;
use strata_core::handle::{kind, BufferHandle, ResourceKindId};
use strata_core::native::NativeBuffer;

/// A live buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferResource {
    /// The backend object.
    pub native: NativeBuffer,
    /// Size in bytes.
    pub size: u64,
    /// Allowed usages.
    pub usage: BufferUsage,
    /// Debug label.
    pub label: Option<String>,
}

impl Device {
    /// Creates a buffer with zeroed contents.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Validation`] for a malformed description, in which case
    /// nothing is allocated, and [`DeviceError::ResourceCreation`] if the
    /// backend refuses the allocation.
    pub fn create_buffer(&mut self, descriptor: &BufferDescriptor) -> DeviceResult<BufferHandle> {
        self.ensure_recording("create_buffer")?;
        if self.validate {
            validation::buffer(descriptor, &self.capabilities)?;
        }

        let native = match self.backend.create_buffer(descriptor) {
            Ok(native) => native,
            Err(error) => return Err(self.creation_failed(ResourceKindId::Buffer, error)),
        };
        let handle = self.handles.allocate::<kind::Buffer>();
        self.buffers.store(
            handle,
            BufferResource {
                native,
                size: descriptor.size,
                usage: descriptor.usage,
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::debug!(
            "Created buffer {handle:?} ({} bytes, {:?})",
            descriptor.size,
            descriptor.usage
        );
        Ok(handle)
    }

    /// Creates a buffer whose first bytes are `data`.
    ///
    /// The buffer does not need [`BufferUsage::COPY_DST`].
    pub fn create_buffer_with_data(
        &mut self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> DeviceResult<BufferHandle> {
        self.ensure_recording("create_buffer_with_data")?;
        if self.validate {
            validation::range(0, data.len() as u64, descriptor.size)?;
        }

        let handle = self.create_buffer(descriptor)?;
        let native = self.buffers.get(&self.handles, handle)?.native;
        if let Err(error) = self.backend.write_buffer(native, 0, data) {
            let failure = self.upload_failed(ResourceKindId::Buffer, error);
            if !self.lost {
                self.destroy_buffer(handle)?;
            }
            return Err(failure);
        }
        Ok(handle)
    }

    /// Writes `data` at `offset`. The buffer needs [`BufferUsage::COPY_DST`].
    #[track_caller]
    pub fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> DeviceResult<()> {
        self.ensure_recording("write_buffer")?;
        let resource = self.buffers.get(&self.handles, buffer)?;
        if self.validate {
            if !resource.usage.contains(BufferUsage::COPY_DST) {
                return Err(ValidationError::MissingBufferUsage {
                    required: BufferUsage::COPY_DST,
                }
                .into());
            }
            validation::range(offset, data.len() as u64, resource.size)?;
        }

        let native = resource.native;
        self.backend
            .write_buffer(native, offset, data)
            .map_err(|error| self.upload_failed(ResourceKindId::Buffer, error))
    }

    /// Destroys a buffer.
    ///
    /// The handle is invalid as soon as this returns; the native buffer is
    /// released once the GPU has finished the current frame.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidHandle`] for a stale handle, including a second
    /// destroy of the same buffer.
    #[track_caller]
    pub fn destroy_buffer(&mut self, buffer: BufferHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_buffer")?;
        let resource = self.buffers.remove(&self.handles, buffer)?;
        self.handles.free(buffer);

        let backend = Arc::clone(&self.backend);
        self.queues.buffers.enqueue_pending(
            resource.native,
            Box::new(move |native| backend.destroy_buffer(native)),
        );
        log::debug!("Destroyed buffer {buffer:?}, release deferred");
        Ok(())
    }

    /// The metadata of a live buffer.
    #[track_caller]
    pub fn buffer_info(&self, buffer: BufferHandle) -> DeviceResult<&BufferResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.buffers.get(&self.handles, buffer)?)
    }
}
