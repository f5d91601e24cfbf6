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
use strata_core::api::{AddressMode, CompareFunction, FilterMode, MipmapFilterMode, SamplerDescriptor};
use strata_core::handle::{kind, ResourceKindId, SamplerHandle};
use strata_core::native::NativeSampler;

/// A live sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerResource {
    /// The backend object.
    pub native: NativeSampler,
    /// U, V and W address modes.
    pub address_modes: [AddressMode; 3],
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Filter between mip levels.
    pub mipmap_filter: MipmapFilterMode,
    /// Maximum anisotropy.
    pub anisotropy_clamp: u16,
    /// Set for comparison samplers.
    pub compare: Option<CompareFunction>,
    /// Debug label.
    pub label: Option<String>,
}

impl Device {
    /// Creates a sampler.
    pub fn create_sampler(&mut self, descriptor: &SamplerDescriptor) -> DeviceResult<SamplerHandle> {
        self.ensure_recording("create_sampler")?;
        if self.validate {
            validation::sampler(descriptor, &self.capabilities)?;
        }

        let native = match self.backend.create_sampler(descriptor) {
            Ok(native) => native,
            Err(error) => return Err(self.creation_failed(ResourceKindId::Sampler, error)),
        };
        let handle = self.handles.allocate::<kind::Sampler>();
        self.samplers.store(
            handle,
            SamplerResource {
                native,
                address_modes: [
                    descriptor.address_mode_u,
                    descriptor.address_mode_v,
                    descriptor.address_mode_w,
                ],
                mag_filter: descriptor.mag_filter,
                min_filter: descriptor.min_filter,
                mipmap_filter: descriptor.mipmap_filter,
                anisotropy_clamp: descriptor.anisotropy_clamp,
                compare: descriptor.compare,
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::debug!("Created sampler {handle:?}");
        Ok(handle)
    }

    /// Destroys a sampler.
    #[track_caller]
    pub fn destroy_sampler(&mut self, sampler: SamplerHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_sampler")?;
        let resource = self.samplers.remove(&self.handles, sampler)?;
        self.handles.free(sampler);

        let backend = Arc::clone(&self.backend);
        self.queues.samplers.enqueue_pending(
            resource.native,
            Box::new(move |native| backend.destroy_sampler(native)),
        );
        Ok(())
    }

    /// The metadata of a live sampler.
    #[track_caller]
    pub fn sampler_info(&self, sampler: SamplerHandle) -> DeviceResult<&SamplerResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.samplers.get(&self.handles, sampler)?)
    }
}
