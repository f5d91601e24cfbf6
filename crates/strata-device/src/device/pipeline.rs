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
use strata_core::api::{NativePipelineDescriptor, PipelineDescriptor, PipelineKey};
use strata_core::error::BackendError;
use strata_core::handle::{kind, PipelineHandle, ResourceKindId, ShaderProgramHandle};
use strata_core::native::{NativeFormat, NativePipeline};

/// A live pipeline.
///
/// Handles are cheap: every handle whose description has the same structure
/// shares one cached native pipeline.
///
/// The key includes the program handle, and cached pipelines are never
/// evicted. Pipelines built from a program stay cached after the program is
/// destroyed, so recreating programs grows the cache until the device is
/// dropped. Keep programs alive for as long as their pipelines are in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResource {
    /// The shared backend pipeline.
    pub native: NativePipeline,
    /// The program the pipeline was built from.
    pub program: ShaderProgramHandle,
    /// The structural key of the cached native pipeline.
    pub key: PipelineKey,
    /// Debug label.
    pub label: Option<String>,
}

impl Device {
    /// Creates a pipeline.
    ///
    /// State objects and the native pipeline come from the device's caches:
    /// the backend builds each distinct structure once, however many
    /// pipelines request it.
    ///
    /// # Errors
    ///
    /// [`DeviceError::InvalidHandle`] for a stale program,
    /// [`DeviceError::UnsupportedFormat`] for a target format the backend
    /// lacks and [`DeviceError::Validation`] for a malformed description.
    #[track_caller]
    pub fn create_pipeline(&mut self, descriptor: &PipelineDescriptor) -> DeviceResult<PipelineHandle> {
        self.ensure_recording("create_pipeline")?;
        let program = self.programs.get(&self.handles, descriptor.program)?.native;

        let mut color_formats = Vec::with_capacity(descriptor.color_formats.len());
        for &format in &descriptor.color_formats {
            color_formats.push(self.capabilities.to_native(format)?);
        }
        let depth_format: Option<NativeFormat> = match descriptor.depth_format {
            Some(format) => Some(self.capabilities.to_native(format)?),
            None => None,
        };
        if self.validate {
            validation::pipeline(descriptor, &self.capabilities)?;
        }

        let key = descriptor.key();
        let backend = &self.backend;
        let caches = &self.caches;
        let built = (|| -> Result<NativePipeline, BackendError> {
            // State caches are resolved before the pipeline cache is entered.
            let blend = caches
                .blend
                .get_or_try_create(&key.blend, |blend| backend.create_blend_state(blend))?;
            let depth_stencil = caches
                .depth_stencil
                .get_or_try_create(&key.depth_stencil, |state| {
                    backend.create_depth_stencil_state(state)
                })?;
            let rasterizer = caches
                .rasterizer
                .get_or_try_create(&key.rasterizer, |state| backend.create_rasterizer_state(state))?;
            caches.pipelines.get_or_try_create(&key, |key| {
                log::debug!("Building pipeline for program {:?}", key.program);
                backend.create_pipeline(&NativePipelineDescriptor {
                    label: descriptor.label.as_deref(),
                    program,
                    vertex_layout: &key.vertex_layout,
                    topology: key.topology,
                    blend,
                    depth_stencil,
                    rasterizer,
                    color_formats,
                    depth_format,
                })
            })
        })();
        let native = match built {
            Ok(native) => native,
            Err(error) => return Err(self.creation_failed(ResourceKindId::Pipeline, error)),
        };

        let handle = self.handles.allocate::<kind::Pipeline>();
        self.pipelines.store(
            handle,
            PipelineResource {
                native,
                program: descriptor.program,
                key,
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::trace!("Created pipeline {handle:?}");
        Ok(handle)
    }

    /// Destroys a pipeline handle.
    ///
    /// The native pipeline stays in the cache until the device is dropped or
    /// lost, so nothing is deferred.
    #[track_caller]
    pub fn destroy_pipeline(&mut self, pipeline: PipelineHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_pipeline")?;
        self.pipelines.remove(&self.handles, pipeline)?;
        self.handles.free(pipeline);
        Ok(())
    }

    /// The metadata of a live pipeline.
    #[track_caller]
    pub fn pipeline_info(&self, pipeline: PipelineHandle) -> DeviceResult<&PipelineResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.pipelines.get(&self.handles, pipeline)?)
    }
}
