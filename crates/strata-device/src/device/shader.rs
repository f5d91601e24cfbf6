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
use strata_core::api::{ShaderProgramDescriptor, ShaderStageSource};
use strata_core::error::BackendError;
use strata_core::handle::{kind, ResourceKindId, ShaderProgramHandle};
use strata_core::native::{NativeProgram, NativeShaderModule};

/// A live shader program.
///
/// The compiled stages are shared through the shader module cache and outlive
/// the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgramResource {
    /// The linked backend program.
    pub native: NativeProgram,
    /// The compiled vertex stage.
    pub vertex_module: NativeShaderModule,
    /// The compiled fragment stage, absent for depth-only programs.
    pub fragment_module: Option<NativeShaderModule>,
    /// Vertex entry point.
    pub vertex_entry: String,
    /// Fragment entry point.
    pub fragment_entry: Option<String>,
    /// Debug label.
    pub label: Option<String>,
}

impl ShaderProgramResource {
    /// 1 or 2.
    pub fn stage_count(&self) -> usize {
        1 + usize::from(self.fragment_module.is_some())
    }
}

impl Device {
    fn shader_module(&self, source: &ShaderStageSource) -> Result<NativeShaderModule, BackendError> {
        let backend = &self.backend;
        self.caches
            .shader_modules
            .get_or_try_create(&source.module_key(), |key| {
                log::debug!("Compiling {:?} stage '{}' ({:?})", key.stage, key.entry_point, key.digest);
                backend.compile_shader_module(source)
            })
    }

    /// Compiles and links a shader program.
    ///
    /// Identical stages are compiled once per device, whichever program first
    /// needs them.
    pub fn create_shader_program(
        &mut self,
        descriptor: &ShaderProgramDescriptor,
    ) -> DeviceResult<ShaderProgramHandle> {
        self.ensure_recording("create_shader_program")?;
        if self.validate {
            validation::shader_program(descriptor)?;
        }

        let linked = self.shader_module(&descriptor.vertex).and_then(|vertex| {
            let fragment = descriptor
                .fragment
                .as_ref()
                .map(|source| self.shader_module(source))
                .transpose()?;
            let native = self
                .backend
                .create_program(descriptor.label.as_deref(), vertex, fragment)?;
            Ok((native, vertex, fragment))
        });
        let (native, vertex_module, fragment_module) = match linked {
            Ok(linked) => linked,
            Err(error) => return Err(self.creation_failed(ResourceKindId::ShaderProgram, error)),
        };

        let handle = self.handles.allocate::<kind::ShaderProgram>();
        self.programs.store(
            handle,
            ShaderProgramResource {
                native,
                vertex_module,
                fragment_module,
                vertex_entry: descriptor.vertex.entry_point.to_string(),
                fragment_entry: descriptor
                    .fragment
                    .as_ref()
                    .map(|source| source.entry_point.to_string()),
                label: descriptor.label.as_deref().map(str::to_owned),
            },
        );
        log::debug!("Created shader program {handle:?}");
        Ok(handle)
    }

    /// Destroys a shader program.
    ///
    /// Pipelines built from it stay alive but can no longer be bound.
    #[track_caller]
    pub fn destroy_shader_program(&mut self, program: ShaderProgramHandle) -> DeviceResult<()> {
        self.ensure_recording("destroy_shader_program")?;
        let resource = self.programs.remove(&self.handles, program)?;
        self.handles.free(program);

        let backend = Arc::clone(&self.backend);
        self.queues.programs.enqueue_pending(
            resource.native,
            Box::new(move |native| backend.destroy_program(native)),
        );
        log::debug!("Destroyed shader program {program:?}, release deferred");
        Ok(())
    }

    /// The metadata of a live shader program.
    #[track_caller]
    pub fn shader_program_info(
        &self,
        program: ShaderProgramHandle,
    ) -> DeviceResult<&ShaderProgramResource> {
        if self.lost {
            return Err(DeviceError::DeviceLost);
        }
        Ok(self.programs.get(&self.handles, program)?)
    }
}
