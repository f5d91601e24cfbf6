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

//! Binding and draw recording.
//!
//! Every bind resolves its handle through the generation check when it is
//! recorded, so the command list only ever holds natives of live resources.

use super::Device;
use crate::error::DeviceResult;
use crate::validation;
use std::ops::Range;
use strata_core::api::{
    BufferUsage, ClearValues, Command, CommandList, IndexFormat, ScissorRect, TextureUsage,
    Viewport,
};
use strata_core::error::{InvalidHandleError, ValidationError};
use strata_core::handle::{
    BufferHandle, FramebufferHandle, PipelineHandle, SamplerHandle, TextureHandle,
};

/// The command list of the frame being recorded, and the bind state draws
/// depend on.
#[derive(Debug)]
pub(super) struct Recorder {
    commands: CommandList,
    pipeline_bound: bool,
    index_buffer_bound: bool,
}

impl Recorder {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: CommandList::with_capacity(capacity),
            pipeline_bound: false,
            index_buffer_bound: false,
        }
    }

    pub(super) fn commands(&self) -> &CommandList {
        &self.commands
    }

    pub(super) fn reset(&mut self) {
        self.commands.clear();
        self.pipeline_bound = false;
        self.index_buffer_bound = false;
    }

    fn record(&mut self, command: Command) {
        log::trace!("Recorded {command:?}");
        self.commands.push(command);
    }
}

fn span(range: &Range<u32>) -> u32 {
    range.end.saturating_sub(range.start)
}

impl Device {
    fn require_buffer_usage(usage: BufferUsage, required: BufferUsage) -> Result<(), ValidationError> {
        if usage.contains(required) {
            Ok(())
        } else {
            Err(ValidationError::MissingBufferUsage { required })
        }
    }

    /// Binds a framebuffer, or the default target with `None`.
    ///
    /// Every attachment is checked again: a framebuffer whose texture was
    /// destroyed cannot be bound.
    #[track_caller]
    pub fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> DeviceResult<()> {
        self.ensure_recording("bind_framebuffer")?;
        let native = match framebuffer {
            None => None,
            Some(handle) => {
                let resource = self.framebuffers.get(&self.handles, handle)?;
                for texture in resource.attachments() {
                    self.textures.get(&self.handles, texture)?;
                }
                Some(resource.native)
            }
        };
        self.recorder.record(Command::BindFramebuffer(native));
        Ok(())
    }

    /// Binds a pipeline. Its shader program must still be alive.
    #[track_caller]
    pub fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> DeviceResult<()> {
        self.ensure_recording("bind_pipeline")?;
        let resource = self.pipelines.get(&self.handles, pipeline)?;
        if !self.handles.is_valid(resource.program) {
            return Err(InvalidHandleError::new(resource.program).into());
        }
        let native = resource.native;
        self.recorder.record(Command::BindPipeline(native));
        self.recorder.pipeline_bound = true;
        Ok(())
    }

    /// Binds a vertex buffer to `slot`, starting `offset` bytes in.
    #[track_caller]
    pub fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: BufferHandle,
        offset: u64,
    ) -> DeviceResult<()> {
        self.ensure_recording("bind_vertex_buffer")?;
        validation::slot("vertex buffer", slot, self.capabilities.limits().max_vertex_buffers)?;
        let resource = self.buffers.get(&self.handles, buffer)?;
        if self.validate {
            Self::require_buffer_usage(resource.usage, BufferUsage::VERTEX)?;
            validation::range(offset, 0, resource.size)?;
        }
        let native = resource.native;
        self.recorder.record(Command::BindVertexBuffer {
            slot,
            buffer: native,
            offset,
        });
        Ok(())
    }

    /// Binds the index buffer used by [`draw_indexed`](Self::draw_indexed).
    #[track_caller]
    pub fn bind_index_buffer(
        &mut self,
        buffer: BufferHandle,
        format: IndexFormat,
        offset: u64,
    ) -> DeviceResult<()> {
        self.ensure_recording("bind_index_buffer")?;
        let resource = self.buffers.get(&self.handles, buffer)?;
        if self.validate {
            Self::require_buffer_usage(resource.usage, BufferUsage::INDEX)?;
            validation::range(offset, 0, resource.size)?;
        }
        let native = resource.native;
        self.recorder.record(Command::BindIndexBuffer {
            buffer: native,
            format,
            offset,
        });
        self.recorder.index_buffer_bound = true;
        Ok(())
    }

    /// Binds a uniform buffer to a resource-set slot.
    ///
    /// See [`strata_core::api::resource_set`] for the slot conventions.
    #[track_caller]
    pub fn bind_uniform_buffer(
        &mut self,
        slot: u32,
        buffer: BufferHandle,
        offset: u64,
    ) -> DeviceResult<()> {
        self.ensure_recording("bind_uniform_buffer")?;
        validation::slot("uniform buffer", slot, self.capabilities.limits().max_uniform_buffers)?;
        let resource = self.buffers.get(&self.handles, buffer)?;
        if self.validate {
            Self::require_buffer_usage(resource.usage, BufferUsage::UNIFORM)?;
            validation::range(offset, 0, resource.size)?;
        }
        let native = resource.native;
        self.recorder.record(Command::BindUniformBuffer {
            slot,
            buffer: native,
            offset,
        });
        Ok(())
    }

    /// Binds a texture for sampling.
    #[track_caller]
    pub fn bind_texture(&mut self, slot: u32, texture: TextureHandle) -> DeviceResult<()> {
        self.ensure_recording("bind_texture")?;
        validation::slot("texture", slot, self.capabilities.limits().max_texture_slots)?;
        let resource = self.textures.get(&self.handles, texture)?;
        if self.validate && !resource.usage.contains(TextureUsage::TEXTURE_BINDING) {
            return Err(ValidationError::MissingTextureUsage {
                required: TextureUsage::TEXTURE_BINDING,
            }
            .into());
        }
        let native = resource.native;
        self.recorder.record(Command::BindTexture {
            slot,
            texture: native,
        });
        Ok(())
    }

    /// Binds a sampler.
    #[track_caller]
    pub fn bind_sampler(&mut self, slot: u32, sampler: SamplerHandle) -> DeviceResult<()> {
        self.ensure_recording("bind_sampler")?;
        validation::slot("sampler", slot, self.capabilities.limits().max_sampler_slots)?;
        let native = self.samplers.get(&self.handles, sampler)?.native;
        self.recorder.record(Command::BindSampler {
            slot,
            sampler: native,
        });
        Ok(())
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> DeviceResult<()> {
        self.ensure_recording("set_viewport")?;
        if self.validate {
            validation::viewport(&viewport)?;
        }
        self.recorder.record(Command::SetViewport(viewport));
        Ok(())
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor(&mut self, rect: ScissorRect) -> DeviceResult<()> {
        self.ensure_recording("set_scissor")?;
        if self.validate {
            validation::scissor(&rect)?;
        }
        self.recorder.record(Command::SetScissor(rect));
        Ok(())
    }

    /// Clears attachments of the bound framebuffer.
    pub fn clear(&mut self, values: ClearValues) -> DeviceResult<()> {
        self.ensure_recording("clear")?;
        self.recorder.record(Command::Clear(values));
        Ok(())
    }

    /// Draws non-indexed primitives with the bound pipeline.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoPipelineBound`] if no pipeline is bound, and
    /// [`ValidationError::InvalidDrawRange`] for an inverted range when
    /// validating.
    pub fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) -> DeviceResult<()> {
        self.ensure_recording("draw")?;
        if !self.recorder.pipeline_bound {
            return Err(ValidationError::NoPipelineBound.into());
        }
        if self.validate {
            validation::draw_range(&vertices)?;
            validation::draw_range(&instances)?;
        }
        self.recorder.record(Command::Draw {
            vertex_count: span(&vertices),
            instance_count: span(&instances),
            first_vertex: vertices.start,
            first_instance: instances.start,
        });
        Ok(())
    }

    /// Draws indexed primitives with the bound pipeline and index buffer.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoPipelineBound`] or
    /// [`ValidationError::NoIndexBufferBound`]. Inverted ranges are
    /// [`ValidationError::InvalidDrawRange`] when validating.
    pub fn draw_indexed(
        &mut self,
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    ) -> DeviceResult<()> {
        self.ensure_recording("draw_indexed")?;
        if !self.recorder.pipeline_bound {
            return Err(ValidationError::NoPipelineBound.into());
        }
        if !self.recorder.index_buffer_bound {
            return Err(ValidationError::NoIndexBufferBound.into());
        }
        if self.validate {
            validation::draw_range(&indices)?;
            validation::draw_range(&instances)?;
        }
        self.recorder.record(Command::DrawIndexed {
            index_count: span(&indices),
            instance_count: span(&instances),
            first_index: indices.start,
            base_vertex,
            first_instance: instances.start,
        });
        Ok(())
    }
}
