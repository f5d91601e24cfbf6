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

//! The recorded command stream.
//!
//! Commands reference native objects only. Handles are resolved, and their
//! generation checked, when a command is recorded; the backend never sees a
//! handle.

use crate::api::buffer::IndexFormat;
use crate::native::{
    NativeBuffer, NativeFramebuffer, NativePipeline, NativeSampler, NativeTexture,
};

/// A viewport rectangle with its depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Near depth.
    pub min_depth: f32,
    /// Far depth.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` x `height` with the full depth range.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Which attachments of the bound framebuffer to clear, and to what.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearValues {
    /// Clear every color attachment to this RGBA value.
    pub color: Option<[f32; 4]>,
    /// Clear depth to this value.
    pub depth: Option<f32>,
    /// Clear stencil to this value.
    pub stencil: Option<u32>,
}

/// One recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Binds a framebuffer, or the backend's default target for `None`.
    BindFramebuffer(Option<NativeFramebuffer>),
    /// Binds a pipeline.
    BindPipeline(NativePipeline),
    /// Binds a vertex buffer to a slot.
    BindVertexBuffer {
        /// Vertex buffer slot.
        slot: u32,
        /// The buffer.
        buffer: NativeBuffer,
        /// Byte offset of the first element.
        offset: u64,
    },
    /// Binds the index buffer.
    BindIndexBuffer {
        /// The buffer.
        buffer: NativeBuffer,
        /// Index type.
        format: IndexFormat,
        /// Byte offset of the first index.
        offset: u64,
    },
    /// Binds a uniform buffer to a resource set slot.
    BindUniformBuffer {
        /// Resource set slot.
        slot: u32,
        /// The buffer.
        buffer: NativeBuffer,
        /// Byte offset of the bound range.
        offset: u64,
    },
    /// Binds a texture to a texture slot.
    BindTexture {
        /// Texture slot.
        slot: u32,
        /// The texture.
        texture: NativeTexture,
    },
    /// Binds a sampler to a sampler slot.
    BindSampler {
        /// Sampler slot.
        slot: u32,
        /// The sampler.
        sampler: NativeSampler,
    },
    /// Sets the viewport.
    SetViewport(Viewport),
    /// Sets the scissor rectangle.
    SetScissor(ScissorRect),
    /// Clears attachments of the bound framebuffer.
    Clear(ClearValues),
    /// A non-indexed draw.
    Draw {
        /// Vertices per instance.
        vertex_count: u32,
        /// Instances.
        instance_count: u32,
        /// First vertex.
        first_vertex: u32,
        /// First instance.
        first_instance: u32,
    },
    /// An indexed draw.
    DrawIndexed {
        /// Indices per instance.
        index_count: u32,
        /// Instances.
        instance_count: u32,
        /// First index.
        first_index: u32,
        /// Value added to every index.
        base_vertex: i32,
        /// First instance.
        first_instance: u32,
    },
}

impl Command {
    /// Returns `true` for draw commands.
    pub const fn is_draw(&self) -> bool {
        matches!(self, Command::Draw { .. } | Command::DrawIndexed { .. })
    }
}

/// The commands recorded during one frame.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    commands: Vec<Command>,
    draw_calls: u32,
}

impl CommandList {
    /// An empty list with room for `capacity` commands.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            draw_calls: 0,
        }
    }

    /// Appends a command.
    pub fn push(&mut self, command: Command) {
        if command.is_draw() {
            self.draw_calls += 1;
        }
        self.commands.push(command);
    }

    /// The recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The number of draw commands.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// Removes every command, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.draw_calls = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_draws() {
        let mut list = CommandList::with_capacity(4);
        list.push(Command::BindPipeline(NativePipeline(1)));
        list.push(Command::Draw {
            vertex_count: 3,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        });
        assert_eq!(list.len(), 2);
        assert_eq!(list.draw_calls(), 1);

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.draw_calls(), 0);
    }
}
