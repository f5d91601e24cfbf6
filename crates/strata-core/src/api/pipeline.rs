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

//! Vertex layouts and complete pipeline descriptions.

use crate::api::format::TextureFormat;
use crate::api::state::{BlendStateKey, DepthStencilStateKey, RasterizerStateKey};
use crate::handle::ShaderProgramHandle;
use crate::native::{
    NativeBlendState, NativeDepthStencilState, NativeFormat, NativeProgram, NativeRasterizerState,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    /// Four unsigned bytes.
    Uint8x4,
    /// Four unsigned bytes, normalized to [0, 1].
    Unorm8x4,
    /// Two signed 16-bit integers.
    Sint16x2,
    /// One 32-bit unsigned integer.
    Uint32,
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
}

impl VertexFormat {
    /// The size of the attribute in bytes.
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Uint8x4
            | VertexFormat::Unorm8x4
            | VertexFormat::Sint16x2
            | VertexFormat::Uint32
            | VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// How often a vertex buffer advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexStepMode {
    /// Once per vertex.
    #[default]
    Vertex,
    /// Once per instance.
    Instance,
}

/// One attribute inside a vertex buffer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttribute {
    /// The shader input location.
    pub shader_location: u32,
    /// The attribute format.
    pub format: VertexFormat,
    /// Byte offset from the start of the element.
    pub offset: u32,
}

/// The layout of one vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexBufferLayout {
    /// Byte distance between consecutive elements.
    pub array_stride: u32,
    /// How the buffer advances.
    pub step_mode: VertexStepMode,
    /// The attributes of one element.
    pub attributes: Vec<VertexAttribute>,
}

/// The vertex input of a pipeline: one layout per vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VertexLayout {
    /// Buffer layouts, indexed by vertex buffer slot.
    pub buffers: Vec<VertexBufferLayout>,
}

impl VertexLayout {
    /// A layout with a single per-vertex buffer whose attributes are packed in
    /// order, at consecutive shader locations.
    pub fn packed(formats: &[VertexFormat]) -> Self {
        let mut offset = 0;
        let attributes = formats
            .iter()
            .enumerate()
            .map(|(location, &format)| {
                let attribute = VertexAttribute {
                    shader_location: location as u32,
                    format,
                    offset,
                };
                offset += format.size();
                attribute
            })
            .collect();
        Self {
            buffers: vec![VertexBufferLayout {
                array_stride: offset,
                step_mode: VertexStepMode::Vertex,
                attributes,
            }],
        }
    }

    /// The total number of attributes across every buffer.
    pub fn attribute_count(&self) -> usize {
        self.buffers.iter().map(|b| b.attributes.len()).sum()
    }
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Points.
    PointList,
    /// Independent lines.
    LineList,
    /// A connected line strip.
    LineStrip,
    /// Independent triangles.
    #[default]
    TriangleList,
    /// A connected triangle strip.
    TriangleStrip,
}

/// A descriptor used to create a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The linked shader program.
    pub program: ShaderProgramHandle,
    /// The vertex input layout.
    pub vertex_layout: VertexLayout,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Blend state.
    pub blend: BlendStateKey,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilStateKey,
    /// Rasterizer state.
    pub rasterizer: RasterizerStateKey,
    /// Formats of the color targets the pipeline renders to.
    pub color_formats: Vec<TextureFormat>,
    /// Format of the depth target, if any.
    pub depth_format: Option<TextureFormat>,
}

impl PipelineDescriptor<'_> {
    /// The structural key of this pipeline. The label does not take part.
    pub fn key(&self) -> PipelineKey {
        PipelineKey {
            program: self.program,
            vertex_layout: self.vertex_layout.clone(),
            topology: self.topology,
            blend: self.blend,
            depth_stencil: self.depth_stencil,
            rasterizer: self.rasterizer,
            color_formats: self.color_formats.clone(),
            depth_format: self.depth_format,
        }
    }
}

/// Fully identifies a pipeline for caching.
///
/// The program handle includes its generation, so a program recreated in a
/// reused slot never hits a pipeline built for its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    /// The linked shader program.
    pub program: ShaderProgramHandle,
    /// The vertex input layout.
    pub vertex_layout: VertexLayout,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Blend state.
    pub blend: BlendStateKey,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilStateKey,
    /// Rasterizer state.
    pub rasterizer: RasterizerStateKey,
    /// Color target formats.
    pub color_formats: Vec<TextureFormat>,
    /// Depth target format.
    pub depth_format: Option<TextureFormat>,
}

/// A pipeline description in backend terms, with every state resolved to a
/// cached native state object.
#[derive(Debug, Clone)]
pub struct NativePipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<&'a str>,
    /// The linked program.
    pub program: NativeProgram,
    /// The vertex input layout.
    pub vertex_layout: &'a VertexLayout,
    /// Primitive assembly.
    pub topology: PrimitiveTopology,
    /// Blend state object.
    pub blend: NativeBlendState,
    /// Depth/stencil state object.
    pub depth_stencil: NativeDepthStencilState,
    /// Rasterizer state object.
    pub rasterizer: NativeRasterizerState,
    /// Native color target formats.
    pub color_formats: Vec<NativeFormat>,
    /// Native depth target format.
    pub depth_format: Option<NativeFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_accumulates_offsets() {
        let layout = VertexLayout::packed(&[
            VertexFormat::Float32x3,
            VertexFormat::Float32x2,
            VertexFormat::Unorm8x4,
        ]);
        let buffer = &layout.buffers[0];
        assert_eq!(buffer.array_stride, 24);
        let offsets: Vec<_> = buffer.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 20]);
        assert_eq!(buffer.attributes[2].shader_location, 2);
        assert_eq!(layout.attribute_count(), 3);
    }
}
