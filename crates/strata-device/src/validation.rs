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

//! Structural checks of creation descriptions and recorded commands.
//!
//! Every function here is pure: it inspects a description against the
//! [`CapabilityTable`] and either accepts it or names the first problem found.
//! The device skips them when validation is disabled.

use crate::capabilities::CapabilityTable;
use crate::device::TextureResource;
use std::ops::Range;
use strata_core::api::*;
use strata_core::error::ValidationError;
use strata_core::ResourceKindId;

/// Checks a buffer description.
pub fn buffer(descriptor: &BufferDescriptor, caps: &CapabilityTable) -> Result<(), ValidationError> {
    if descriptor.size == 0 {
        return Err(ValidationError::ZeroSizedBuffer);
    }
    let max = caps.limits().max_buffer_size;
    if descriptor.size > max {
        return Err(ValidationError::BufferTooLarge {
            size: descriptor.size,
            max,
        });
    }
    if descriptor.usage.is_empty() {
        return Err(ValidationError::EmptyUsage {
            kind: ResourceKindId::Buffer,
        });
    }
    Ok(())
}

/// Checks a texture description. `features` are the format's features.
pub fn texture(
    descriptor: &TextureDescriptor,
    features: FormatFeatures,
    caps: &CapabilityTable,
) -> Result<(), ValidationError> {
    let size = descriptor.size;
    if size.width == 0 || size.height == 0 || size.depth_or_array_layers == 0 {
        return Err(ValidationError::ZeroSizedTexture);
    }

    let limits = caps.limits();
    let (extents, max_extent, layers) = match descriptor.dimension {
        TextureDimension::D1 => ([size.width, 1, 1], limits.max_texture_dimension_2d, size.depth_or_array_layers),
        TextureDimension::D2 => (
            [size.width, size.height, 1],
            limits.max_texture_dimension_2d,
            size.depth_or_array_layers,
        ),
        TextureDimension::D3 => (
            [size.width, size.height, size.depth_or_array_layers],
            limits.max_texture_dimension_3d,
            1,
        ),
    };
    if let Some(&too_large) = extents.iter().find(|&&extent| extent > max_extent) {
        return Err(ValidationError::TextureTooLarge {
            size: too_large,
            max: max_extent,
        });
    }
    if layers > limits.max_texture_array_layers {
        return Err(ValidationError::TextureTooLarge {
            size: layers,
            max: limits.max_texture_array_layers,
        });
    }

    let max_mips = size.max_mips(descriptor.dimension);
    if descriptor.mip_level_count == 0 || descriptor.mip_level_count > max_mips {
        return Err(ValidationError::InvalidMipLevelCount {
            requested: descriptor.mip_level_count,
            max: max_mips,
        });
    }

    let samples = descriptor.sample_count.count();
    let multisampled = samples > 1;
    if samples > limits.max_sample_count
        || (multisampled
            && (descriptor.mip_level_count > 1 || descriptor.dimension != TextureDimension::D2))
    {
        return Err(ValidationError::InvalidSampleCount {
            requested: samples,
            max: limits.max_sample_count,
        });
    }

    if descriptor.format.is_compressed() {
        let (block_w, block_h) = descriptor.format.block_dimensions();
        if descriptor.dimension != TextureDimension::D2
            || size.width % block_w != 0
            || size.height % block_h != 0
        {
            return Err(ValidationError::CompressedTextureShape {
                format: descriptor.format,
                width: size.width,
                height: size.height,
            });
        }
    }

    if descriptor.usage.is_empty() {
        return Err(ValidationError::EmptyUsage {
            kind: ResourceKindId::Texture,
        });
    }
    let required = [
        (TextureUsage::TEXTURE_BINDING, FormatFeatures::SAMPLED),
        (TextureUsage::STORAGE_BINDING, FormatFeatures::STORAGE),
    ];
    for (usage, feature) in required {
        if descriptor.usage.contains(usage) && !features.contains(feature) {
            return Err(ValidationError::FormatFeatureMissing {
                format: descriptor.format,
                required: feature,
            });
        }
    }
    if descriptor.usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        let attachment = if descriptor.format.is_depth() {
            FormatFeatures::DEPTH_STENCIL_ATTACHMENT
        } else {
            FormatFeatures::COLOR_ATTACHMENT
        };
        if !features.contains(attachment) {
            return Err(ValidationError::FormatFeatureMissing {
                format: descriptor.format,
                required: attachment,
            });
        }
    }
    Ok(())
}

/// Checks a sampler description.
pub fn sampler(descriptor: &SamplerDescriptor, caps: &CapabilityTable) -> Result<(), ValidationError> {
    let (min, max) = (descriptor.lod_min_clamp, descriptor.lod_max_clamp);
    if !(min >= 0.0 && max >= min) {
        return Err(ValidationError::InvalidLodRange);
    }

    let anisotropy = descriptor.anisotropy_clamp;
    if anisotropy == 0 {
        return Err(ValidationError::AnisotropyTooHigh {
            requested: 0,
            max: caps.limits().max_sampler_anisotropy,
        });
    }
    if anisotropy > 1 {
        if !caps.has_feature(DeviceFeatures::SAMPLER_ANISOTROPY) {
            return Err(ValidationError::MissingFeature(DeviceFeatures::SAMPLER_ANISOTROPY));
        }
        let max = caps.limits().max_sampler_anisotropy;
        if anisotropy > max {
            return Err(ValidationError::AnisotropyTooHigh {
                requested: anisotropy,
                max,
            });
        }
    }

    if descriptor.uses_border() && !caps.has_feature(DeviceFeatures::ADDRESS_MODE_CLAMP_TO_BORDER) {
        return Err(ValidationError::MissingFeature(
            DeviceFeatures::ADDRESS_MODE_CLAMP_TO_BORDER,
        ));
    }
    Ok(())
}

/// Checks resolved framebuffer attachments.
pub fn framebuffer(
    colors: &[&TextureResource],
    depth: Option<&TextureResource>,
    caps: &CapabilityTable,
) -> Result<(), ValidationError> {
    let max = caps.limits().max_color_attachments;
    if colors.len() as u32 > max {
        return Err(ValidationError::TooManyColorAttachments {
            count: colors.len() as u32,
            max,
        });
    }

    let mut expected = None;
    let attachments = colors
        .iter()
        .map(|&texture| (texture, "color"))
        .chain(depth.map(|texture| (texture, "depth")));
    for (texture, role) in attachments {
        let found = (texture.size.width, texture.size.height);
        match expected {
            None => expected = Some(found),
            Some(expected) if expected != found => {
                return Err(ValidationError::AttachmentSizeMismatch { expected, found });
            }
            Some(_) => {}
        }
        if texture.format.is_depth() != (role == "depth") || texture.format.is_compressed() {
            return Err(ValidationError::AttachmentFormat {
                format: texture.format,
                role,
            });
        }
        if !texture.usage.contains(TextureUsage::RENDER_ATTACHMENT) {
            return Err(ValidationError::MissingTextureUsage {
                required: TextureUsage::RENDER_ATTACHMENT,
            });
        }
    }

    match expected {
        Some(_) => Ok(()),
        None => Err(ValidationError::EmptyFramebuffer),
    }
}

/// The lowercase name of a stage.
pub const fn stage_name(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertex",
        ShaderStage::Fragment => "fragment",
    }
}

fn shader_stage(source: &ShaderStageSource, expected: ShaderStage) -> Result<(), ValidationError> {
    if source.stage != expected {
        return Err(ValidationError::ShaderStageMismatch {
            expected: stage_name(expected),
            found: stage_name(source.stage),
        });
    }
    if source.code.is_empty() || source.entry_point.is_empty() {
        return Err(ValidationError::EmptyShaderStage {
            stage: stage_name(expected),
        });
    }
    if !source.language.is_binary() && std::str::from_utf8(&source.code).is_err() {
        return Err(ValidationError::ShaderSourceEncoding {
            stage: stage_name(expected),
        });
    }
    Ok(())
}

/// Checks a shader program description.
pub fn shader_program(descriptor: &ShaderProgramDescriptor) -> Result<(), ValidationError> {
    shader_stage(&descriptor.vertex, ShaderStage::Vertex)?;
    if let Some(fragment) = &descriptor.fragment {
        shader_stage(fragment, ShaderStage::Fragment)?;
    }
    Ok(())
}

fn vertex_layout(layout: &VertexLayout, limits: &DeviceLimits) -> Result<(), ValidationError> {
    let reason = |reason: String| ValidationError::InvalidVertexLayout { reason };

    if layout.buffers.len() as u32 > limits.max_vertex_buffers {
        return Err(reason(format!(
            "{} vertex buffers exceed the limit of {}",
            layout.buffers.len(),
            limits.max_vertex_buffers
        )));
    }
    if layout.attribute_count() as u32 > limits.max_vertex_attributes {
        return Err(reason(format!(
            "{} attributes exceed the limit of {}",
            layout.attribute_count(),
            limits.max_vertex_attributes
        )));
    }

    let mut locations = Vec::with_capacity(layout.attribute_count());
    for (slot, buffer) in layout.buffers.iter().enumerate() {
        for attribute in &buffer.attributes {
            if locations.contains(&attribute.shader_location) {
                return Err(reason(format!(
                    "shader location {} is used twice",
                    attribute.shader_location
                )));
            }
            locations.push(attribute.shader_location);

            let Some(end) = attribute.offset.checked_add(attribute.format.size()) else {
                return Err(reason(format!(
                    "attribute at location {} of buffer {slot} overflows its offset",
                    attribute.shader_location
                )));
            };
            if buffer.array_stride != 0 && end > buffer.array_stride {
                return Err(reason(format!(
                    "attribute at location {} of buffer {slot} ends at byte {end}, past the stride of {}",
                    attribute.shader_location, buffer.array_stride
                )));
            }
        }
    }
    Ok(())
}

/// Checks a pipeline description.
pub fn pipeline(descriptor: &PipelineDescriptor, caps: &CapabilityTable) -> Result<(), ValidationError> {
    if descriptor.color_formats.is_empty() && descriptor.depth_format.is_none() {
        return Err(ValidationError::NoRenderTargets);
    }
    let max = caps.limits().max_color_attachments;
    if descriptor.color_formats.len() as u32 > max {
        return Err(ValidationError::TooManyColorAttachments {
            count: descriptor.color_formats.len() as u32,
            max,
        });
    }
    for &format in &descriptor.color_formats {
        if format.is_depth() {
            return Err(ValidationError::AttachmentFormat { format, role: "color" });
        }
        if !caps
            .format_features(format)
            .contains(FormatFeatures::COLOR_ATTACHMENT)
        {
            return Err(ValidationError::FormatFeatureMissing {
                format,
                required: FormatFeatures::COLOR_ATTACHMENT,
            });
        }
        if descriptor.blend.enabled && !caps.format_features(format).contains(FormatFeatures::BLENDABLE) {
            return Err(ValidationError::FormatFeatureMissing {
                format,
                required: FormatFeatures::BLENDABLE,
            });
        }
    }

    match descriptor.depth_format {
        Some(format) if !format.is_depth() => {
            return Err(ValidationError::AttachmentFormat { format, role: "depth" });
        }
        None if descriptor.depth_stencil.needs_depth_attachment() => {
            return Err(ValidationError::DepthStateWithoutTarget);
        }
        _ => {}
    }

    if descriptor.rasterizer.polygon_mode == PolygonMode::Line
        && !caps.has_feature(DeviceFeatures::POLYGON_MODE_LINE)
    {
        return Err(ValidationError::MissingFeature(DeviceFeatures::POLYGON_MODE_LINE));
    }

    vertex_layout(&descriptor.vertex_layout, caps.limits())
}

/// Checks that `offset..offset + len` fits in `size` bytes.
pub fn range(offset: u64, len: u64, size: u64) -> Result<(), ValidationError> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        end => Err(ValidationError::OutOfBounds {
            offset,
            end: end.unwrap_or(u64::MAX),
            size,
        }),
    }
}

/// Checks that `slot` is below `max` for the named bind point.
pub fn slot(bind_point: &'static str, slot: u32, max: u32) -> Result<(), ValidationError> {
    if slot < max {
        Ok(())
    } else {
        Err(ValidationError::SlotOutOfRange {
            bind_point,
            slot,
            max,
        })
    }
}

/// Checks a viewport.
pub fn viewport(viewport: &Viewport) -> Result<(), ValidationError> {
    let finite = [viewport.x, viewport.y, viewport.width, viewport.height]
        .iter()
        .all(|value| value.is_finite());
    let depth = (0.0..=1.0).contains(&viewport.min_depth)
        && (0.0..=1.0).contains(&viewport.max_depth)
        && viewport.min_depth <= viewport.max_depth;
    if finite && viewport.width > 0.0 && viewport.height > 0.0 && depth {
        Ok(())
    } else {
        Err(ValidationError::InvalidRect)
    }
}

/// Checks a scissor rectangle.
pub fn scissor(rect: &ScissorRect) -> Result<(), ValidationError> {
    if rect.width == 0 || rect.height == 0 {
        return Err(ValidationError::InvalidRect);
    }
    Ok(())
}

/// Checks that a vertex, index or instance range of a draw is not inverted.
pub fn draw_range(range: &Range<u32>) -> Result<(), ValidationError> {
    if range.start > range.end {
        return Err(ValidationError::InvalidDrawRange {
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}
