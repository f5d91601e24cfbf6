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

mod common;

use std::sync::Arc;
use strata_core::api::*;
use strata_core::error::{BackendError, ValidationError};
use strata_core::ResourceKindId;
use strata_device::{DeviceError, ValidationMode};
use strata_infra::{BackendProfile, HeadlessBackend};

// --- Buffers ---

#[test]
fn test_buffer_uploads_land_at_the_requested_offset() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("uniforms", 8, BufferUsage::UNIFORM | BufferUsage::COPY_DST))
        .unwrap();

    // --- 2. ACT ---
    device.write_buffer(buffer, 4, &[1, 2, 3, 4]).unwrap();

    // --- 3. ASSERT ---
    let native = device.buffer_info(buffer).unwrap().native;
    assert_eq!(backend.buffer_contents(native), Some(vec![0, 0, 0, 0, 1, 2, 3, 4]));
}

#[test]
fn test_buffer_created_with_data() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let indices: [u16; 6] = [0, 1, 2, 2, 1, 3];
    let bytes: Vec<u8> = indices.iter().flat_map(|index| index.to_le_bytes()).collect();

    // --- 2. ACT ---
    // No COPY_DST needed for the initial contents.
    let buffer = device
        .create_buffer_with_data(&BufferDescriptor::new("indices", 12, BufferUsage::INDEX), &bytes)
        .unwrap();
    let too_much = device.create_buffer_with_data(&BufferDescriptor::new("indices", 4, BufferUsage::INDEX), &bytes);

    // --- 3. ASSERT ---
    let native = device.buffer_info(buffer).unwrap().native;
    assert_eq!(backend.buffer_contents(native), Some(bytes));
    assert!(matches!(
        too_much,
        Err(DeviceError::Validation(ValidationError::OutOfBounds { .. }))
    ));
    assert_eq!(device.stats().live.buffers, 1);
}

#[test]
fn test_buffer_writes_are_checked() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let sealed = device
        .create_buffer(&BufferDescriptor::new("sealed", 16, BufferUsage::VERTEX))
        .unwrap();
    let writable = device
        .create_buffer(&BufferDescriptor::new("writable", 16, BufferUsage::COPY_DST))
        .unwrap();

    // --- 2. ACT ---
    let no_usage = device.write_buffer(sealed, 0, &[0; 4]);
    let overflow = device.write_buffer(writable, 12, &[0; 8]);
    let wrapping = device.write_buffer(writable, u64::MAX, &[0; 1]);

    // --- 3. ASSERT ---
    assert_eq!(
        no_usage,
        Err(DeviceError::Validation(ValidationError::MissingBufferUsage {
            required: BufferUsage::COPY_DST
        }))
    );
    assert_eq!(
        overflow,
        Err(DeviceError::Validation(ValidationError::OutOfBounds {
            offset: 12,
            end: 20,
            size: 16
        }))
    );
    assert!(matches!(
        wrapping,
        Err(DeviceError::Validation(ValidationError::OutOfBounds { .. }))
    ));
}

#[test]
fn test_out_of_memory_leaves_the_device_usable() {
    // --- 1. ARRANGE ---
    let backend = Arc::new(HeadlessBackend::new(BackendProfile::Vulkan).with_memory_budget(1024));
    let mut device = common::device(&backend);
    device.begin_frame().unwrap();

    // --- 2. ACT ---
    let too_big = device.create_buffer(&BufferDescriptor::new("huge", 4096, BufferUsage::VERTEX));
    let fits = device.create_buffer(&BufferDescriptor::new("small", 512, BufferUsage::VERTEX));

    // --- 3. ASSERT ---
    assert_eq!(
        too_big,
        Err(DeviceError::ResourceCreation {
            kind: ResourceKindId::Buffer,
            source: BackendError::OutOfMemory { requested: 4096 },
        })
    );
    assert!(fits.is_ok());
    assert!(!device.is_lost());
    assert_eq!(device.stats().live.buffers, 1);
}

#[test]
fn test_huge_buffer_past_the_budget_is_refused_without_validation() {
    // --- 1. ARRANGE ---
    let backend = Arc::new(HeadlessBackend::new(BackendProfile::Vulkan).with_memory_budget(1 << 20));
    let mut device = common::device_with(&backend, ValidationMode::Disabled);
    device.begin_frame().unwrap();
    let size = u64::MAX / 2;

    // --- 2. ACT ---
    let result = device.create_buffer(&BufferDescriptor::new("huge", size, BufferUsage::VERTEX));

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(DeviceError::ResourceCreation {
            kind: ResourceKindId::Buffer,
            source: BackendError::OutOfMemory { requested: size },
        })
    );
    assert_eq!(backend.memory_used(), 0);
    assert!(!device.is_lost());
}

#[test]
fn test_disabled_validation_skips_description_checks() {
    // --- 1. ARRANGE ---
    let backend = common::backend(strata_infra::FenceMode::Immediate);
    let mut device = common::device_with(&backend, ValidationMode::Disabled);
    device.begin_frame().unwrap();
    let vertex_only = device
        .create_buffer(&BufferDescriptor::new("vertices", 16, BufferUsage::VERTEX))
        .unwrap();

    // --- 2. ACT ---
    // Bound as an index buffer: the usage flag is only checked when validating.
    let misused = device.bind_index_buffer(vertex_only, IndexFormat::Uint16, 0);
    // Slot ranges are checked regardless.
    let out_of_range = device.bind_vertex_buffer(1_000, vertex_only, 0);

    // --- 3. ASSERT ---
    assert!(!device.validation_enabled());
    assert!(misused.is_ok());
    assert!(matches!(
        out_of_range,
        Err(DeviceError::Validation(ValidationError::SlotOutOfRange { slot: 1_000, .. }))
    ));
}

// --- Textures ---

#[test]
fn test_texture_uploads_match_the_mip_level_size() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let descriptor = TextureDescriptor {
        mip_level_count: 3,
        ..TextureDescriptor::d2(
            "albedo",
            16,
            8,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        )
    };
    let texture = device.create_texture(&descriptor).unwrap();

    // --- 2. ACT ---
    let level_two = device.write_texture(texture, 2, &[0; 4 * 2 * 4]);
    let wrong_size = device.write_texture(texture, 0, &[0; 16]);
    let missing_level = device.write_texture(texture, 3, &[]);

    // --- 3. ASSERT ---
    assert!(level_two.is_ok());
    assert_eq!(
        wrong_size,
        Err(DeviceError::Validation(ValidationError::DataSizeMismatch {
            expected: 16 * 8 * 4,
            actual: 16
        }))
    );
    assert_eq!(
        missing_level,
        Err(DeviceError::Validation(ValidationError::MipLevelOutOfRange { level: 3, count: 3 }))
    );
    let info = device.texture_info(texture).unwrap();
    assert_eq!(info.mip_size(2), Extent3D::d2(4, 2));
}

#[test]
fn test_invalid_texture_description_allocates_nothing() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let descriptor = TextureDescriptor {
        mip_level_count: 10,
        ..common::render_target("target", 64, 64, TextureFormat::Rgba8Unorm)
    };

    // --- 2. ACT ---
    let result = device.create_texture(&descriptor);

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(DeviceError::Validation(ValidationError::InvalidMipLevelCount {
            requested: 10,
            max: 7
        }))
    );
    assert_eq!(backend.total_live(), 0);
    assert_eq!(device.stats().live.total(), 0);
}

// --- Framebuffers ---

#[test]
fn test_framebuffer_with_a_destroyed_attachment_cannot_be_bound() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let color = device
        .create_texture(&common::render_target("color", 64, 64, TextureFormat::Rgba8Unorm))
        .unwrap();
    let depth = device
        .create_texture(&common::render_target("depth", 64, 64, TextureFormat::Depth24Plus))
        .unwrap();
    let framebuffer = device
        .create_framebuffer(&FramebufferDescriptor {
            label: Some("gbuffer".into()),
            color_attachments: vec![color].into(),
            depth_stencil_attachment: Some(depth),
        })
        .unwrap();
    assert!(device.bind_framebuffer(Some(framebuffer)).is_ok());

    // --- 2. ACT ---
    device.destroy_texture(depth).unwrap();
    let result = device.bind_framebuffer(Some(framebuffer));

    // --- 3. ASSERT ---
    let Err(DeviceError::InvalidHandle(error)) = result else {
        panic!("binding must fail once an attachment is gone, got {result:?}");
    };
    assert_eq!(error.kind, ResourceKindId::Texture);
    assert!(device.is_valid(framebuffer));
    let info = device.framebuffer_info(framebuffer).unwrap();
    assert_eq!((info.width, info.height), (64, 64));
    assert_eq!(info.depth_format, Some(TextureFormat::Depth24Plus));
    // The default target is always bindable.
    assert!(device.bind_framebuffer(None).is_ok());
}

#[test]
fn test_framebuffer_attachments_must_agree() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let small = device
        .create_texture(&common::render_target("small", 32, 32, TextureFormat::Rgba8Unorm))
        .unwrap();
    let large = device
        .create_texture(&common::render_target("large", 64, 64, TextureFormat::Rgba8Unorm))
        .unwrap();

    // --- 2. ACT ---
    let mismatched = device.create_framebuffer(&FramebufferDescriptor {
        label: None,
        color_attachments: vec![small, large].into(),
        depth_stencil_attachment: None,
    });
    let empty = device.create_framebuffer(&FramebufferDescriptor::default());

    // --- 3. ASSERT ---
    assert_eq!(
        mismatched,
        Err(DeviceError::Validation(ValidationError::AttachmentSizeMismatch {
            expected: (32, 32),
            found: (64, 64)
        }))
    );
    assert_eq!(empty, Err(DeviceError::Validation(ValidationError::EmptyFramebuffer)));
}

// --- Recording ---

#[test]
fn test_draws_need_their_bind_state() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(program))
        .unwrap();
    let indices = device
        .create_buffer(&BufferDescriptor::new("indices", 12, BufferUsage::INDEX))
        .unwrap();

    // --- 2. ACT ---
    let unbound = device.draw(0..3, 0..1);
    device.bind_pipeline(pipeline).unwrap();
    let without_indices = device.draw_indexed(0..6, 0, 0..1);
    device.bind_index_buffer(indices, IndexFormat::Uint16, 0).unwrap();
    device.draw(0..3, 0..1).unwrap();
    device.draw_indexed(0..6, 0, 0..4).unwrap();
    device.end_frame().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(unbound, Err(DeviceError::Validation(ValidationError::NoPipelineBound)));
    assert_eq!(
        without_indices,
        Err(DeviceError::Validation(ValidationError::NoIndexBufferBound))
    );
    let stats = device.stats();
    assert_eq!(stats.last_frame_draw_calls, 2);
    assert_eq!(stats.last_frame_commands, 4);
    assert_eq!(backend.draw_call_count(), 2);
}

#[test]
fn test_inverted_draw_ranges_are_rejected() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(program))
        .unwrap();
    let indices = device
        .create_buffer(&BufferDescriptor::new("indices", 12, BufferUsage::INDEX))
        .unwrap();
    device.bind_pipeline(pipeline).unwrap();
    device.bind_index_buffer(indices, IndexFormat::Uint16, 0).unwrap();

    // --- 2. ACT ---
    let vertices = device.draw(5..2, 0..1);
    let instances = device.draw_indexed(0..6, 0, 4..1);
    device.end_frame().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        vertices,
        Err(DeviceError::Validation(ValidationError::InvalidDrawRange { start: 5, end: 2 }))
    );
    assert_eq!(
        instances,
        Err(DeviceError::Validation(ValidationError::InvalidDrawRange { start: 4, end: 1 }))
    );
    assert_eq!(device.stats().last_frame_draw_calls, 0);
}

#[test]
fn test_bind_state_resets_with_every_frame() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(program))
        .unwrap();
    device.bind_pipeline(pipeline).unwrap();
    device.draw(0..3, 0..1).unwrap();
    device.end_frame().unwrap();

    // --- 2. ACT ---
    device.begin_frame().unwrap();
    let result = device.draw(0..3, 0..1);

    // --- 3. ASSERT ---
    assert_eq!(result, Err(DeviceError::Validation(ValidationError::NoPipelineBound)));
}

#[test]
fn test_viewport_and_sampler_bindings() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let sampler = device.create_sampler(&SamplerDescriptor::linear_repeat()).unwrap();
    let texture = device
        .create_texture(&common::render_target("albedo", 8, 8, TextureFormat::Rgba8Unorm))
        .unwrap();

    // --- 2. ACT ---
    let viewport = device.set_viewport(Viewport::new(1280.0, 720.0));
    let negative = device.set_viewport(Viewport::new(-1.0, 720.0));
    let bind_sampler = device.bind_sampler(0, sampler);
    let bind_texture = device.bind_texture(0, texture);
    let cleared = device.clear(ClearValues {
        color: Some([0.0, 0.0, 0.0, 1.0]),
        depth: Some(1.0),
        stencil: None,
    });

    // --- 3. ASSERT ---
    assert!(viewport.is_ok());
    assert_eq!(negative, Err(DeviceError::Validation(ValidationError::InvalidRect)));
    assert!(bind_sampler.is_ok());
    assert!(bind_texture.is_ok());
    assert!(cleared.is_ok());
    let info = device.sampler_info(sampler).unwrap();
    assert_eq!(info.mag_filter, FilterMode::Linear);
    assert_eq!(info.address_modes, [AddressMode::Repeat; 3]);
}
