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

//! Headless Strata demo.
//!
//! Records a few frames of a textured quad, recreating its vertex buffer
//! half way through, and logs the device statistics as the fenced
//! destructions drain. `STRATA_BACKEND` picks the impersonated backend
//! profile (`vulkan`, `metal`, `d3d11`, `gles`).

use anyhow::{anyhow, Result};
use std::sync::Arc;
use strata_core::api::*;
use strata_core::handle::BufferHandle;
use strata_device::{Device, DeviceSettings};
use strata_infra::{BackendProfile, FenceMode, HeadlessBackend};

const FRAME_COUNT: u32 = 8;
const TARGET_SIZE: u32 = 256;

const SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(position, 1.0);
    out.uv = uv;
    return out;
}

@group(0) @binding(0) var albedo: texture_2d<f32>;
@group(1) @binding(0) var albedo_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(albedo, albedo_sampler, in.uv);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

const QUAD_VERTICES: &[Vertex] = &[
    Vertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
    Vertex { position: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
    Vertex { position: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
    Vertex { position: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
];

const QUAD_INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

fn backend_profile() -> Result<BackendProfile> {
    let Ok(name) = std::env::var("STRATA_BACKEND") else {
        return Ok(BackendProfile::Vulkan);
    };
    match name.to_ascii_lowercase().as_str() {
        "vulkan" => Ok(BackendProfile::Vulkan),
        "metal" => Ok(BackendProfile::Metal),
        "d3d11" => Ok(BackendProfile::Direct3D11),
        "gles" => Ok(BackendProfile::Gles),
        other => Err(anyhow!("unknown STRATA_BACKEND '{other}'")),
    }
}

/// A 4x4 checkerboard in RGBA8.
fn checkerboard() -> Vec<u8> {
    (0..16u32)
        .flat_map(|texel| {
            let lit = (texel % 4 + texel / 4) % 2 == 0;
            if lit {
                [255, 255, 255, 255]
            } else {
                [32, 32, 32, 255]
            }
        })
        .collect()
}

fn create_quad_buffer(device: &mut Device, label: &str) -> Result<BufferHandle> {
    let bytes: &[u8] = bytemuck::cast_slice(QUAD_VERTICES);
    let buffer = device.create_buffer_with_data(
        &BufferDescriptor::new(label, bytes.len() as u64, BufferUsage::VERTEX),
        bytes,
    )?;
    Ok(buffer)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let profile = backend_profile()?;
    let backend = Arc::new(HeadlessBackend::new(profile).with_fence_mode(FenceMode::Lagged(2)));
    let settings = DeviceSettings::default()
        .with_label("sandbox")
        .with_env_overrides()?;
    let mut device = Device::new(backend.clone(), settings)?;
    log::info!(
        "Device '{}' on {:?}, {} formats, validation {}",
        device.label(),
        device.backend_type(),
        device.capabilities().format_count(),
        if device.validation_enabled() { "on" } else { "off" }
    );

    // Resources are created inside a frame.
    device.begin_frame()?;
    let mut vertices = create_quad_buffer(&mut device, "quad vertices")?;
    let index_bytes: &[u8] = bytemuck::cast_slice(QUAD_INDICES);
    let indices = device.create_buffer_with_data(
        &BufferDescriptor::new("quad indices", index_bytes.len() as u64, BufferUsage::INDEX),
        index_bytes,
    )?;

    let globals = device.create_buffer(&BufferDescriptor::new(
        "global constants",
        16,
        BufferUsage::UNIFORM | BufferUsage::COPY_DST,
    ))?;

    let albedo = device.create_texture(&TextureDescriptor::d2(
        "checkerboard",
        4,
        4,
        TextureFormat::Rgba8Unorm,
        TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
    ))?;
    device.write_texture(albedo, 0, &checkerboard())?;
    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("nearest".into()),
        ..SamplerDescriptor::default()
    })?;

    let color = device.create_texture(&TextureDescriptor::d2(
        "offscreen color",
        TARGET_SIZE,
        TARGET_SIZE,
        TextureFormat::Rgba8Unorm,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
    ))?;
    let depth = device.create_texture(&TextureDescriptor::d2(
        "offscreen depth",
        TARGET_SIZE,
        TARGET_SIZE,
        TextureFormat::Depth32Float,
        TextureUsage::RENDER_ATTACHMENT,
    ))?;
    let framebuffer = device.create_framebuffer(&FramebufferDescriptor {
        label: Some("offscreen".into()),
        color_attachments: vec![color].into(),
        depth_stencil_attachment: Some(depth),
    })?;

    let program = device.create_shader_program(&ShaderProgramDescriptor {
        label: Some("textured quad".into()),
        vertex: ShaderStageSource::text(ShaderStage::Vertex, ShaderLanguage::Wgsl, "vs_main", SHADER),
        fragment: Some(ShaderStageSource::text(
            ShaderStage::Fragment,
            ShaderLanguage::Wgsl,
            "fs_main",
            SHADER,
        )),
    })?;
    let pipeline = device.create_pipeline(&PipelineDescriptor {
        label: Some("textured quad".into()),
        program,
        vertex_layout: VertexLayout::packed(&[VertexFormat::Float32x3, VertexFormat::Float32x2]),
        topology: PrimitiveTopology::TriangleList,
        blend: BlendStateKey::OPAQUE,
        depth_stencil: DepthStencilStateKey::DEPTH_READ_WRITE,
        rasterizer: RasterizerStateKey::CULL_BACK,
        color_formats: vec![TextureFormat::Rgba8Unorm],
        depth_format: Some(TextureFormat::Depth32Float),
    })?;
    let token = device.end_frame()?;
    log::info!("Setup submitted as {token}");

    let index_count = QUAD_INDICES.len() as u32;
    for frame in 0..FRAME_COUNT {
        device.begin_frame()?;

        // Swap the vertex buffer half way through; the old one stays alive
        // on the GPU side until its last frame completes.
        if frame == FRAME_COUNT / 2 {
            device.destroy_buffer(vertices)?;
            vertices = create_quad_buffer(&mut device, "quad vertices (recreated)")?;
            log::info!("Recreated the vertex buffer as {vertices:?}");
        }

        let time = [frame as f32 / 60.0, 0.0, 0.0, 0.0];
        device.write_buffer(globals, 0, bytemuck::cast_slice(&time))?;

        device.bind_framebuffer(Some(framebuffer))?;
        device.clear(ClearValues {
            color: Some([0.1, 0.2, 0.3, 1.0]),
            depth: Some(1.0),
            stencil: None,
        })?;
        device.set_viewport(Viewport::new(TARGET_SIZE as f32, TARGET_SIZE as f32))?;
        device.bind_pipeline(pipeline)?;
        device.bind_uniform_buffer(resource_set::GLOBAL_CONSTANTS, globals, 0)?;
        device.bind_texture(0, albedo)?;
        device.bind_sampler(0, sampler)?;
        device.bind_vertex_buffer(0, vertices, 0)?;
        device.bind_index_buffer(indices, IndexFormat::Uint16, 0)?;
        device.draw_indexed(0..index_count, 0, 0..1)?;

        let token = device.end_frame()?;
        log::info!("Frame {frame} submitted as {token}: {}", device.stats());
    }

    device.wait_idle()?;
    log::info!("Idle: {}", device.stats());
    log::info!(
        "Backend holds {} native objects using {} bytes",
        backend.total_live(),
        backend.memory_used()
    );

    drop(device);
    log::info!("Device dropped, {} native objects left", backend.total_live());
    Ok(())
}
