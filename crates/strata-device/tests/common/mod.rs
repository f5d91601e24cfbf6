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

//! Shared setup for the device integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use strata_core::api::*;
use strata_core::handle::ShaderProgramHandle;
use strata_device::{Device, DeviceSettings, ValidationMode};
use strata_infra::{BackendProfile, FenceMode, HeadlessBackend};

pub const VERTEX_WGSL: &str = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(); }";
pub const FRAGMENT_WGSL: &str = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

/// A Vulkan-like headless backend with the given fence behavior.
pub fn backend(mode: FenceMode) -> Arc<HeadlessBackend> {
    Arc::new(HeadlessBackend::new(BackendProfile::Vulkan).with_fence_mode(mode))
}

/// A validating device over `backend`.
pub fn device(backend: &Arc<HeadlessBackend>) -> Device {
    device_with(backend, ValidationMode::Enabled)
}

/// A device over `backend` with an explicit validation mode.
pub fn device_with(backend: &Arc<HeadlessBackend>, validation: ValidationMode) -> Device {
    init_logging();
    let settings = DeviceSettings::default()
        .with_label("test-device")
        .with_validation(validation);
    Device::new(backend.clone(), settings).expect("headless capabilities are consistent")
}

/// A device over a fresh immediate-fence backend, and that backend.
pub fn immediate_device() -> (Arc<HeadlessBackend>, Device) {
    let backend = backend(FenceMode::Immediate);
    let device = device(&backend);
    (backend, device)
}

/// A WGSL program with a vertex and a fragment stage.
pub fn program_descriptor() -> ShaderProgramDescriptor<'static> {
    ShaderProgramDescriptor {
        label: Some("test program".into()),
        vertex: ShaderStageSource::text(ShaderStage::Vertex, ShaderLanguage::Wgsl, "vs_main", VERTEX_WGSL),
        fragment: Some(ShaderStageSource::text(
            ShaderStage::Fragment,
            ShaderLanguage::Wgsl,
            "fs_main",
            FRAGMENT_WGSL,
        )),
    }
}

/// An opaque pipeline rendering position and UV vertices to one RGBA8 target.
pub fn pipeline_descriptor(program: ShaderProgramHandle) -> PipelineDescriptor<'static> {
    PipelineDescriptor {
        label: Some("test pipeline".into()),
        program,
        vertex_layout: VertexLayout::packed(&[VertexFormat::Float32x3, VertexFormat::Float32x2]),
        topology: PrimitiveTopology::TriangleList,
        blend: BlendStateKey::OPAQUE,
        depth_stencil: DepthStencilStateKey::DISABLED,
        rasterizer: RasterizerStateKey::CULL_BACK,
        color_formats: vec![TextureFormat::Rgba8Unorm],
        depth_format: None,
    }
}

/// A 2D render target.
pub fn render_target(label: &str, width: u32, height: u32, format: TextureFormat) -> TextureDescriptor<'_> {
    TextureDescriptor::d2(
        label,
        width,
        height,
        format,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    )
}
