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

use strata_core::api::{BufferDescriptor, BufferUsage, TextureFormat};
use strata_core::error::BackendError;
use strata_device::{DeviceError, FrameState};
use strata_infra::FenceMode;

#[test]
fn test_loss_at_submission_invalidates_everything() {
    // --- 1. ARRANGE ---
    let backend = common::backend(FenceMode::Manual);
    let mut device = common::device(&backend);
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("vertices", 256, BufferUsage::VERTEX))
        .unwrap();
    let texture = device
        .create_texture(&common::render_target("color", 32, 32, TextureFormat::Rgba8Unorm))
        .unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(program))
        .unwrap();
    device.bind_vertex_buffer(0, buffer, 0).unwrap();
    device.end_frame().unwrap();

    device.begin_frame().unwrap();
    device.destroy_buffer(buffer).unwrap();
    backend.lose_device();

    // --- 2. ACT ---
    let result = device.end_frame();

    // --- 3. ASSERT ---
    assert_eq!(result, Err(DeviceError::DeviceLost));
    assert!(device.is_lost());
    assert_eq!(device.frame_state(), FrameState::Idle);
    assert!(!device.is_valid(texture));
    assert!(!device.is_valid(program));
    assert!(!device.is_valid(pipeline));
    assert_eq!(backend.total_live(), 0, "a lost device releases every native object");
    assert_eq!(device.stats().live.total(), 0);
    assert_eq!(device.stats().caches.pipelines.entries, 0);
}

#[test]
fn test_every_call_after_loss_reports_loss() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("uniforms", 64, BufferUsage::UNIFORM))
        .unwrap();
    device.end_frame().unwrap();
    backend.lose_device();

    // --- 2. ACT ---
    let begin = device.begin_frame();
    let again = device.begin_frame();
    let info = device.buffer_info(buffer).map(|_| ());
    let wait = device.wait_idle();

    // --- 3. ASSERT ---
    assert_eq!(begin, Err(DeviceError::DeviceLost));
    assert_eq!(again, Err(DeviceError::DeviceLost));
    assert_eq!(info, Err(DeviceError::DeviceLost));
    assert_eq!(wait, Err(DeviceError::DeviceLost));
    assert!(DeviceError::DeviceLost.is_fatal());
}

#[test]
fn test_loss_reported_by_a_creation_is_final() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    backend.fail_next_creation(BackendError::DeviceLost);

    // --- 2. ACT ---
    let created = device.create_buffer(&BufferDescriptor::new("vertices", 64, BufferUsage::VERTEX));
    let next = device.create_buffer(&BufferDescriptor::new("vertices", 64, BufferUsage::VERTEX));

    // --- 3. ASSERT ---
    assert_eq!(created, Err(DeviceError::DeviceLost));
    assert_eq!(next, Err(DeviceError::DeviceLost));
    assert!(device.is_lost());
}

#[test]
fn test_lost_device_drops_cleanly() {
    // --- 1. ARRANGE ---
    let backend = common::backend(FenceMode::Manual);
    let mut device = common::device(&backend);
    device.begin_frame().unwrap();
    device
        .create_buffer(&BufferDescriptor::new("orphan", 64, BufferUsage::VERTEX))
        .unwrap();
    backend.lose_device();

    // --- 2. ACT ---
    // Loss is discovered while the frame is still open.
    let _ = device.end_frame();
    drop(device);

    // --- 3. ASSERT ---
    assert_eq!(backend.total_live(), 0);
}
