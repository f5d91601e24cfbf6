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
use strata_core::handle::{kind, Handle, ResourceKindId, TextureHandle};
use strata_device::DeviceError;

#[test]
fn test_stale_handle_is_rejected_after_slot_reuse() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("vertices", 64, BufferUsage::VERTEX))
        .unwrap();
    assert_eq!((buffer.index(), buffer.generation()), (0, 0));
    device.destroy_buffer(buffer).unwrap();

    // --- 2. ACT ---
    // The freed slot is reused by a resource of another kind.
    let texture = device
        .create_texture(&common::render_target("target", 16, 16, TextureFormat::Rgba8Unorm))
        .unwrap();
    let result = device.bind_vertex_buffer(0, buffer, 0);

    // --- 3. ASSERT ---
    assert_eq!((texture.index(), texture.generation()), (0, 1));
    let Err(DeviceError::InvalidHandle(error)) = result else {
        panic!("binding a destroyed buffer must fail, got {result:?}");
    };
    assert_eq!(error.kind, ResourceKindId::Buffer);
    assert_eq!((error.index, error.generation), (0, 0));
    assert!(
        error.location.file().ends_with("handle_lifecycle_test.rs"),
        "the error should point at the caller, not at {}",
        error.location
    );
    assert!(device.is_valid(texture));
    assert!(!device.is_valid(buffer));
}

#[test]
fn test_double_destroy_reports_invalid_handle() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("uniforms", 256, BufferUsage::UNIFORM))
        .unwrap();

    // --- 2. ACT ---
    let first = device.destroy_buffer(buffer);
    let second = device.destroy_buffer(buffer);

    // --- 3. ASSERT ---
    assert!(first.is_ok());
    assert!(matches!(second, Err(DeviceError::InvalidHandle(_))));
    // The second destroy must not have queued another release.
    assert_eq!(device.stats().pending_destructions, 1);
}

#[test]
fn test_handle_of_another_kind_is_never_valid() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let buffer = device
        .create_buffer(&BufferDescriptor::new("indices", 32, BufferUsage::INDEX))
        .unwrap();

    // --- 2. ACT ---
    // Same index and generation, typed as a texture.
    let forged: TextureHandle = Handle::<kind::Texture>::from_parts(buffer.index(), buffer.generation());
    let info = device.texture_info(forged);

    // --- 3. ASSERT ---
    assert!(device.is_valid(buffer));
    assert!(!device.is_valid(forged));
    let Err(DeviceError::InvalidHandle(error)) = info else {
        panic!("a forged handle must be rejected");
    };
    assert_eq!(error.kind, ResourceKindId::Texture);
}

#[test]
fn test_lowest_free_slot_is_reused_first() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let descriptor = BufferDescriptor::new("scratch", 16, BufferUsage::COPY_DST);
    let handles: Vec<_> = (0..4)
        .map(|_| device.create_buffer(&descriptor).unwrap())
        .collect();

    // --- 2. ACT ---
    device.destroy_buffer(handles[3]).unwrap();
    device.destroy_buffer(handles[1]).unwrap();
    let reused = device.create_buffer(&descriptor).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(reused.index(), 1);
    assert_eq!(reused.generation(), 1);
    assert_eq!(device.stats().live.buffers, 3);
}

#[test]
fn test_info_reflects_the_creation_description() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();

    // --- 2. ACT ---
    let buffer = device
        .create_buffer(&BufferDescriptor::new("instances", 4096, BufferUsage::VERTEX | BufferUsage::COPY_DST))
        .unwrap();
    let info = device.buffer_info(buffer).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(info.size, 4096);
    assert!(info.usage.contains(BufferUsage::VERTEX));
    assert_eq!(info.label.as_deref(), Some("instances"));
}
