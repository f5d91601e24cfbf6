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

use strata_core::api::{DepthBias, RasterizerStateKey};
use strata_core::error::BackendError;
use strata_core::ResourceKindId;
use strata_device::DeviceError;
use strata_infra::NativeKind;

#[test]
fn test_pipeline_requests_build_each_structure_once() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let descriptors: Vec<_> = (0..100)
        .map(|bias| {
            let mut descriptor = common::pipeline_descriptor(program);
            descriptor.rasterizer = RasterizerStateKey {
                depth_bias: DepthBias::new(bias, 0.0, 0.0),
                ..RasterizerStateKey::CULL_BACK
            };
            descriptor
        })
        .collect();

    // --- 2. ACT ---
    for request in 0..10_000 {
        let pipeline = device
            .create_pipeline(&descriptors[request % descriptors.len()])
            .unwrap();
        device.destroy_pipeline(pipeline).unwrap();
    }

    // --- 3. ASSERT ---
    assert_eq!(backend.created_count(NativeKind::Pipeline), 100);
    assert_eq!(backend.created_count(NativeKind::RasterizerState), 100);
    assert_eq!(backend.created_count(NativeKind::BlendState), 1);
    assert_eq!(backend.created_count(NativeKind::DepthStencilState), 1);

    let caches = device.stats().caches;
    assert_eq!(caches.pipelines.misses, 100);
    assert_eq!(caches.pipelines.hits, 9_900);
    assert_eq!(caches.pipelines.entries, 100);
}

#[test]
fn test_identical_shader_stages_compile_once() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();

    // --- 2. ACT ---
    let first = device.create_shader_program(&common::program_descriptor()).unwrap();
    let second = device.create_shader_program(&common::program_descriptor()).unwrap();

    // --- 3. ASSERT ---
    assert_ne!(first, second);
    assert_eq!(backend.created_count(NativeKind::Program), 2);
    assert_eq!(backend.created_count(NativeKind::ShaderModule), 2);
    let program = device.shader_program_info(second).unwrap();
    assert_eq!(program.stage_count(), 2);
    assert_eq!(program.vertex_entry, "vs_main");
    assert_eq!(
        program.vertex_module,
        device.shader_program_info(first).unwrap().vertex_module
    );
}

#[test]
fn test_pipeline_of_a_destroyed_program_cannot_be_bound() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(program))
        .unwrap();
    device.destroy_shader_program(program).unwrap();

    // --- 2. ACT ---
    let bind = device.bind_pipeline(pipeline);
    let rebuild = device.create_pipeline(&common::pipeline_descriptor(program));

    // --- 3. ASSERT ---
    let Err(DeviceError::InvalidHandle(error)) = bind else {
        panic!("binding must fail once the program is gone, got {bind:?}");
    };
    assert_eq!(error.kind, ResourceKindId::ShaderProgram);
    assert!(matches!(rebuild, Err(DeviceError::InvalidHandle(_))));
    // The pipeline handle itself is still alive.
    assert!(device.is_valid(pipeline));
    assert_eq!(backend.created_count(NativeKind::Pipeline), 1);
}

#[test]
fn test_recreated_program_gets_its_own_pipeline() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let old_program = device.create_shader_program(&common::program_descriptor()).unwrap();
    device
        .create_pipeline(&common::pipeline_descriptor(old_program))
        .unwrap();
    device.destroy_shader_program(old_program).unwrap();

    // --- 2. ACT ---
    // Reuses the freed slot with a newer generation.
    let new_program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let pipeline = device
        .create_pipeline(&common::pipeline_descriptor(new_program))
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(new_program.index(), old_program.index());
    assert_eq!(backend.created_count(NativeKind::Pipeline), 2);
    assert!(device.bind_pipeline(pipeline).is_ok());
    // The old program's pipeline is never evicted.
    assert_eq!(device.stats().caches.pipelines.entries, 2);
}

#[test]
fn test_failed_pipeline_build_is_not_cached() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let program = device.create_shader_program(&common::program_descriptor()).unwrap();
    let descriptor = common::pipeline_descriptor(program);
    // The first backend object the pipeline needs is its blend state.
    backend.fail_next_creation(BackendError::Rejected("out of state slots".into()));

    // --- 2. ACT ---
    let failed = device.create_pipeline(&descriptor);
    let retried = device.create_pipeline(&descriptor);

    // --- 3. ASSERT ---
    assert!(matches!(
        failed,
        Err(DeviceError::ResourceCreation {
            kind: ResourceKindId::Pipeline,
            ..
        })
    ));
    assert!(retried.is_ok());
    assert_eq!(backend.created_count(NativeKind::Pipeline), 1);
    assert_eq!(device.stats().caches.pipelines.entries, 1);
}
