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

use strata_core::api::{BufferDescriptor, BufferUsage};
use strata_core::error::BackendError;
use strata_core::native::CompletionToken;
use strata_device::{DeviceError, FrameState};
use strata_infra::FenceMode;

#[test]
fn test_begin_frame_twice_is_rejected() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();

    // --- 2. ACT ---
    let result = device.begin_frame();

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(DeviceError::InvalidFrameState {
            operation: "begin_frame",
            state: FrameState::Recording,
        })
    );
    // The open frame is unaffected.
    assert_eq!(device.frame_state(), FrameState::Recording);
    assert_eq!(device.frame_index(), 1);
}

#[test]
fn test_recording_operations_need_an_open_frame() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();

    // --- 2. ACT ---
    let create = device.create_buffer(&BufferDescriptor::new("early", 16, BufferUsage::VERTEX));
    let end = device.end_frame();

    // --- 3. ASSERT ---
    assert!(matches!(
        create,
        Err(DeviceError::InvalidFrameState {
            operation: "create_buffer",
            state: FrameState::Idle,
        })
    ));
    assert!(matches!(
        end,
        Err(DeviceError::InvalidFrameState {
            operation: "end_frame",
            ..
        })
    ));
    assert_eq!(device.stats().live.total(), 0);
}

#[test]
fn test_wait_idle_is_rejected_while_recording() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();

    // --- 2. ACT ---
    let during = device.wait_idle();
    device.end_frame().unwrap();
    let after = device.wait_idle();

    // --- 3. ASSERT ---
    assert!(matches!(during, Err(DeviceError::InvalidFrameState { .. })));
    assert!(after.is_ok());
}

#[test]
fn test_completion_tokens_increase_with_every_frame() {
    // --- 1. ARRANGE ---
    let backend = common::backend(FenceMode::Manual);
    let mut device = common::device(&backend);
    let mut tokens = Vec::new();

    // --- 2. ACT ---
    for _ in 0..5 {
        device.begin_frame().unwrap();
        tokens.push(device.end_frame().unwrap());
    }

    // --- 3. ASSERT ---
    assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(device.last_submitted(), tokens[4]);
    assert_eq!(backend.submitted_token(), tokens[4]);
    assert_eq!(backend.last_completed(), CompletionToken::NONE);
    assert_eq!(device.frame_index(), 5);
    assert_eq!(device.frame_state(), FrameState::Idle);
}

#[test]
fn test_refused_submission_returns_the_device_to_idle() {
    // --- 1. ARRANGE ---
    let (backend, mut device) = common::immediate_device();
    device.begin_frame().unwrap();
    let first = device.end_frame().unwrap();
    device.begin_frame().unwrap();
    backend.fail_next_submission(BackendError::Rejected("queue full".into()));

    // --- 2. ACT ---
    let refused = device.end_frame();

    // --- 3. ASSERT ---
    assert_eq!(
        refused,
        Err(DeviceError::SubmissionFailed(BackendError::Rejected("queue full".into())))
    );
    assert_eq!(device.frame_state(), FrameState::Idle);
    assert!(!device.is_lost());
    assert_eq!(device.last_submitted(), first);

    device.begin_frame().unwrap();
    let next = device.end_frame().unwrap();
    assert_eq!(next, first.next());
}

#[test]
fn test_queries_work_in_every_state() {
    // --- 1. ARRANGE ---
    let (_backend, mut device) = common::immediate_device();

    // --- 2. ACT & 3. ASSERT ---
    assert_eq!(device.frame_state(), FrameState::Idle);
    assert_eq!(device.label(), "test-device");
    assert!(device.validation_enabled());

    device.begin_frame().unwrap();
    let stats = device.stats();
    assert_eq!(stats.frame_index, 1);
    assert!(device.capabilities().format_count() > 0);

    device.end_frame().unwrap();
    assert_eq!(device.stats().last_frame_commands, 0);
}
