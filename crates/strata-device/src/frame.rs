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

//! The frame state machine.

use std::fmt;

/// Where a device is in its frame lifecycle.
///
/// `Idle → Recording → Submitted → Idle`. Submission does not wait for the
/// GPU, so `Submitted` only lasts for the duration of
/// [`Device::end_frame`](crate::Device::end_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameState {
    /// Between frames.
    #[default]
    Idle,
    /// Between `begin_frame` and `end_frame`.
    Recording,
    /// The recorded work is being handed to the backend.
    Submitted,
}

impl FrameState {
    /// Returns `true` if `begin_frame` may be called.
    pub const fn can_begin(self) -> bool {
        matches!(self, FrameState::Idle)
    }

    /// Returns `true` if recording-only operations may be called.
    pub const fn is_recording(self) -> bool {
        matches!(self, FrameState::Recording)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameState::Idle => "idle",
            FrameState::Recording => "recording",
            FrameState::Submitted => "submitted",
        })
    }
}
