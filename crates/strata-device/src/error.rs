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

//! Errors reported by [`Device`](crate::Device) calls.

use crate::frame::FrameState;
use strata_core::error::{BackendError, InvalidHandleError, UnsupportedFormatError, ValidationError};
use strata_core::ResourceKindId;
use thiserror::Error;

/// Every failure a device call can report.
///
/// The first four variants are caller mistakes reported synchronously at the
/// offending call. [`ResourceCreation`](Self::ResourceCreation) and
/// [`UploadFailed`](Self::UploadFailed) may be retried with a smaller request.
/// [`DeviceLost`](Self::DeviceLost) is final: the device must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// A stale or foreign-kind handle was used.
    #[error(transparent)]
    InvalidHandle(#[from] InvalidHandleError),
    /// A creation description or a recorded command is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The format is not in the capability table.
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
    /// The operation is not allowed in the current frame state.
    #[error("`{operation}` is not allowed while the device is {state}")]
    InvalidFrameState {
        /// The rejected operation.
        operation: &'static str,
        /// The state the device was in.
        state: FrameState,
    },
    /// The backend refused to create a native object.
    #[error("Failed to create {kind}")]
    ResourceCreation {
        /// The kind being created.
        kind: ResourceKindId,
        /// The backend failure.
        #[source]
        source: BackendError,
    },
    /// The backend refused an upload into an existing resource.
    #[error("Failed to upload into {kind}")]
    UploadFailed {
        /// The kind written to.
        kind: ResourceKindId,
        /// The backend failure.
        #[source]
        source: BackendError,
    },
    /// The backend refused the recorded frame. The frame never reached the GPU.
    #[error("Frame submission failed")]
    SubmissionFailed(#[source] BackendError),
    /// The device is gone. Every handle and cached state object is invalid.
    #[error("The graphics device was lost")]
    DeviceLost,
}

impl DeviceError {
    /// Returns `true` if the device cannot be used anymore.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::DeviceLost)
    }

    /// Returns `true` for mistakes at the call site rather than runtime
    /// conditions.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            DeviceError::InvalidHandle(_)
                | DeviceError::Validation(_)
                | DeviceError::UnsupportedFormat(_)
                | DeviceError::InvalidFrameState { .. }
        )
    }
}

/// Shorthand for device results.
pub type DeviceResult<T> = Result<T, DeviceError>;
