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

//! # Strata Core
//!
//! Foundational crate containing the backend-agnostic contracts of the GPU
//! resource layer: typed handles, resource descriptors, immutable state keys,
//! the abstract texture format set, opaque native object ids and the
//! [`GpuBackend`] trait a native graphics API implements.
//!
//! This crate defines the 'what'. Storage lives in `strata-data`, concrete
//! backends in `strata-infra`, and the device façade that routes every call
//! through them in `strata-device`.

#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod handle;
pub mod native;
pub mod traits;
pub mod utils;

pub use self::api::*;
pub use self::error::{BackendError, InvalidHandleError, UnsupportedFormatError, ValidationError};
pub use self::handle::{
    kind, BufferHandle, FramebufferHandle, Handle, PipelineHandle, RawHandle, ResourceKind,
    ResourceKindId, SamplerHandle, ShaderProgramHandle, TextureHandle,
};
pub use self::native::*;
pub use self::traits::GpuBackend;
