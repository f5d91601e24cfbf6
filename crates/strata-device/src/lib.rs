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

//! # Strata Device
//!
//! The only surface rendering code talks to. A [`Device`] owns one instance of
//! every storage primitive from `strata-data`, routes each call through them,
//! and drives the frame lifecycle that decides when deferred native objects
//! may finally be released.
//!
//! - [`Device`]: creation, destruction, binding and the frame lifecycle.
//! - [`CapabilityTable`]: the backend's format and feature report, fixed at
//!   construction.
//! - [`DeviceSettings`]: construction-time configuration.
//! - [`DeviceError`]: every failure a device call can report.

#![warn(missing_docs)]

pub mod capabilities;
pub mod device;
pub mod error;
pub mod frame;
pub mod settings;
pub mod stats;
pub mod validation;

pub use self::capabilities::CapabilityTable;
pub use self::device::{
    BufferResource, Device, FramebufferResource, PipelineResource, SamplerResource,
    ShaderProgramResource, TextureResource,
};
pub use self::error::{DeviceError, DeviceResult};
pub use self::frame::FrameState;
pub use self::settings::{DeviceSettings, SettingsError, ValidationMode};
pub use self::stats::{CacheReport, DeviceStats, LiveCounts};
