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

//! Adapter and backend identification.

use serde::{Deserialize, Serialize};

/// The family of native graphics API a backend drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Vulkan.
    Vulkan,
    /// Direct3D 11.
    Dx11,
    /// Direct3D 12.
    Dx12,
    /// Apple's Metal.
    Metal,
    /// OpenGL or OpenGL ES.
    OpenGl,
    /// A software backend with no native device behind it.
    Headless,
    /// Unknown.
    #[default]
    Unknown,
}

/// The physical type of a graphics adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdapterDeviceType {
    /// A GPU integrated into the CPU package.
    IntegratedGpu,
    /// A discrete GPU.
    DiscreteGpu,
    /// A virtualized GPU.
    VirtualGpu,
    /// A software rasterizer running on the CPU.
    Cpu,
    /// Unknown.
    #[default]
    Unknown,
}

/// Backend-agnostic information about the adapter a backend runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsAdapterInfo {
    /// The adapter name (e.g. "NVIDIA GeForce RTX 4090").
    pub name: String,
    /// The native API family.
    pub backend_type: GraphicsBackendType,
    /// The physical type of the adapter.
    pub device_type: AdapterDeviceType,
    /// Free-form driver description.
    pub driver: String,
}
