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

//! Capability reports of the native backends the headless backend impersonates.
//!
//! Native codes are the real values of each API: `VkFormat`, `DXGI_FORMAT`,
//! `MTLPixelFormat` and GL sized internal formats.

use strata_core::api::{
    AdapterDeviceType, BackendCapabilities, DeviceFeatures, DeviceLimits, FormatFeatures,
    FormatSupport, GraphicsAdapterInfo, GraphicsBackendType, ShaderLanguage, TextureFormat,
};

const fn union(a: FormatFeatures, b: FormatFeatures) -> FormatFeatures {
    FormatFeatures::from_bits_truncate(a.bits() | b.bits())
}

const COLOR: FormatFeatures = FormatFeatures::COLOR_RENDERABLE;
const COLOR_STORAGE: FormatFeatures = union(COLOR, FormatFeatures::STORAGE);
const UNFILTERED: FormatFeatures = union(
    union(FormatFeatures::SAMPLED, FormatFeatures::COLOR_ATTACHMENT),
    FormatFeatures::STORAGE,
);
const DEPTH: FormatFeatures = FormatFeatures::DEPTH;
const COMPRESSED: FormatFeatures = FormatFeatures::SAMPLE_ONLY;

type FormatRow = (TextureFormat, u32, FormatFeatures);

const VULKAN_FORMATS: &[FormatRow] = &[
    (TextureFormat::R8Unorm, 9, COLOR),
    (TextureFormat::Rg8Unorm, 16, COLOR),
    (TextureFormat::Rgba8Unorm, 37, COLOR_STORAGE),
    (TextureFormat::Rgba8UnormSrgb, 43, COLOR),
    (TextureFormat::Bgra8Unorm, 44, COLOR),
    (TextureFormat::Bgra8UnormSrgb, 50, COLOR),
    (TextureFormat::Rgb10a2Unorm, 64, COLOR),
    (TextureFormat::R16Float, 76, COLOR_STORAGE),
    (TextureFormat::Rg16Float, 83, COLOR_STORAGE),
    (TextureFormat::Rgba16Float, 97, COLOR_STORAGE),
    (TextureFormat::R32Uint, 98, UNFILTERED),
    (TextureFormat::R32Float, 100, COLOR_STORAGE),
    (TextureFormat::Rg32Float, 103, COLOR_STORAGE),
    (TextureFormat::Rgba32Float, 109, COLOR_STORAGE),
    (TextureFormat::Depth16Unorm, 124, DEPTH),
    (TextureFormat::Depth24Plus, 125, DEPTH),
    (TextureFormat::Depth32Float, 126, DEPTH),
    (TextureFormat::Depth24PlusStencil8, 129, DEPTH),
    (TextureFormat::Depth32FloatStencil8, 130, DEPTH),
    (TextureFormat::Bc1RgbaUnorm, 133, COMPRESSED),
    (TextureFormat::Bc1RgbaUnormSrgb, 134, COMPRESSED),
    (TextureFormat::Bc2RgbaUnorm, 135, COMPRESSED),
    (TextureFormat::Bc3RgbaUnorm, 137, COMPRESSED),
    (TextureFormat::Bc3RgbaUnormSrgb, 138, COMPRESSED),
    (TextureFormat::Bc7RgbaUnorm, 145, COMPRESSED),
    // Listed by the driver, but the adapter does not advertise the features.
    (TextureFormat::Etc2Rgb8Unorm, 147, COMPRESSED),
    (TextureFormat::Etc2Rgba8Unorm, 151, COMPRESSED),
    (TextureFormat::Astc4x4Unorm, 157, COMPRESSED),
];

const DXGI_FORMATS: &[FormatRow] = &[
    (TextureFormat::R8Unorm, 61, COLOR),
    (TextureFormat::Rg8Unorm, 49, COLOR),
    (TextureFormat::Rgba8Unorm, 28, COLOR_STORAGE),
    (TextureFormat::Rgba8UnormSrgb, 29, COLOR),
    (TextureFormat::Bgra8Unorm, 87, COLOR),
    (TextureFormat::Bgra8UnormSrgb, 91, COLOR),
    (TextureFormat::Rgb10a2Unorm, 24, COLOR),
    (TextureFormat::R16Float, 54, COLOR_STORAGE),
    (TextureFormat::Rg16Float, 34, COLOR_STORAGE),
    (TextureFormat::Rgba16Float, 10, COLOR_STORAGE),
    (TextureFormat::R32Uint, 42, UNFILTERED),
    (TextureFormat::R32Float, 41, COLOR_STORAGE),
    (TextureFormat::Rg32Float, 16, COLOR_STORAGE),
    (TextureFormat::Rgba32Float, 2, COLOR_STORAGE),
    (TextureFormat::Depth16Unorm, 55, DEPTH),
    (TextureFormat::Depth24PlusStencil8, 45, DEPTH),
    (TextureFormat::Depth32Float, 40, DEPTH),
    (TextureFormat::Depth32FloatStencil8, 20, DEPTH),
    (TextureFormat::Bc1RgbaUnorm, 71, COMPRESSED),
    (TextureFormat::Bc1RgbaUnormSrgb, 72, COMPRESSED),
    (TextureFormat::Bc2RgbaUnorm, 74, COMPRESSED),
    (TextureFormat::Bc3RgbaUnorm, 77, COMPRESSED),
    (TextureFormat::Bc3RgbaUnormSrgb, 78, COMPRESSED),
    (TextureFormat::Bc7RgbaUnorm, 98, COMPRESSED),
];

const METAL_FORMATS: &[FormatRow] = &[
    (TextureFormat::R8Unorm, 10, COLOR),
    (TextureFormat::Rg8Unorm, 30, COLOR),
    (TextureFormat::Rgba8Unorm, 70, COLOR_STORAGE),
    (TextureFormat::Rgba8UnormSrgb, 71, COLOR),
    (TextureFormat::Bgra8Unorm, 80, COLOR),
    (TextureFormat::Bgra8UnormSrgb, 81, COLOR),
    (TextureFormat::Rgb10a2Unorm, 90, COLOR),
    (TextureFormat::R16Float, 25, COLOR_STORAGE),
    (TextureFormat::Rg16Float, 65, COLOR_STORAGE),
    (TextureFormat::Rgba16Float, 115, COLOR_STORAGE),
    (TextureFormat::R32Uint, 53, UNFILTERED),
    (TextureFormat::R32Float, 55, COLOR_STORAGE),
    (TextureFormat::Rg32Float, 105, COLOR_STORAGE),
    (TextureFormat::Rgba32Float, 125, COLOR_STORAGE),
    (TextureFormat::Depth16Unorm, 250, DEPTH),
    (TextureFormat::Depth32Float, 252, DEPTH),
    (TextureFormat::Depth24PlusStencil8, 255, DEPTH),
    (TextureFormat::Depth32FloatStencil8, 260, DEPTH),
    (TextureFormat::Bc1RgbaUnorm, 130, COMPRESSED),
    (TextureFormat::Bc1RgbaUnormSrgb, 131, COMPRESSED),
    (TextureFormat::Bc2RgbaUnorm, 132, COMPRESSED),
    (TextureFormat::Bc3RgbaUnorm, 134, COMPRESSED),
    (TextureFormat::Bc3RgbaUnormSrgb, 135, COMPRESSED),
    (TextureFormat::Bc7RgbaUnorm, 152, COMPRESSED),
    (TextureFormat::Etc2Rgb8Unorm, 180, COMPRESSED),
    (TextureFormat::Etc2Rgba8Unorm, 178, COMPRESSED),
    (TextureFormat::Astc4x4Unorm, 204, COMPRESSED),
];

const GLES_FORMATS: &[FormatRow] = &[
    (TextureFormat::R8Unorm, 0x8229, COLOR),
    (TextureFormat::Rg8Unorm, 0x822B, COLOR),
    (TextureFormat::Rgba8Unorm, 0x8058, COLOR),
    (TextureFormat::Rgba8UnormSrgb, 0x8C43, COLOR),
    (TextureFormat::Rgb10a2Unorm, 0x8059, COLOR),
    (TextureFormat::R16Float, 0x822D, COLOR),
    (TextureFormat::Rg16Float, 0x822F, COLOR),
    (TextureFormat::Rgba16Float, 0x881A, COLOR),
    (TextureFormat::R32Uint, 0x8236, UNFILTERED),
    (TextureFormat::R32Float, 0x822E, UNFILTERED),
    (TextureFormat::Rg32Float, 0x8230, UNFILTERED),
    (TextureFormat::Rgba32Float, 0x8814, UNFILTERED),
    (TextureFormat::Depth16Unorm, 0x81A5, DEPTH),
    (TextureFormat::Depth24Plus, 0x81A6, DEPTH),
    (TextureFormat::Depth24PlusStencil8, 0x88F0, DEPTH),
    (TextureFormat::Depth32Float, 0x8CAC, DEPTH),
    (TextureFormat::Depth32FloatStencil8, 0x8CAD, DEPTH),
    (TextureFormat::Etc2Rgb8Unorm, 0x9274, COMPRESSED),
    (TextureFormat::Etc2Rgba8Unorm, 0x9278, COMPRESSED),
    // GL_KHR_texture_compression_astc_ldr is not exposed by this profile.
    (TextureFormat::Astc4x4Unorm, 0x93B0, COMPRESSED),
];

/// The native backend a [`HeadlessBackend`](super::HeadlessBackend) impersonates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendProfile {
    /// A desktop Vulkan driver.
    Vulkan,
    /// A Direct3D 11 driver.
    Direct3D11,
    /// A Metal driver on Apple silicon.
    Metal,
    /// An OpenGL ES 3.0 driver: no BC compression, no anisotropy, small limits.
    Gles,
}

impl BackendProfile {
    /// Every profile.
    pub const ALL: [BackendProfile; 4] = [
        BackendProfile::Vulkan,
        BackendProfile::Direct3D11,
        BackendProfile::Metal,
        BackendProfile::Gles,
    ];

    /// The native API family.
    pub const fn backend_type(self) -> GraphicsBackendType {
        match self {
            BackendProfile::Vulkan => GraphicsBackendType::Vulkan,
            BackendProfile::Direct3D11 => GraphicsBackendType::Dx11,
            BackendProfile::Metal => GraphicsBackendType::Metal,
            BackendProfile::Gles => GraphicsBackendType::OpenGl,
        }
    }

    /// Shader languages the impersonated driver accepts.
    pub fn accepts_language(self, language: ShaderLanguage) -> bool {
        let native = match self {
            BackendProfile::Vulkan => ShaderLanguage::SpirV,
            BackendProfile::Direct3D11 => ShaderLanguage::Hlsl,
            BackendProfile::Metal => ShaderLanguage::Msl,
            BackendProfile::Gles => ShaderLanguage::Glsl,
        };
        // WGSL is translated by every profile.
        language == native || language == ShaderLanguage::Wgsl
    }

    fn format_rows(self) -> &'static [FormatRow] {
        match self {
            BackendProfile::Vulkan => VULKAN_FORMATS,
            BackendProfile::Direct3D11 => DXGI_FORMATS,
            BackendProfile::Metal => METAL_FORMATS,
            BackendProfile::Gles => GLES_FORMATS,
        }
    }

    /// The capability report of this profile.
    pub fn capabilities(self) -> BackendCapabilities {
        let formats = self
            .format_rows()
            .iter()
            .map(|&(format, native, features)| FormatSupport::new(format, native, features))
            .collect();

        let desktop_features = DeviceFeatures::TEXTURE_COMPRESSION_BC
            | DeviceFeatures::SAMPLER_ANISOTROPY
            | DeviceFeatures::POLYGON_MODE_LINE
            | DeviceFeatures::ADDRESS_MODE_CLAMP_TO_BORDER
            | DeviceFeatures::INDEPENDENT_BLEND;

        let (name, device_type, driver, features, limits) = match self {
            BackendProfile::Vulkan => (
                "Headless Vulkan Device",
                AdapterDeviceType::DiscreteGpu,
                "Vulkan 1.3 (simulated)",
                desktop_features,
                DeviceLimits {
                    max_texture_dimension_2d: 16384,
                    max_texture_dimension_3d: 2048,
                    max_texture_array_layers: 2048,
                    max_color_attachments: 8,
                    max_vertex_buffers: 16,
                    max_vertex_attributes: 32,
                    max_uniform_buffers: 15,
                    max_texture_slots: 32,
                    max_sampler_slots: 16,
                    max_buffer_size: 1 << 31,
                    max_sampler_anisotropy: 16,
                    max_sample_count: 8,
                },
            ),
            BackendProfile::Direct3D11 => (
                "Headless Direct3D 11 Device",
                AdapterDeviceType::DiscreteGpu,
                "Feature level 11_0 (simulated)",
                desktop_features,
                DeviceLimits {
                    max_texture_dimension_2d: 16384,
                    max_texture_dimension_3d: 2048,
                    max_texture_array_layers: 2048,
                    max_color_attachments: 8,
                    max_vertex_buffers: 32,
                    max_vertex_attributes: 32,
                    max_uniform_buffers: 14,
                    max_texture_slots: 128,
                    max_sampler_slots: 16,
                    max_buffer_size: 128 << 20,
                    max_sampler_anisotropy: 16,
                    max_sample_count: 8,
                },
            ),
            BackendProfile::Metal => (
                "Headless Metal Device",
                AdapterDeviceType::IntegratedGpu,
                "Metal 3 (simulated)",
                desktop_features
                    | DeviceFeatures::TEXTURE_COMPRESSION_ETC2
                    | DeviceFeatures::TEXTURE_COMPRESSION_ASTC,
                DeviceLimits {
                    max_texture_dimension_2d: 16384,
                    max_texture_dimension_3d: 2048,
                    max_texture_array_layers: 2048,
                    max_color_attachments: 8,
                    max_vertex_buffers: 31,
                    max_vertex_attributes: 31,
                    max_uniform_buffers: 31,
                    max_texture_slots: 31,
                    max_sampler_slots: 16,
                    max_buffer_size: 1 << 30,
                    max_sampler_anisotropy: 16,
                    max_sample_count: 4,
                },
            ),
            BackendProfile::Gles => (
                "Headless OpenGL ES Device",
                AdapterDeviceType::IntegratedGpu,
                "OpenGL ES 3.0 (simulated)",
                DeviceFeatures::TEXTURE_COMPRESSION_ETC2,
                DeviceLimits {
                    max_texture_dimension_2d: 4096,
                    max_texture_dimension_3d: 256,
                    max_texture_array_layers: 256,
                    max_color_attachments: 4,
                    max_vertex_buffers: 16,
                    max_vertex_attributes: 16,
                    max_uniform_buffers: 12,
                    max_texture_slots: 16,
                    max_sampler_slots: 16,
                    max_buffer_size: 128 << 20,
                    max_sampler_anisotropy: 1,
                    max_sample_count: 4,
                },
            ),
        };

        BackendCapabilities {
            adapter: GraphicsAdapterInfo {
                name: name.to_string(),
                backend_type: self.backend_type(),
                device_type,
                driver: driver.to_string(),
            },
            formats,
            limits,
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn native_codes_are_unique_per_profile() {
        for profile in BackendProfile::ALL {
            let caps = profile.capabilities();
            let formats: HashSet<_> = caps.formats.iter().map(|f| f.format).collect();
            let natives: HashSet<_> = caps.formats.iter().map(|f| f.native).collect();
            assert_eq!(formats.len(), caps.formats.len(), "{profile:?} repeats a format");
            assert_eq!(natives.len(), caps.formats.len(), "{profile:?} repeats a native code");
        }
    }

    #[test]
    fn gles_has_no_bc_compression() {
        let caps = BackendProfile::Gles.capabilities();
        assert!(!caps.features.contains(DeviceFeatures::TEXTURE_COMPRESSION_BC));
        assert!(caps.formats.iter().all(|f| f.format != TextureFormat::Bc1RgbaUnorm));
        assert_eq!(caps.limits.max_sampler_anisotropy, 1);
    }

    #[test]
    fn wgsl_is_accepted_everywhere() {
        for profile in BackendProfile::ALL {
            assert!(profile.accepts_language(ShaderLanguage::Wgsl));
        }
        assert!(!BackendProfile::Gles.accepts_language(ShaderLanguage::Hlsl));
        assert!(BackendProfile::Vulkan.accepts_language(ShaderLanguage::SpirV));
    }
}
