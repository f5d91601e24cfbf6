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

//! The backend's capability report, frozen at device construction.

use ahash::AHashMap;
use strata_core::api::{
    BackendCapabilities, DeviceFeatures, DeviceLimits, FormatFeatures, FormatSupport,
    GraphicsAdapterInfo, TextureFormat,
};
use strata_core::error::{UnsupportedFormatError, ValidationError};
use strata_core::native::NativeFormat;

/// Formats, limits and features of the active backend.
///
/// Built once from the live backend's report and immutable afterwards. The
/// format mapping is a bijection between the supported abstract formats and
/// their native codes, so `from_native(to_native(f)) == f` for every
/// supported `f`.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    adapter: GraphicsAdapterInfo,
    limits: DeviceLimits,
    features: DeviceFeatures,
    to_native: AHashMap<TextureFormat, FormatSupport>,
    from_native: AHashMap<NativeFormat, TextureFormat>,
}

impl CapabilityTable {
    /// Builds the table from a backend's report.
    ///
    /// Compressed formats whose compression family is not advertised in the
    /// report's features are dropped with a warning.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidCapabilities`] if a format or a native code
    /// is listed twice, a format has no features, or a limit is zero.
    pub fn from_report(report: BackendCapabilities) -> Result<Self, ValidationError> {
        let BackendCapabilities {
            adapter,
            formats,
            limits,
            features,
        } = report;

        check_limits(&limits)?;

        let mut to_native = AHashMap::with_capacity(formats.len());
        let mut from_native = AHashMap::with_capacity(formats.len());
        for support in formats {
            if let Some(family) = support.format.compression() {
                if !features.contains(DeviceFeatures::for_compression(family)) {
                    log::warn!(
                        "Dropping {:?}: the backend lists it but lacks {:?} compression",
                        support.format,
                        family
                    );
                    continue;
                }
            }
            if support.features.is_empty() {
                return Err(invalid(format!("{:?} is listed with no features", support.format)));
            }
            if let Some(previous) = from_native.insert(support.native, support.format) {
                return Err(invalid(format!(
                    "native code {:#x} is used by both {:?} and {:?}",
                    support.native, previous, support.format
                )));
            }
            if to_native.insert(support.format, support).is_some() {
                return Err(invalid(format!("{:?} is listed twice", support.format)));
            }
        }

        Ok(Self {
            adapter,
            limits,
            features,
            to_native,
            from_native,
        })
    }

    /// Returns `true` if `format` can be used on this device.
    pub fn is_format_supported(&self, format: TextureFormat) -> bool {
        self.to_native.contains_key(&format)
    }

    /// The native code of a supported format.
    pub fn to_native(&self, format: TextureFormat) -> Result<NativeFormat, UnsupportedFormatError> {
        self.to_native
            .get(&format)
            .map(|support| support.native)
            .ok_or(UnsupportedFormatError::Abstract(format))
    }

    /// The abstract format of a native code.
    pub fn from_native(&self, native: NativeFormat) -> Result<TextureFormat, UnsupportedFormatError> {
        self.from_native
            .get(&native)
            .copied()
            .ok_or(UnsupportedFormatError::Native(native))
    }

    /// What the device can do with `format`. Empty if unsupported.
    pub fn format_features(&self, format: TextureFormat) -> FormatFeatures {
        self.to_native
            .get(&format)
            .map_or(FormatFeatures::EMPTY, |support| support.features)
    }

    /// Every supported format, in declaration order.
    pub fn supported_formats(&self) -> Vec<TextureFormat> {
        let mut formats: Vec<_> = self.to_native.keys().copied().collect();
        formats.sort();
        formats
    }

    /// The number of supported formats.
    pub fn format_count(&self) -> usize {
        self.to_native.len()
    }

    /// Numeric limits.
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Optional features.
    pub fn features(&self) -> DeviceFeatures {
        self.features
    }

    /// Returns `true` if every feature in `features` is available.
    pub fn has_feature(&self, features: DeviceFeatures) -> bool {
        self.features.contains(features)
    }

    /// The adapter the backend runs on.
    pub fn adapter(&self) -> &GraphicsAdapterInfo {
        &self.adapter
    }
}

fn invalid(reason: String) -> ValidationError {
    ValidationError::InvalidCapabilities { reason }
}

fn check_limits(limits: &DeviceLimits) -> Result<(), ValidationError> {
    let named = [
        ("max_texture_dimension_2d", limits.max_texture_dimension_2d),
        ("max_texture_dimension_3d", limits.max_texture_dimension_3d),
        ("max_texture_array_layers", limits.max_texture_array_layers),
        ("max_color_attachments", limits.max_color_attachments),
        ("max_vertex_buffers", limits.max_vertex_buffers),
        ("max_vertex_attributes", limits.max_vertex_attributes),
        ("max_sample_count", limits.max_sample_count),
    ];
    for (name, value) in named {
        if value == 0 {
            return Err(invalid(format!("{name} is zero")));
        }
    }
    if limits.max_buffer_size == 0 || limits.max_sampler_anisotropy == 0 {
        return Err(invalid("buffer size or anisotropy limit is zero".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::api::CompressionFamily;

    fn report(formats: Vec<FormatSupport>, features: DeviceFeatures) -> BackendCapabilities {
        BackendCapabilities {
            formats,
            features,
            ..BackendCapabilities::default()
        }
    }

    #[test]
    fn round_trips_every_supported_format() {
        let table = CapabilityTable::from_report(report(
            vec![
                FormatSupport::new(TextureFormat::Rgba8Unorm, 37, FormatFeatures::COLOR_RENDERABLE),
                FormatSupport::new(TextureFormat::Depth32Float, 126, FormatFeatures::DEPTH),
            ],
            DeviceFeatures::EMPTY,
        ))
        .unwrap();

        for format in table.supported_formats() {
            let native = table.to_native(format).unwrap();
            assert_eq!(table.from_native(native), Ok(format));
        }
        assert_eq!(table.format_count(), 2);
    }

    #[test]
    fn unknown_codes_are_unsupported() {
        let table = CapabilityTable::from_report(report(Vec::new(), DeviceFeatures::EMPTY)).unwrap();

        assert_eq!(
            table.to_native(TextureFormat::Rgba8Unorm),
            Err(UnsupportedFormatError::Abstract(TextureFormat::Rgba8Unorm))
        );
        assert_eq!(
            table.from_native(NativeFormat(7)),
            Err(UnsupportedFormatError::Native(NativeFormat(7)))
        );
        assert!(table.format_features(TextureFormat::Rgba8Unorm).is_empty());
    }

    #[test]
    fn compressed_formats_need_their_feature() {
        let bc = FormatSupport::new(TextureFormat::Bc1RgbaUnorm, 131, FormatFeatures::SAMPLE_ONLY);

        let without = CapabilityTable::from_report(report(vec![bc], DeviceFeatures::EMPTY)).unwrap();
        let with = CapabilityTable::from_report(report(
            vec![bc],
            DeviceFeatures::for_compression(CompressionFamily::Bc),
        ))
        .unwrap();

        assert!(!without.is_format_supported(TextureFormat::Bc1RgbaUnorm));
        assert!(with.is_format_supported(TextureFormat::Bc1RgbaUnorm));
    }

    #[test]
    fn duplicate_native_codes_are_rejected() {
        let result = CapabilityTable::from_report(report(
            vec![
                FormatSupport::new(TextureFormat::Rgba8Unorm, 37, FormatFeatures::COLOR_RENDERABLE),
                FormatSupport::new(TextureFormat::Bgra8Unorm, 37, FormatFeatures::COLOR_RENDERABLE),
            ],
            DeviceFeatures::EMPTY,
        ));

        assert!(matches!(result, Err(ValidationError::InvalidCapabilities { .. })));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut caps = report(Vec::new(), DeviceFeatures::EMPTY);
        caps.limits.max_color_attachments = 0;

        let result = CapabilityTable::from_report(caps);

        match result {
            Err(ValidationError::InvalidCapabilities { reason }) => {
                assert!(reason.contains("max_color_attachments"), "{reason}");
            }
            other => panic!("expected invalid capabilities, got {other:?}"),
        }
    }
}
