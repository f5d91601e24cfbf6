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

//! Construction-time configuration of a [`Device`](crate::Device).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`DeviceSettings::validation`].
pub const VALIDATION_ENV: &str = "STRATA_VALIDATION";
/// Environment variable overriding [`DeviceSettings::label`].
pub const LABEL_ENV: &str = "STRATA_DEVICE_LABEL";

/// Whether creation descriptions and recorded commands are validated.
///
/// Format lookups and capability report checks run regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Always validate.
    Enabled,
    /// Never validate.
    Disabled,
    /// Validate in builds with debug assertions.
    #[default]
    Auto,
}

impl ValidationMode {
    /// Resolves `Auto` against the current build.
    pub fn is_enabled(self) -> bool {
        match self {
            ValidationMode::Enabled => true,
            ValidationMode::Disabled => false,
            ValidationMode::Auto => cfg!(debug_assertions),
        }
    }

    /// Parses `1/0`, `on/off`, `true/false`, `enabled/disabled` or `auto`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "true" | "enabled" => Some(ValidationMode::Enabled),
            "0" | "off" | "false" | "disabled" => Some(ValidationMode::Disabled),
            "auto" => Some(ValidationMode::Auto),
            _ => None,
        }
    }
}

/// A failure while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The JSON document is malformed.
    #[error("Invalid device settings: {0}")]
    Json(#[from] serde_json::Error),
    /// An environment override has an unrecognized value.
    #[error("Invalid value '{value}' for {variable}")]
    InvalidValue {
        /// The variable.
        variable: &'static str,
        /// Its value.
        value: String,
    },
}

/// How a device is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Name used in logs.
    pub label: String,
    /// Validation of descriptions and commands.
    pub validation: ValidationMode,
    /// Handle slots reserved up front.
    pub initial_handle_capacity: usize,
    /// Commands reserved up front per frame.
    pub command_capacity: usize,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            label: "strata-device".to_string(),
            validation: ValidationMode::Auto,
            initial_handle_capacity: 256,
            command_capacity: 1024,
        }
    }
}

impl DeviceSettings {
    /// Loads settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies `STRATA_VALIDATION` and `STRATA_DEVICE_LABEL`.
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_overrides(|variable| std::env::var(variable).ok())
    }

    /// Applies overrides read through `lookup` instead of the process environment.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        if let Some(value) = lookup(VALIDATION_ENV) {
            self.validation =
                ValidationMode::parse(&value).ok_or(SettingsError::InvalidValue {
                    variable: VALIDATION_ENV,
                    value,
                })?;
        }
        if let Some(label) = lookup(LABEL_ENV).filter(|label| !label.is_empty()) {
            self.label = label;
        }
        Ok(self)
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the validation mode.
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }
}
