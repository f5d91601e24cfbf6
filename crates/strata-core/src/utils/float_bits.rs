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

use serde::{Deserialize, Serialize};
use std::fmt;

/// An `f32` stored by its bit pattern so it can take part in `Eq` and `Hash`.
///
/// `-0.0` is folded onto `0.0` and every NaN onto a single canonical NaN, so
/// two values that a backend would treat identically always produce the same key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloatBits(u32);

impl FloatBits {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Builds a key from a float value.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(f32::NAN.to_bits())
        } else if value == 0.0 {
            Self::ZERO
        } else {
            Self(value.to_bits())
        }
    }

    /// Returns the float value.
    pub fn get(self) -> f32 {
        f32::from_bits(self.0)
    }
}

impl From<f32> for FloatBits {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for FloatBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_zero_and_nan_are_canonical() {
        assert_eq!(FloatBits::new(-0.0), FloatBits::new(0.0));
        assert_eq!(FloatBits::new(f32::NAN), FloatBits::new(-f32::NAN));
        assert_ne!(FloatBits::new(1.0), FloatBits::new(-1.0));
        assert_eq!(FloatBits::new(0.25).get(), 0.25);
    }
}
