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

//! A macro to declare usage and feature flag sets.
//!
//! Flag sets declared with [`strata_bitflags!`] are plain `Copy` values that
//! hash and compare by their bits, so they can sit inside the immutable state
//! keys used by the state caches.

#[macro_export]
#[doc(hidden)]
macro_rules! strata_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// The empty set.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Returns the set of every declared flag.
            pub const fn all() -> Self {
                Self { bits: 0 $(| $flag_value)* }
            }

            /// Builds a set from raw bits, dropping bits that name no flag.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits: bits & Self::all().bits }
            }

            /// Builds a set from raw bits, or `None` if an unknown bit is set.
            pub const fn from_bits(bits: $ty) -> Option<Self> {
                if bits & !Self::all().bits == 0 {
                    Some(Self { bits })
                } else {
                    None
                }
            }

            /// Returns the raw bits.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if every flag of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Returns the flags of `self` that are not in `other`.
            #[must_use]
            pub const fn difference(self, other: Self) -> Self {
                Self { bits: self.bits & !other.bits }
            }

            /// Sets the flags of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the flags of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut remaining = self.bits;
                let mut first = true;

                write!(f, "{}(", stringify!($name))?;
                $(
                    let flag: $ty = $flag_value;
                    if flag != 0 && (remaining & flag) == flag {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        remaining &= !flag;
                        first = false;
                    }
                )*
                if remaining != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{:#x}", remaining)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::strata_bitflags;

    strata_bitflags! {
        /// Flags used only by these tests.
        pub struct Access: u16 {
            const READ = 1 << 0;
            const WRITE = 1 << 1;
            const MAP = 1 << 4;
            const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
        }
    }

    #[test]
    fn all_covers_every_declared_flag() {
        assert_eq!(Access::all().bits(), 0b1_0011);
        assert!(Access::all().contains(Access::READ_WRITE));
    }

    #[test]
    fn from_bits_rejects_unknown_bits() {
        assert_eq!(Access::from_bits(0b11), Some(Access::READ_WRITE));
        assert_eq!(Access::from_bits(0b100), None);
        assert_eq!(Access::from_bits_truncate(0b111), Access::READ_WRITE);
    }

    #[test]
    fn set_operations() {
        let mut flags = Access::READ;
        flags.insert(Access::MAP);
        assert!(flags.intersects(Access::READ_WRITE));
        assert!(!flags.contains(Access::READ_WRITE));
        assert_eq!(flags.difference(Access::READ), Access::MAP);
        flags.remove(Access::all());
        assert!(flags.is_empty());
    }

    #[test]
    fn debug_lists_flag_names() {
        assert_eq!(format!("{:?}", Access::EMPTY), "Access(EMPTY)");
        assert_eq!(
            format!("{:?}", Access::READ | Access::MAP),
            "Access(READ | MAP)"
        );
        // Composite constants are printed once their parts are consumed.
        assert_eq!(format!("{:?}", Access::READ_WRITE), "Access(READ | WRITE)");
    }
}
