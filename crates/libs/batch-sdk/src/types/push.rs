use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Declares a notification type flag and the set that combines them.
///
/// Flags combine with `|` into the set type; the set serializes to the bit
/// value the native runtime expects.
macro_rules! notification_flag_set {
    (
        $(#[$flag_meta:meta])*
        $flag:ident,
        $(#[$set_meta:meta])*
        $set:ident { $($variant:ident = $bit:expr),+ $(,)? }
    ) => {
        $(#[$flag_meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $flag {
            $($variant = $bit),+
        }

        impl $flag {
            pub fn all() -> &'static [$flag] {
                &[$($flag::$variant),+]
            }
        }

        $(#[$set_meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $set(u8);

        impl $set {
            pub const NONE: Self = Self(0);

            pub fn empty() -> Self {
                Self::NONE
            }

            pub fn all() -> Self {
                $flag::all().iter().fold(Self::NONE, |set, flag| set.with(*flag))
            }

            pub fn with(self, flag: $flag) -> Self {
                Self(self.0 | flag as u8)
            }

            pub fn contains(&self, flag: $flag) -> bool {
                (self.0 & flag as u8) != 0
            }

            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }

            pub fn bits(&self) -> u8 {
                self.0
            }

            /// Unknown bits are dropped.
            pub fn from_bits_truncate(bits: u8) -> Self {
                Self(bits & Self::all().0)
            }
        }

        impl From<$flag> for $set {
            fn from(flag: $flag) -> Self {
                Self::NONE.with(flag)
            }
        }

        impl BitOr for $flag {
            type Output = $set;

            fn bitor(self, rhs: Self) -> Self::Output {
                $set::NONE.with(self).with(rhs)
            }
        }

        impl BitOr<$flag> for $set {
            type Output = $set;

            fn bitor(self, rhs: $flag) -> Self::Output {
                self.with(rhs)
            }
        }

        impl BitOr for $set {
            type Output = $set;

            fn bitor(self, rhs: Self) -> Self::Output {
                Self(self.0 | rhs.0)
            }
        }
    };
}

notification_flag_set! {
    /// One Android remote notification behaviour.
    AndroidNotificationType,
    /// Combination of Android notification behaviours.
    AndroidNotificationTypes {
        Sound = 1 << 0,
        Vibrate = 1 << 1,
        Lights = 1 << 2,
        Alert = 1 << 3,
    }
}

notification_flag_set! {
    /// One iOS remote notification type.
    IosNotificationType,
    /// Combination of iOS notification types.
    IosNotificationTypes {
        Badge = 1 << 0,
        Sound = 1 << 1,
        Alert = 1 << 2,
    }
}
