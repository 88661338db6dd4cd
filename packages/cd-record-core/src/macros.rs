//! # Declarative Constant Tables
//!
//! Record schemas refer to enum constant sets by domain name. These macros turn
//! a table of `Name = code` pairs into a Rust enum that implements
//! [`CodeEnum`](crate::schema::CodeEnum), and for bitfields also
//! [`BitFlag`](crate::schema::BitFlag).
//!
//! ```ignore
//! cd_enum! {
//!     pub enum ScrollStyle {
//!         Always = 1,
//!         Never = 2,
//!         Auto = 3,
//!     }
//! }
//!
//! cd_flags! {
//!     pub enum FrameFlag {
//!         BorderEnable = 0x0001,
//!         NoResize = 0x0002,
//!     }
//! }
//! ```

/// Declares a single-valued coded enum.
#[macro_export]
macro_rules! cd_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $crate::schema::CodeEnum for $name {
            const DOMAIN: &'static str = stringify!($name);

            fn values() -> &'static [Self] {
                &[ $( $name::$variant ),* ]
            }

            fn code(self) -> u64 {
                match self {
                    $( $name::$variant => $code ),*
                }
            }
        }
    };
}

/// Declares a bitfield enum whose constants combine into a
/// [`FlagSet`](crate::schema::FlagSet).
#[macro_export]
macro_rules! cd_flags {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:expr ),* $(,)?
        }
    ) => {
        $crate::cd_enum! {
            $(#[$meta])*
            $vis enum $name {
                $( $(#[$vmeta])* $variant = $code ),*
            }
        }

        impl $crate::schema::BitFlag for $name {}
    };
}
