//! `define_port_error!`: error enums for port adapters.
//!
//! Variants declare their fields and display message in one line. The
//! macro derives `thiserror::Error` and adds one snake_case constructor per
//! variant whose arguments take `impl Into<FieldType>`.

macro_rules! define_port_error {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $($field:ident : $ty:ty),* $(,)? })? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $({ $($field: $ty),* })?,
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $({ $($field: $field.into()),* })?
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;
