//! `define_port_error!` declares the error enum a driven port returns.
//!
//! Variants are written as `Name { field: Type } => "display {field}"`. The
//! macro derives `thiserror::Error` and adds one snake_case constructor per
//! variant, so an adapter writes `UserPersistenceError::query(err.to_string())`
//! instead of spelling out the struct literal.

macro_rules! define_port_error {
    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            #[must_use]
            pub const fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                Self::$variant { $($field: $field.into()),+ }
            }
        }
    };

    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $(
                $(#[$doc:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $display:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$doc])*
                #[error($display)]
                $variant $( {
                    $(
                        #[doc = concat!("`", stringify!($field), "` reported by the adapter.")]
                        $field: $ty
                    ),+
                } )?,
            )+
        }

        impl $name {
            $( define_port_error!(@constructor $variant $( { $($field: $ty),+ } )?); )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum LedgerError {
            Offline { reason: String } => "ledger offline: {reason}",
            Locked => "ledger locked",
            Short { list: String, missing: u64 } => "{list} is missing {missing} calls",
        }
    }

    #[rstest]
    #[case(LedgerError::offline("maintenance"), "ledger offline: maintenance")]
    #[case(LedgerError::locked(), "ledger locked")]
    #[case(LedgerError::short("Monday", 2_u64), "Monday is missing 2 calls")]
    fn constructors_render_their_message(#[case] err: LedgerError, #[case] expected: &str) {
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn owned_and_borrowed_strings_build_the_same_variant() {
        assert_eq!(
            LedgerError::offline("x"),
            LedgerError::offline(String::from("x"))
        );
    }
}
