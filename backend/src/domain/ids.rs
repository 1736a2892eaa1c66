//! UUID-backed identifiers for the entity graph.
//!
//! Each entity gets its own identifier type so a log list id can never be
//! passed where a user id is expected.

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Mint a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Parse an identifier from its hyphenated text form.
            pub fn parse(raw: &str) -> Result<Self, $crate::domain::ids::IdParseError> {
                ::uuid::Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|_| $crate::domain::ids::IdParseError { kind: $label })
            }

            #[doc = concat!("Wrap an existing UUID as a ", $label, " id.")]
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::ids::IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

pub(crate) use uuid_identifier;

/// Raised when an identifier is not a valid UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} id must be a valid UUID")]
pub struct IdParseError {
    /// Entity label, for example `"log list"`.
    pub kind: &'static str,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    uuid_identifier!(SampleId, "sample");

    #[rstest]
    fn parse_accepts_surrounding_whitespace() {
        let id = SampleId::parse(" 7d4e2f1a-3b5c-4d6e-8f90-a1b2c3d4e5f6 ").expect("valid id");
        assert_eq!(id.to_string(), "7d4e2f1a-3b5c-4d6e-8f90-a1b2c3d4e5f6");
    }

    #[rstest]
    fn parse_error_names_the_entity() {
        let err = SampleId::parse("nope").expect_err("invalid id");
        assert_eq!(err.to_string(), "sample id must be a valid UUID");
    }

    #[rstest]
    fn serialises_as_plain_string() {
        let id = SampleId::random();
        let value = serde_json::to_value(id).expect("serialises");
        assert_eq!(value, serde_json::Value::String(id.to_string()));
    }
}
