//! Newtype IDs for type-safe entity references.
//!
//! Vendure exposes every entity ID as an opaque `ID` scalar (a string on the
//! wire). Use the `define_id!` macro to create wrappers that prevent
//! accidentally passing an order line ID where a variant ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use vendure_storefront_core::define_id;
/// define_id!(FacetValueId);
/// define_id!(AssetId);
///
/// let facet = FacetValueId::new("12");
/// let asset = AssetId::new("12");
///
/// // These are different types, so this won't compile:
/// // let _: FacetValueId = asset;
/// assert_eq!(facet.as_str(), asset.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(VariantId);
define_id!(CollectionId);
define_id!(OrderLineId);
define_id!(OrderCode);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrips_through_serde_as_plain_string() {
        let id = VariantId::new("42");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn test_id_display_and_conversions() {
        let line = OrderLineId::from("T_1");
        assert_eq!(line.to_string(), "T_1");
        assert_eq!(line.as_str(), "T_1");
        assert_eq!(String::from(line), "T_1");
    }
}
