//! Cache tags used to group cached Shop API responses for revalidation.

use serde::{Deserialize, Serialize};

/// A tag attached to cached responses.
///
/// Revalidating a tag drops every cached response that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTag {
    Collections,
    Products,
    Cart,
}

impl CacheTag {
    /// The tag name as used in logs and webhook payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collections => "collections",
            Self::Products => "products",
            Self::Cart => "cart",
        }
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names() {
        assert_eq!(CacheTag::Collections.to_string(), "collections");
        assert_eq!(CacheTag::Products.as_str(), "products");
        assert_eq!(CacheTag::Cart.as_str(), "cart");
    }
}
