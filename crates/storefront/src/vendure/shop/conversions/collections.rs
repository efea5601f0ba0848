//! Collection reshaping.

use crate::vendure::types::{Collection, Seo};

use super::super::raw::VendureCollection;
use super::products::{reshape_image, strip_html};

/// Storefront path for browsing a collection.
#[must_use]
pub fn collection_path(handle: &str) -> String {
    if handle.is_empty() {
        "/search".to_string()
    } else {
        format!("/search/{handle}")
    }
}

/// Convert a Shop API collection.
pub fn reshape_collection(collection: VendureCollection) -> Collection {
    let description = strip_html(&collection.description);
    let image = collection
        .featured_asset
        .map(|asset| reshape_image(asset, &collection.name));

    Collection {
        path: collection_path(&collection.slug),
        handle: collection.slug,
        seo: Seo {
            title: collection.name.clone(),
            description: description.clone(),
        },
        title: collection.name,
        description,
        updated_at: collection.updated_at,
        image,
    }
}

/// Convert a collection list, keeping order.
pub fn reshape_collections(collections: Vec<VendureCollection>) -> Vec<Collection> {
    collections.into_iter().map(reshape_collection).collect()
}

/// The synthetic "All" collection listed before the real ones.
#[must_use]
pub fn all_products_collection() -> Collection {
    Collection {
        handle: String::new(),
        title: "All".to_string(),
        description: "All products".to_string(),
        seo: Seo {
            title: "All".to_string(),
            description: "All products".to_string(),
        },
        path: collection_path(""),
        updated_at: Some(chrono::Utc::now().to_rfc3339()),
        image: None,
    }
}
