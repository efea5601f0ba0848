//! Reshaping of Shop API responses into the storefront view model.
//!
//! Every function here is pure: raw response in, view type out.

pub mod cart;
pub mod collections;
pub mod products;
pub mod search;

pub use cart::{checkout_url, reshape_cart, reshape_line_item};
pub use collections::{all_products_collection, reshape_collection, reshape_collections};
pub use products::{reshape_image, reshape_images, reshape_product, reshape_products, strip_html};
pub use search::{
    map_sort_key, reshape_facets, reshape_search_result, reshape_search_results, search_sort,
};
