//! Storefront view model.
//!
//! These types provide a clean, template-friendly API separate from the raw
//! Shop API response shapes in `shop::raw`.

use serde::{Deserialize, Serialize};
use vendure_storefront_core::{Money, OrderCode, OrderLineId, OrderState, ProductId, VariantId};

/// Facet value code that hides a product from listings.
///
/// Hidden products are still reachable by direct link.
pub const HIDDEN_PRODUCT_TAG: &str = "nextjs-frontend-hidden";

/// Collections whose handle starts with this prefix are not listed.
pub const HIDDEN_COLLECTION_PREFIX: &str = "hidden";

/// Collection holding the products featured on the home page.
pub const HOMEPAGE_FEATURED_COLLECTION: &str = "hidden-homepage-featured-items";

/// Menu handle for the header navigation.
pub const HEADER_MENU: &str = "next-js-frontend-header-menu";

/// Menu handle for the footer navigation.
pub const FOOTER_MENU: &str = "next-js-frontend-footer-menu";

// =============================================================================
// Shared Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL (Vendure asset preview).
    pub url: String,
    /// Alt text for accessibility (never empty).
    pub alt_text: String,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: String,
    /// Meta description.
    pub description: String,
}

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

impl PriceRange {
    /// A range with a single price.
    #[must_use]
    pub fn single(price: Money) -> Self {
        Self {
            min_variant_price: price.clone(),
            max_variant_price: price,
        }
    }

    /// Whether every variant costs the same.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.min_variant_price.decimal() == self.max_variant_price.decimal()
    }
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option group name (e.g., "Size").
    pub name: String,
    /// Selected value (e.g., "Large").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option group ID.
    pub id: String,
    /// Option group name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["Small", "Medium", "Large"]`).
    pub values: Vec<String>,
}

/// A product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub sku: Option<String>,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOption>,
    /// Price including tax.
    pub price: Money,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle (Vendure slug).
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Whether any variant is in stock.
    pub available_for_sale: bool,
    /// Facet value codes.
    pub tags: Vec<String>,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// All product images.
    pub images: Vec<Image>,
    /// SEO metadata.
    pub seo: Seo,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// Handles of the collections containing this product.
    pub collection_handles: Vec<String>,
}

impl Product {
    /// The first variant, used when a product has no options to choose from.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// URL handle (Vendure slug). Empty for the synthetic "All" collection.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Description.
    pub description: String,
    /// SEO metadata.
    pub seo: Seo,
    /// Storefront path for browsing this collection.
    pub path: String,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// Collection image.
    pub image: Option<Image>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Simplified product info for cart merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub featured_image: Option<Image>,
}

/// Merchandise in a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title.
    pub title: String,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
    /// Parent product info.
    pub product: CartProduct,
}

/// Cost for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemCost {
    /// Price per unit, including tax.
    pub amount_per_quantity: Money,
    /// Line total, including tax.
    pub total_amount: Money,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Order line ID.
    pub id: OrderLineId,
    /// Quantity.
    pub quantity: i64,
    /// Line cost.
    pub cost: CartItemCost,
    /// Product variant.
    pub merchandise: CartMerchandise,
}

/// Cart cost summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal including tax, before shipping.
    pub subtotal_amount: Money,
    /// Total amount payable.
    pub total_amount: Money,
    /// Total tax amount.
    pub total_tax_amount: Money,
}

/// A shopping cart (Vendure active order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Order ID.
    pub id: String,
    /// Order code.
    pub code: OrderCode,
    /// Order state.
    pub state: OrderState,
    /// Where the customer continues to checkout.
    pub checkout_url: String,
    /// Total item quantity.
    pub total_quantity: i64,
    /// Cart cost summary.
    pub cost: CartCost,
    /// Cart lines.
    pub lines: Vec<CartItem>,
}

// =============================================================================
// Navigation & Search Types
// =============================================================================

/// A navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub title: String,
    pub path: String,
}

/// A selectable facet value in the search sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValueOption {
    pub id: String,
    pub name: String,
    /// Number of matching products.
    pub count: i64,
    pub selected: bool,
}

/// A facet with its values, grouped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetWithValues {
    pub id: String,
    pub name: String,
    /// Whether the facet group starts expanded (any value selected).
    pub open: bool,
    pub values: Vec<FacetValueOption>,
}

/// Search results with facet filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub products: Vec<Product>,
    pub facets: Vec<FacetWithValues>,
    /// Total number of matching products (across all pages).
    pub total: i64,
}

// =============================================================================
// Query Inputs
// =============================================================================

/// Sort keys for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSort {
    /// Backend relevance / collection order.
    #[default]
    Relevance,
    /// Sort by title.
    Title,
    /// Sort by price (with tax).
    Price,
    /// Sort by creation date.
    CreatedAt,
}

impl ProductSort {
    /// Parse a sort key. `CREATED` is accepted as an alias of `CREATED_AT`;
    /// unknown keys fall back to relevance.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_uppercase().as_str() {
            "TITLE" | "NAME" => Self::Title,
            "PRICE" => Self::Price,
            "CREATED_AT" | "CREATED" => Self::CreatedAt,
            _ => Self::Relevance,
        }
    }

    /// The canonical sort key.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Relevance => "RELEVANCE",
            Self::Title => "TITLE",
            Self::Price => "PRICE",
            Self::CreatedAt => "CREATED_AT",
        }
    }
}

/// Parameters for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Free text filter on the product name.
    pub query: Option<String>,
    pub sort: ProductSort,
    /// Descending order when true.
    pub reverse: bool,
}

/// Parameters for the faceted search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub collection: Option<String>,
    /// Selected facet value IDs (products must match all of them).
    pub facet_value_ids: Vec<String>,
    pub sort: ProductSort,
    pub reverse: bool,
}
