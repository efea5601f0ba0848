//! Product reshaping.

use vendure_storefront_core::{DEFAULT_CURRENCY, Money, ProductId, VariantId};

use crate::vendure::types::{
    HIDDEN_PRODUCT_TAG, Image, PriceRange, Product, ProductOption, ProductVariant, SelectedOption,
    Seo,
};

use super::super::raw::{VendureAsset, VendureOption, VendureOptionGroup, VendureProduct, VendureVariant};

const OUT_OF_STOCK: &str = "OUT_OF_STOCK";

// =============================================================================
// Images
// =============================================================================

/// File name of an asset URL, without directory or extension.
fn file_stem(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.get(..dot).unwrap_or(name),
        _ => name,
    }
}

/// Convert one asset. The alt text falls back to `"{title} - {file name}"`.
pub fn reshape_image(asset: VendureAsset, product_title: &str) -> Image {
    let alt_text = if asset.name.trim().is_empty() {
        format!("{product_title} - {}", file_stem(&asset.preview))
    } else {
        asset.name
    };

    Image {
        url: asset.preview,
        alt_text,
        width: asset.width,
        height: asset.height,
    }
}

/// Convert a list of assets, keeping order.
pub fn reshape_images(assets: Vec<VendureAsset>, product_title: &str) -> Vec<Image> {
    assets
        .into_iter()
        .map(|asset| reshape_image(asset, product_title))
        .collect()
}

// =============================================================================
// Text
// =============================================================================

/// Plain text from a Vendure rich text description.
///
/// Tags are dropped, the common entities decoded and whitespace collapsed.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Products
// =============================================================================

/// Option group name for a variant option.
///
/// Variant options carry their group; the product's option groups are the
/// fallback when a response leaves it out.
fn option_group_name(option: &VendureOption, groups: &[VendureOptionGroup]) -> String {
    if let Some(group) = &option.group {
        return group.name.clone();
    }

    groups
        .iter()
        .find(|group| group.options.iter().any(|o| o.id == option.id))
        .map_or_else(|| option.code.clone(), |group| group.name.clone())
}

fn reshape_variant(variant: VendureVariant, groups: &[VendureOptionGroup]) -> ProductVariant {
    let selected_options = variant
        .options
        .iter()
        .map(|option| SelectedOption {
            name: option_group_name(option, groups),
            value: option.name.clone(),
        })
        .collect();

    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.name,
        sku: variant.sku.filter(|sku| !sku.is_empty()),
        available_for_sale: variant.stock_level.as_deref() != Some(OUT_OF_STOCK),
        selected_options,
        price: Money::from_minor_units(variant.price_with_tax, variant.currency_code),
    }
}

fn reshape_options(groups: &[VendureOptionGroup]) -> Vec<ProductOption> {
    groups
        .iter()
        .map(|group| ProductOption {
            id: group.id.clone(),
            name: group.name.clone(),
            values: group.options.iter().map(|o| o.name.clone()).collect(),
        })
        .collect()
}

/// Price range over the variants' prices including tax.
fn variant_price_range(variants: &[VendureVariant]) -> PriceRange {
    let currency = variants
        .first()
        .map_or(DEFAULT_CURRENCY, |v| v.currency_code.as_str());

    let min = variants.iter().map(|v| v.price_with_tax).min().unwrap_or(0);
    let max = variants.iter().map(|v| v.price_with_tax).max().unwrap_or(0);

    PriceRange {
        min_variant_price: Money::from_minor_units(min, currency),
        max_variant_price: Money::from_minor_units(max, currency),
    }
}

/// Convert a Shop API product.
///
/// Returns `None` when `filter_hidden` is set and the product carries the
/// [`HIDDEN_PRODUCT_TAG`] facet value.
pub fn reshape_product(product: VendureProduct, filter_hidden: bool) -> Option<Product> {
    let tags: Vec<String> = product
        .facet_values
        .iter()
        .map(|fv| fv.code.clone())
        .collect();

    if filter_hidden && tags.iter().any(|tag| tag == HIDDEN_PRODUCT_TAG) {
        return None;
    }

    let description = strip_html(&product.description);
    let price_range = variant_price_range(&product.variants);
    let options = reshape_options(&product.option_groups);

    let VendureProduct {
        id,
        slug,
        name,
        description: description_html,
        updated_at,
        option_groups,
        variants,
        featured_asset,
        assets,
        collections,
        ..
    } = product;

    let variants: Vec<ProductVariant> = variants
        .into_iter()
        .map(|v| reshape_variant(v, &option_groups))
        .collect();

    let images = reshape_images(assets, &name);
    let featured_image = featured_asset
        .map(|asset| reshape_image(asset, &name))
        .or_else(|| images.first().cloned());

    Some(Product {
        id: ProductId::new(id),
        handle: slug,
        available_for_sale: variants.iter().any(|v| v.available_for_sale),
        seo: Seo {
            title: name.clone(),
            description: description.clone(),
        },
        title: name,
        description,
        description_html,
        tags,
        options,
        variants,
        price_range,
        featured_image,
        images,
        updated_at,
        collection_handles: collections.into_iter().map(|c| c.slug).collect(),
    })
}

/// Convert a product list, keeping order and dropping hidden products.
pub fn reshape_products(products: Vec<VendureProduct>) -> Vec<Product> {
    products
        .into_iter()
        .filter_map(|product| reshape_product(product, true))
        .collect()
}
