//! Search result and facet reshaping.

use std::collections::HashMap;

use vendure_storefront_core::{Money, ProductId, VariantId};

use crate::vendure::types::{
    FacetValueOption, FacetWithValues, HIDDEN_PRODUCT_TAG, PriceRange, Product, ProductSort,
    ProductVariant, Seo,
};

use super::super::raw::{
    SearchPrice, SearchSortParameter, SortOrder, VendureAsset, VendureFacetValueResult,
    VendureSearchResult,
};
use super::products::{reshape_image, strip_html};

/// Map a product sort key to the key the collection listing understands.
#[must_use]
pub fn map_sort_key(sort_key: &str) -> &str {
    if sort_key == "CREATED_AT" {
        "CREATED"
    } else {
        sort_key
    }
}

/// Sort parameter for a search query.
///
/// The Shop API search index sorts by name or price only, so `CREATED` and
/// relevance leave the backend order untouched.
#[must_use]
pub fn search_sort(sort: ProductSort, reverse: bool) -> Option<SearchSortParameter> {
    let order = SortOrder::from_reverse(reverse);

    match map_sort_key(sort.as_key()) {
        "TITLE" => Some(SearchSortParameter {
            name: Some(order),
            price: None,
        }),
        "PRICE" => Some(SearchSortParameter {
            name: None,
            price: Some(order),
        }),
        _ => None,
    }
}

/// Facet value codes by ID, as listed in a search response's facet counts.
pub fn facet_codes(facet_values: &[VendureFacetValueResult]) -> HashMap<&str, &str> {
    facet_values
        .iter()
        .map(|result| (result.facet_value.id.as_str(), result.facet_value.code.as_str()))
        .collect()
}

/// Convert a search hit into a listing product.
///
/// Tags are the codes of the hit's facet values found in `codes`. Search hits
/// carry no variant data beyond the grouped variant ID, so the product gets
/// at most one variant, priced at the minimum price.
pub fn reshape_search_result(item: VendureSearchResult, codes: &HashMap<&str, &str>) -> Product {
    let price_range = match item.price_with_tax {
        SearchPrice::Single { value } => {
            PriceRange::single(Money::from_minor_units(value, item.currency_code.as_str()))
        }
        SearchPrice::Range { min, max } => PriceRange {
            min_variant_price: Money::from_minor_units(min, item.currency_code.as_str()),
            max_variant_price: Money::from_minor_units(max, item.currency_code.as_str()),
        },
    };

    let featured_image = item.product_asset.map(|asset| {
        reshape_image(
            VendureAsset {
                id: asset.id,
                name: String::new(),
                preview: asset.preview,
                width: None,
                height: None,
            },
            &item.product_name,
        )
    });

    let tags: Vec<String> = item
        .facet_value_ids
        .iter()
        .filter_map(|id| codes.get(id.as_str()))
        .map(|code| (*code).to_string())
        .collect();

    let variants: Vec<ProductVariant> = item
        .product_variant_id
        .map(|id| ProductVariant {
            id: VariantId::new(id),
            title: item.product_name.clone(),
            sku: None,
            available_for_sale: true,
            selected_options: vec![],
            price: price_range.min_variant_price.clone(),
        })
        .into_iter()
        .collect();

    let description = strip_html(&item.description);

    Product {
        variants,
        id: ProductId::new(item.product_id),
        handle: item.slug,
        seo: Seo {
            title: item.product_name.clone(),
            description: description.clone(),
        },
        title: item.product_name,
        description,
        description_html: item.description,
        available_for_sale: true,
        tags,
        options: vec![],
        price_range,
        images: featured_image.iter().cloned().collect(),
        featured_image,
        updated_at: None,
        collection_handles: vec![],
    }
}

/// Convert search hits, keeping order and dropping hidden products.
///
/// Hit facet values are resolved through `facet_values`, the facet counts of
/// the same response.
pub fn reshape_search_results(
    items: Vec<VendureSearchResult>,
    facet_values: &[VendureFacetValueResult],
) -> Vec<Product> {
    let codes = facet_codes(facet_values);
    items
        .into_iter()
        .map(|item| reshape_search_result(item, &codes))
        .filter(|product| !product.tags.iter().any(|tag| tag == HIDDEN_PRODUCT_TAG))
        .collect()
}

/// Group facet value counts by facet, in first-seen order.
pub fn reshape_facets(
    facet_values: Vec<VendureFacetValueResult>,
    selected_ids: &[String],
) -> Vec<FacetWithValues> {
    let mut facets: Vec<FacetWithValues> = Vec::new();

    for result in facet_values {
        let value = result.facet_value;
        if value.code == HIDDEN_PRODUCT_TAG {
            continue;
        }

        let selected = selected_ids.contains(&value.id);
        let option = FacetValueOption {
            id: value.id,
            name: value.name,
            count: result.count,
            selected,
        };

        if let Some(facet) = facets.iter_mut().find(|f| f.id == value.facet.id) {
            facet.open |= selected;
            facet.values.push(option);
        } else {
            facets.push(FacetWithValues {
                id: value.facet.id,
                name: value.facet.name,
                open: selected,
                values: vec![option],
            });
        }
    }

    facets
}
