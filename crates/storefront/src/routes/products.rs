//! Product route handlers.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::Layout;
use crate::state::AppState;
use crate::vendure::{Image, Product, ProductVariant};

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            url: image.url.clone(),
            alt: image.alt_text.clone(),
        }
    }
}

/// Product card data for grids (home, search, related products).
#[derive(Clone)]
pub struct ProductCardView {
    pub handle: String,
    pub title: String,
    pub price: String,
    /// Set when variants differ in price.
    pub max_price: Option<String>,
    pub image: Option<ImageView>,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let range = &product.price_range;
        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            price: range.min_variant_price.display(),
            max_price: (!range.is_single()).then(|| range.max_variant_price.display()),
            image: product.featured_image.as_ref().map(ImageView::from),
        }
    }
}

/// Map products to grid cards.
#[must_use]
pub fn product_cards(products: &[Product]) -> Vec<ProductCardView> {
    products.iter().map(ProductCardView::from).collect()
}

/// A selectable option value with a link that selects it.
#[derive(Clone)]
pub struct OptionValueView {
    pub value: String,
    pub url: String,
    pub selected: bool,
    /// Whether some in-stock variant has this value together with the other
    /// selected options.
    pub available: bool,
}

/// A product option (e.g., "Size") with its values.
#[derive(Clone)]
pub struct OptionView {
    pub name: String,
    pub values: Vec<OptionValueView>,
}

/// The variant the add-to-cart form submits.
#[derive(Clone)]
pub struct VariantView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub available: bool,
}

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub description_html: String,
    pub seo_title: String,
    pub seo_description: String,
    pub featured_image: Option<ImageView>,
    pub images: Vec<ImageView>,
    pub options: Vec<OptionView>,
    /// `None` when the selection matches no variant.
    pub variant: Option<VariantView>,
    pub available: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub related_products: Vec<ProductCardView>,
}

/// Option selection from the query string, keyed by lowercased option name.
type Selection = BTreeMap<String, String>;

fn option_key(name: &str) -> String {
    name.to_lowercase()
}

/// Whether a variant carries every selected option value.
fn variant_matches(variant: &ProductVariant, selection: &Selection) -> bool {
    selection.iter().all(|(name, value)| {
        variant
            .selected_options
            .iter()
            .find(|o| option_key(&o.name) == *name)
            .is_none_or(|o| &o.value == value)
    })
}

/// Pick the variant described by the query string.
///
/// Products with a single variant always select it. Otherwise every option
/// must be chosen; until then no variant is selected.
#[must_use]
pub fn selected_variant<'a>(
    product: &'a Product,
    selection: &Selection,
) -> Option<&'a ProductVariant> {
    if product.variants.len() == 1 {
        return product.default_variant();
    }

    let complete = product
        .options
        .iter()
        .all(|o| selection.contains_key(&option_key(&o.name)));
    if !complete {
        return None;
    }

    product
        .variants
        .iter()
        .find(|v| variant_matches(v, selection))
}

/// Link selecting `value` for option `name`, keeping the other selections.
fn option_url(handle: &str, selection: &Selection, name: &str, value: &str) -> String {
    let mut next = selection.clone();
    next.insert(option_key(name), value.to_string());

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(next.iter())
        .finish();
    format!("/product/{handle}?{query}")
}

fn option_views(product: &Product, selection: &Selection) -> Vec<OptionView> {
    product
        .options
        .iter()
        .map(|option| {
            let key = option_key(&option.name);
            let values = option
                .values
                .iter()
                .map(|value| {
                    let mut candidate = selection.clone();
                    candidate.insert(key.clone(), value.clone());
                    OptionValueView {
                        value: value.clone(),
                        url: option_url(&product.handle, selection, &option.name, value),
                        selected: selection.get(&key) == Some(value),
                        available: product
                            .variants
                            .iter()
                            .any(|v| v.available_for_sale && variant_matches(v, &candidate)),
                    }
                })
                .collect();

            OptionView {
                name: option.name.clone(),
                values,
            }
        })
        .collect()
}

impl ProductView {
    /// Build the detail view for the options chosen in `selection`.
    #[must_use]
    pub fn new(product: &Product, selection: &Selection) -> Self {
        let variant = selected_variant(product, selection).map(|v| VariantView {
            id: v.id.to_string(),
            title: v.title.clone(),
            price: v.price.display(),
            available: v.available_for_sale,
        });

        Self {
            handle: product.handle.clone(),
            title: product.title.clone(),
            description_html: product.description_html.clone(),
            seo_title: product.seo.title.clone(),
            seo_description: product.seo.description.clone(),
            featured_image: product.featured_image.as_ref().map(ImageView::from),
            images: product.images.iter().map(ImageView::from).collect(),
            options: option_views(product, selection),
            variant,
            available: product.available_for_sale,
        }
    }
}

/// Display product detail page.
///
/// Query parameters select option values (e.g., `?size=large`).
#[instrument(skip(state, params), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<ProductShowTemplate> {
    let product = state
        .vendure()
        .get_product(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product `{handle}`")))?;

    let related_products = match state.vendure().get_related_products(&product).await {
        Ok(products) => product_cards(&products),
        Err(e) => {
            tracing::warn!("Failed to load recommendations for {handle}: {e}");
            Vec::new()
        }
    };

    let selection: Selection = params
        .into_iter()
        .map(|(name, value)| (option_key(&name), value))
        .collect();

    Ok(ProductShowTemplate {
        layout: Layout::load(&state).await,
        product: ProductView::new(&product, &selection),
        related_products,
    })
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use vendure_storefront_core::{Money, ProductId, VariantId};

    use super::*;
    use crate::vendure::{PriceRange, ProductOption, SelectedOption, Seo};

    fn variant(id: &str, size: &str, color: &str, available: bool) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            title: format!("{size} / {color}"),
            sku: None,
            available_for_sale: available,
            selected_options: vec![
                SelectedOption {
                    name: "Size".to_string(),
                    value: size.to_string(),
                },
                SelectedOption {
                    name: "Color".to_string(),
                    value: color.to_string(),
                },
            ],
            price: Money::from_minor_units(1500, "USD"),
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("1"),
            handle: "tee".to_string(),
            title: "Tee".to_string(),
            description: String::new(),
            description_html: String::new(),
            available_for_sale: true,
            tags: vec![],
            options: vec![
                ProductOption {
                    id: "10".to_string(),
                    name: "Size".to_string(),
                    values: vec!["S".to_string(), "L".to_string()],
                },
                ProductOption {
                    id: "11".to_string(),
                    name: "Color".to_string(),
                    values: vec!["Red".to_string(), "Blue".to_string()],
                },
            ],
            variants: vec![
                variant("v1", "S", "Red", true),
                variant("v2", "L", "Red", false),
                variant("v3", "L", "Blue", true),
            ],
            price_range: PriceRange::single(Money::from_minor_units(1500, "USD")),
            featured_image: None,
            images: vec![],
            seo: Seo {
                title: "Tee".to_string(),
                description: String::new(),
            },
            updated_at: None,
            collection_handles: vec![],
        }
    }

    fn selection(pairs: &[(&str, &str)]) -> Selection {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_selected_variant_requires_every_option() {
        let product = product();
        assert!(selected_variant(&product, &selection(&[("size", "L")])).is_none());

        let chosen = selected_variant(&product, &selection(&[("size", "L"), ("color", "Blue")]));
        assert_eq!(chosen.map(|v| v.id.as_str()), Some("v3"));
    }

    #[test]
    fn test_single_variant_is_always_selected() {
        let mut product = product();
        product.variants.truncate(1);
        let chosen = selected_variant(&product, &Selection::new());
        assert_eq!(chosen.map(|v| v.id.as_str()), Some("v1"));
    }

    #[test]
    fn test_option_availability_follows_selection() {
        let product = product();
        let view = ProductView::new(&product, &selection(&[("color", "Red")]));

        let size = &view.options[0];
        let small = size.values.iter().find(|v| v.value == "S").map(|v| v.available);
        let large = size.values.iter().find(|v| v.value == "L").map(|v| v.available);
        assert_eq!(small, Some(true));
        // L / Red is out of stock
        assert_eq!(large, Some(false));
    }

    #[test]
    fn test_option_url_keeps_other_selections() {
        let url = option_url("tee", &selection(&[("color", "Red")]), "Size", "L");
        assert_eq!(url, "/product/tee?color=Red&size=L");
    }
}
