//! Cart (active order) reshaping.

use vendure_storefront_core::{
    DEFAULT_CURRENCY, Money, OrderCode, OrderLineId, OrderState, ProductId, VariantId,
};

use crate::vendure::types::{
    Cart, CartCost, CartItem, CartItemCost, CartMerchandise, CartProduct, SelectedOption,
};

use super::super::raw::{VendureOrder, VendureOrderLine};
use super::products::reshape_image;

/// Checkout path used when no external checkout URL is configured.
pub const DEFAULT_CHECKOUT_PATH: &str = "/checkout";

/// Where the customer continues to checkout for an order.
///
/// The order code is appended as the `order` query parameter of the
/// configured checkout URL.
#[must_use]
pub fn checkout_url(base: Option<&str>, code: &str) -> String {
    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return DEFAULT_CHECKOUT_PATH.to_string();
    };

    match url::Url::parse(base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("order", code);
            url.to_string()
        }
        Err(_) => {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}order={code}")
        }
    }
}

/// Convert an order line.
pub fn reshape_line_item(line: VendureOrderLine) -> CartItem {
    let variant = line.product_variant;
    let currency = variant.currency_code;

    let selected_options = variant
        .options
        .into_iter()
        .map(|option| SelectedOption {
            name: option.group.map_or(option.code, |group| group.name),
            value: option.name,
        })
        .collect();

    let product_title = variant.product.name;
    let featured_image = variant
        .product
        .featured_asset
        .or(line.featured_asset)
        .map(|asset| reshape_image(asset, &product_title));

    CartItem {
        id: OrderLineId::new(line.id),
        quantity: line.quantity,
        cost: CartItemCost {
            amount_per_quantity: Money::from_minor_units(line.unit_price_with_tax, currency.as_str()),
            total_amount: Money::from_minor_units(line.line_price_with_tax, currency.as_str()),
        },
        merchandise: CartMerchandise {
            id: VariantId::new(variant.id),
            title: variant.name,
            selected_options,
            product: CartProduct {
                id: ProductId::new(variant.product.id),
                handle: variant.product.slug,
                title: product_title,
                featured_image,
            },
        },
    }
}

/// Convert an active order into a cart.
pub fn reshape_cart(order: VendureOrder, checkout_base: Option<&str>) -> Cart {
    let currency = order.currency_code.as_str();

    let total_tax_amount = if order.tax_summary.is_empty() {
        Money::zero(DEFAULT_CURRENCY)
    } else {
        Money::from_minor_units(order.tax_summary.iter().map(|t| t.tax_total).sum(), currency)
    };

    let cost = CartCost {
        subtotal_amount: Money::from_minor_units(order.sub_total_with_tax, currency),
        total_amount: Money::from_minor_units(order.total_with_tax, currency),
        total_tax_amount,
    };

    Cart {
        checkout_url: checkout_url(checkout_base, &order.code),
        id: order.id,
        code: OrderCode::new(order.code),
        state: OrderState::parse(&order.state),
        total_quantity: order.total_quantity,
        cost,
        lines: order.lines.into_iter().map(reshape_line_item).collect(),
    }
}
