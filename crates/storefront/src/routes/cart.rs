//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart is the customer's Vendure active order; the session holds the
//! bearer token that identifies it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{load_shop_session, save_shop_session};
use crate::routes::products::ImageView;
use crate::routes::{Layout, is_htmx};
use crate::state::AppState;
use crate::vendure::conversions::cart::DEFAULT_CHECKOUT_PATH;
use crate::vendure::{Cart, CartItem, ShopSession, VendureError};
use vendure_storefront_core::{CacheTag, OrderLineId, VariantId};

/// Event htmx listens for to refresh cart fragments.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub options: Vec<String>,
    pub quantity: i64,
    pub price: String,
    pub line_price: String,
    pub image: Option<ImageView>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub item_count: i64,
    /// Lines can still be changed (the order is not in checkout).
    pub editable: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            tax: "$0.00".to_string(),
            total: "$0.00".to_string(),
            item_count: 0,
            editable: true,
        }
    }

    /// Whether the cart has any lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let merchandise = &item.merchandise;
        Self {
            id: item.id.to_string(),
            handle: merchandise.product.handle.clone(),
            title: merchandise.product.title.clone(),
            variant_title: (merchandise.title != merchandise.product.title)
                .then(|| merchandise.title.clone()),
            options: merchandise
                .selected_options
                .iter()
                .map(|o| format!("{}: {}", o.name, o.value))
                .collect(),
            quantity: item.quantity,
            price: item.cost.amount_per_quantity.display(),
            line_price: item.cost.total_amount.display(),
            image: merchandise
                .product
                .featured_image
                .as_ref()
                .map(ImageView::from),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.cost.subtotal_amount.display(),
            tax: cart.cost.total_tax_amount.display(),
            total: cart.cost.total_amount.display(),
            item_count: cart.total_quantity,
            editable: cart.state.is_editable(),
        }
    }
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: Option<String>,
    pub quantity: Option<i64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Checkout summary page, shown when checkout is handled on this site.
#[derive(Template, WebTemplate)]
#[template(path = "pages/checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub order_code: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Cart action error fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_error.html")]
pub struct CartErrorTemplate {
    pub message: &'static str,
}

// =============================================================================
// Helpers
// =============================================================================

/// Fetch the active order, keeping the session token current.
async fn current_cart(state: &AppState, session: &Session) -> Option<Cart> {
    let mut shop = load_shop_session(session).await;
    let before = shop.clone();

    let cart = match state.vendure().get_cart(&mut shop).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            None
        }
    };

    if shop != before {
        persist_session(session, &shop).await;
    }

    cart
}

async fn persist_session(session: &Session, shop: &ShopSession) {
    if let Err(e) = save_shop_session(session, shop).await {
        tracing::error!("Failed to save Vendure token to session: {e}");
    }
}

/// Respond to a failed cart action.
fn action_error(message: &'static str, error: Option<&VendureError>) -> Response {
    if let Some(e) = error {
        tracing::error!("{message}: {e}");
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        CartErrorTemplate { message },
    )
        .into_response()
}

/// Respond to a rejected order mutation.
///
/// Vendure may issue a token (and start an order) even when it rejects the
/// change, so a token that changed is saved before answering.
async fn mutation_error(
    session: &Session,
    shop: &ShopSession,
    before: &ShopSession,
    message: &'static str,
    error: &VendureError,
) -> Response {
    if shop != before {
        persist_session(session, shop).await;
    }
    action_error(message, Some(error))
}

/// Finish a successful cart action.
///
/// htmx requests get `fragment` plus the `cart-updated` trigger; plain form
/// posts are redirected back to the cart page.
async fn action_success(
    state: &AppState,
    session: &Session,
    shop: &ShopSession,
    headers: &HeaderMap,
    fragment: impl IntoResponse,
) -> Response {
    persist_session(session, shop).await;
    // Carts are always fetched live; no cached read carries this tag yet
    state.vendure().revalidate_tag(CacheTag::Cart);

    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
            fragment,
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = current_cart(&state, &session)
        .await
        .map_or_else(CartView::empty, |c| CartView::from(&c));

    CartShowTemplate {
        layout: Layout::load(&state).await,
        cart,
    }
}

/// Add item to cart (HTMX).
///
/// The first add of a session creates the active order.
/// Returns the cart count badge with an HTMX trigger.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let Some(variant_id) = form
        .variant_id
        .filter(|id| !id.trim().is_empty())
        .map(VariantId::new)
    else {
        return action_error("Missing product variant ID", None);
    };
    let quantity = form.quantity.unwrap_or(1).max(1);
    add_breadcrumb(
        "cart",
        "Add to cart",
        Some(&[("variant_id", variant_id.as_str())]),
    );

    let mut shop = load_shop_session(&session).await;
    let before = shop.clone();
    let result = if shop.auth_token.is_none() {
        state
            .vendure()
            .create_cart(&mut shop, &variant_id, quantity)
            .await
    } else {
        state
            .vendure()
            .add_to_cart(&mut shop, &variant_id, quantity)
            .await
    };

    match result {
        Ok(cart) => {
            let count = cart.total_quantity;
            action_success(&state, &session, &shop, &headers, CartCountTemplate { count }).await
        }
        Err(e) => mutation_error(&session, &shop, &before, "Error adding item to cart", &e).await,
    }
}

/// Update cart item quantity (HTMX).
///
/// A quantity of zero or less removes the line.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let line_id = OrderLineId::new(form.line_id);
    let mut shop = load_shop_session(&session).await;
    let before = shop.clone();

    let result = if form.quantity <= 0 {
        state.vendure().remove_from_cart(&mut shop, &line_id).await
    } else {
        state
            .vendure()
            .update_cart(&mut shop, &line_id, form.quantity)
            .await
    };

    match result {
        Ok(cart) => {
            let cart = CartView::from(&cart);
            action_success(&state, &session, &shop, &headers, CartItemsTemplate { cart }).await
        }
        Err(e) => {
            mutation_error(&session, &shop, &before, "Error updating item quantity", &e).await
        }
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let line_id = OrderLineId::new(form.line_id);
    let mut shop = load_shop_session(&session).await;
    let before = shop.clone();

    match state.vendure().remove_from_cart(&mut shop, &line_id).await {
        Ok(cart) => {
            let cart = CartView::from(&cart);
            action_success(&state, &session, &shop, &headers, CartItemsTemplate { cart }).await
        }
        Err(e) => {
            mutation_error(&session, &shop, &before, "Error removing item from cart", &e).await
        }
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = current_cart(&state, &session)
        .await
        .map_or(0, |cart| cart.total_quantity);

    CartCountTemplate { count }
}

/// Go to checkout.
///
/// External checkout pages get a redirect. When checkout lives on this site
/// the order summary is rendered directly.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Response {
    let Some(cart) = current_cart(&state, &session).await else {
        return Redirect::to("/cart").into_response();
    };

    if cart.lines.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let external = state
        .config()
        .vendure
        .checkout_url
        .as_deref()
        .is_some_and(|url| url != DEFAULT_CHECKOUT_PATH);

    if external {
        return Redirect::to(&cart.checkout_url).into_response();
    }

    CheckoutTemplate {
        layout: Layout::load(&state).await,
        order_code: cart.code.to_string(),
        cart: CartView::from(&cart),
    }
    .into_response()
}
