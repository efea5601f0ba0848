//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::Layout;
use crate::routes::products::{ProductCardView, product_cards};
use crate::state::AppState;
use crate::vendure::{HOMEPAGE_FEATURED_COLLECTION, ProductQuery, ProductSort};

/// Number of products shown on the home page.
const FEATURED_PRODUCT_COUNT: usize = 12;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCardView>,
}

/// Display home page.
///
/// Shows the products of the hidden featured collection. Stores without one
/// get the newest products instead.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let mut products = state
        .vendure()
        .get_collection_products(HOMEPAGE_FEATURED_COLLECTION, ProductSort::Relevance, false)
        .await?;

    if products.is_empty() {
        products = state
            .vendure()
            .get_products(&ProductQuery {
                query: None,
                sort: ProductSort::CreatedAt,
                reverse: true,
            })
            .await?;
    }

    products.truncate(FEATURED_PRODUCT_COUNT);

    Ok(HomeTemplate {
        layout: Layout::load(&state).await,
        products: product_cards(&products),
    })
}
