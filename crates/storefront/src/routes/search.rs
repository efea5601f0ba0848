//! Search and collection listing handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::Layout;
use crate::routes::products::{ProductCardView, product_cards};
use crate::state::AppState;
use crate::vendure::{FacetWithValues, ProductQuery, ProductSort, SearchQuery, SearchResults};

/// A sort choice offered on listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub title: &'static str,
    pub slug: &'static str,
    pub sort: ProductSort,
    pub reverse: bool,
}

/// Sort choices, default first.
pub const SORT_OPTIONS: [SortOption; 5] = [
    SortOption {
        title: "Relevance",
        slug: "relevance",
        sort: ProductSort::Relevance,
        reverse: false,
    },
    SortOption {
        title: "Name",
        slug: "title",
        sort: ProductSort::Title,
        reverse: false,
    },
    SortOption {
        title: "Latest arrivals",
        slug: "latest",
        sort: ProductSort::CreatedAt,
        reverse: true,
    },
    SortOption {
        title: "Price: Low to high",
        slug: "price-asc",
        sort: ProductSort::Price,
        reverse: false,
    },
    SortOption {
        title: "Price: High to low",
        slug: "price-desc",
        sort: ProductSort::Price,
        reverse: true,
    },
];

impl SortOption {
    /// Look up a sort slug; unknown or missing slugs give the default sort.
    #[must_use]
    pub fn from_slug(slug: Option<&str>) -> Self {
        slug.and_then(|s| SORT_OPTIONS.iter().find(|o| o.slug == s))
            .copied()
            .unwrap_or(SORT_OPTIONS[0])
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    /// Comma-separated facet value IDs.
    pub facets: Option<String>,
}

impl SearchParams {
    fn term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from)
    }

    fn facet_value_ids(&self) -> Vec<String> {
        self.facets
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect()
    }
}

/// A sort link in the sidebar.
#[derive(Clone)]
pub struct SortLinkView {
    pub title: &'static str,
    pub url: String,
    pub active: bool,
}

/// A facet value checkbox-style link.
#[derive(Clone)]
pub struct FacetValueView {
    pub name: String,
    pub count: i64,
    pub url: String,
    pub selected: bool,
}

/// A facet group in the sidebar.
#[derive(Clone)]
pub struct FacetView {
    pub name: String,
    pub open: bool,
    pub values: Vec<FacetValueView>,
}

/// Collection header shown above a collection listing.
#[derive(Clone)]
pub struct CollectionHeaderView {
    pub title: String,
    pub description: String,
}

/// Search page template (also used for collections).
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub collection: Option<CollectionHeaderView>,
    pub term: Option<String>,
    pub total: i64,
    pub products: Vec<ProductCardView>,
    pub sort_links: Vec<SortLinkView>,
    pub facets: Vec<FacetView>,
}

/// Build a listing URL from its parts, leaving out defaults.
fn listing_url(base: &str, term: Option<&str>, sort: &SortOption, facets: &[String]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(term) = term {
        query.append_pair("q", term);
    }
    if sort.slug != SORT_OPTIONS[0].slug {
        query.append_pair("sort", sort.slug);
    }
    if !facets.is_empty() {
        query.append_pair("facets", &facets.join(","));
    }

    let query = query.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

fn sort_links(
    base: &str,
    term: Option<&str>,
    active: &SortOption,
    facets: &[String],
) -> Vec<SortLinkView> {
    SORT_OPTIONS
        .iter()
        .map(|option| SortLinkView {
            title: option.title,
            url: listing_url(base, term, option, facets),
            active: option == active,
        })
        .collect()
}

/// Facet links toggle their value in the current selection.
fn facet_views(
    base: &str,
    term: Option<&str>,
    sort: &SortOption,
    selected: &[String],
    facets: Vec<FacetWithValues>,
) -> Vec<FacetView> {
    facets
        .into_iter()
        .map(|facet| FacetView {
            name: facet.name,
            open: facet.open,
            values: facet
                .values
                .into_iter()
                .map(|value| {
                    let toggled: Vec<String> = if value.selected {
                        selected.iter().filter(|id| **id != value.id).cloned().collect()
                    } else {
                        selected.iter().cloned().chain([value.id.clone()]).collect()
                    };
                    FacetValueView {
                        url: listing_url(base, term, sort, &toggled),
                        name: value.name,
                        count: value.count,
                        selected: value.selected,
                    }
                })
                .collect(),
        })
        .collect()
}

/// Run a listing query.
///
/// The search index cannot order by creation date, so an unfiltered
/// "latest" listing goes through the product list instead.
async fn run_search(state: &AppState, query: &SearchQuery) -> Result<SearchResults> {
    if query.sort == ProductSort::CreatedAt
        && query.collection.is_none()
        && query.facet_value_ids.is_empty()
    {
        let products = state
            .vendure()
            .get_products(&ProductQuery {
                query: query.term.clone(),
                sort: query.sort,
                reverse: query.reverse,
            })
            .await?;

        return Ok(SearchResults {
            total: i64::try_from(products.len()).unwrap_or(i64::MAX),
            products,
            facets: Vec::new(),
        });
    }

    Ok(state.vendure().search(query).await?)
}

async fn render(
    state: &AppState,
    base: &str,
    collection: Option<CollectionHeaderView>,
    collection_handle: Option<String>,
    params: &SearchParams,
) -> Result<SearchTemplate> {
    let term = params.term();
    let sort = SortOption::from_slug(params.sort.as_deref());
    let facet_value_ids = params.facet_value_ids();

    let query = SearchQuery {
        term: term.clone(),
        collection: collection_handle,
        facet_value_ids: facet_value_ids.clone(),
        sort: sort.sort,
        reverse: sort.reverse,
    };
    let results = run_search(state, &query).await?;

    Ok(SearchTemplate {
        layout: Layout::load(state).await,
        collection,
        total: results.total,
        products: product_cards(&results.products),
        sort_links: sort_links(base, term.as_deref(), &sort, &facet_value_ids),
        facets: facet_views(base, term.as_deref(), &sort, &facet_value_ids, results.facets),
        term,
    })
}

/// Display the search page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<SearchTemplate> {
    render(&state, "/search", None, None, &params).await
}

/// Display a collection listing.
#[instrument(skip(state, params), fields(collection = %handle))]
pub async fn collection(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<SearchTemplate> {
    let collection = state
        .vendure()
        .get_collection(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection `{handle}`")))?;

    let header = CollectionHeaderView {
        title: collection.title,
        description: collection.description,
    };

    render(
        &state,
        &format!("/search/{handle}"),
        Some(header),
        Some(handle),
        &params,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendure::FacetValueOption;

    #[test]
    fn test_sort_from_slug() {
        assert_eq!(SortOption::from_slug(None).sort, ProductSort::Relevance);
        assert_eq!(SortOption::from_slug(Some("bogus")).slug, "relevance");

        let latest = SortOption::from_slug(Some("latest"));
        assert_eq!(latest.sort, ProductSort::CreatedAt);
        assert!(latest.reverse);

        let desc = SortOption::from_slug(Some("price-desc"));
        assert_eq!(desc.sort, ProductSort::Price);
        assert!(desc.reverse);
    }

    #[test]
    fn test_search_params_parsing() {
        let params = SearchParams {
            q: Some("  shoes ".to_string()),
            sort: None,
            facets: Some("12, ,34".to_string()),
        };
        assert_eq!(params.term().as_deref(), Some("shoes"));
        assert_eq!(params.facet_value_ids(), vec!["12", "34"]);

        assert!(SearchParams::default().term().is_none());
        assert!(SearchParams::default().facet_value_ids().is_empty());
    }

    #[test]
    fn test_listing_url_omits_defaults() {
        let default = SortOption::from_slug(None);
        assert_eq!(listing_url("/search", None, &default, &[]), "/search");

        let price = SortOption::from_slug(Some("price-asc"));
        let facets = ["1".to_string(), "2".to_string()];
        assert_eq!(
            listing_url("/search/shoes", Some("red shoe"), &price, &facets),
            "/search/shoes?q=red+shoe&sort=price-asc&facets=1%2C2"
        );
    }

    #[test]
    fn test_facet_links_toggle_selection() {
        let sort = SortOption::from_slug(None);
        let facets = vec![FacetWithValues {
            id: "f1".to_string(),
            name: "Brand".to_string(),
            open: true,
            values: vec![
                FacetValueOption {
                    id: "1".to_string(),
                    name: "Acme".to_string(),
                    count: 3,
                    selected: true,
                },
                FacetValueOption {
                    id: "2".to_string(),
                    name: "Globex".to_string(),
                    count: 1,
                    selected: false,
                },
            ],
        }];

        let views = facet_views("/search", None, &sort, &["1".to_string()], facets);
        let urls: Vec<&str> = views
            .iter()
            .flat_map(|f| f.values.iter().map(|v| v.url.as_str()))
            .collect();
        assert_eq!(urls, vec!["/search", "/search?facets=1%2C2"]);
    }
}
