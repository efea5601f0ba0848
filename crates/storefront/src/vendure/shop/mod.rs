//! Vendure Shop API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for
//! HTTP. Catalog reads are cached in a [`TagCache`]; cart operations go
//! straight to the API with the customer's session token.

mod cache;
pub mod conversions;
pub mod queries;
pub mod raw;

use std::sync::Arc;

use graphql_client::{QueryBody, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use vendure_storefront_core::{CacheTag, OrderLineId, ProductId, VariantId};

use crate::config::VendureConfig;
use crate::vendure::VendureError;
use crate::vendure::types::{
    Cart, Collection, FOOTER_MENU, HEADER_MENU, HIDDEN_COLLECTION_PREFIX, Menu, Product,
    ProductQuery, ProductSort, SearchQuery, SearchResults,
};

pub use cache::{CacheValue, TagCache};
use conversions::{
    all_products_collection, reshape_cart, reshape_collection, reshape_collections,
    reshape_facets, reshape_product, reshape_products, reshape_search_results, search_sort,
};
use queries::{
    ADD_ITEM_TO_ORDER_MUTATION, ADJUST_ORDER_LINE_MUTATION, GET_ACTIVE_ORDER_QUERY,
    GET_COLLECTION_PRODUCTS_QUERY, GET_COLLECTION_QUERY, GET_COLLECTIONS_QUERY,
    GET_PRODUCT_QUERY, GET_PRODUCTS_QUERY, REMOVE_ORDER_LINE_MUTATION, SEARCH_QUERY,
};
use raw::{
    ActiveOrderData, AddItemToOrderData, AddItemVariables, AdjustLineVariables,
    AdjustOrderLineData, CollectionData, CollectionProductsData, CollectionProductsVariables,
    CollectionsData, FacetValueFilterInput, LookupVariables, NoVariables, OrderMutationResult,
    ProductData, ProductFilterParameter, ProductListOptions, ProductSortParameter,
    ProductsData, ProductsVariables, RemoveLineVariables, RemoveOrderLineData, SearchData,
    SearchInput, SearchVariables, SortOrder, StringOperators,
};

/// Response header carrying the session token in bearer mode.
pub const AUTH_TOKEN_HEADER: &str = "vendure-auth-token";

/// Request header selecting the channel.
pub const CHANNEL_TOKEN_HEADER: &str = "vendure-token";

/// Page size for product listings.
const LISTING_PAGE_SIZE: i64 = 100;

/// Maximum number of related products shown on a product page.
const MAX_RECOMMENDATIONS: usize = 4;

// =============================================================================
// Session & Fetch Result
// =============================================================================

/// A customer's Shop API session.
///
/// Vendure identifies the active order by a bearer token it issues on the
/// first order mutation. The token lives in the storefront session and is
/// refreshed from every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopSession {
    pub auth_token: Option<String>,
}

impl ShopSession {
    #[must_use]
    pub const fn new(auth_token: Option<String>) -> Self {
        Self { auth_token }
    }

    /// Record a token issued by the Shop API. Returns `true` if it changed.
    pub fn update(&mut self, auth_token: Option<String>) -> bool {
        match auth_token {
            Some(token) if self.auth_token.as_deref() != Some(token.as_str()) => {
                self.auth_token = Some(token);
                true
            }
            _ => false,
        }
    }
}

/// Decoded response of a single Shop API call.
#[derive(Debug)]
pub struct FetchResult<T> {
    /// HTTP status code.
    pub status: u16,
    /// The GraphQL `data` object.
    pub data: T,
    /// Session token issued with the response, if any.
    pub auth_token: Option<String>,
}

// =============================================================================
// VendureClient
// =============================================================================

/// Client for the Vendure Shop API.
///
/// Provides typed access to products, collections, search, and the active
/// order. Catalog reads are cached and tagged for revalidation.
#[derive(Clone)]
pub struct VendureClient {
    inner: Arc<VendureClientInner>,
}

struct VendureClientInner {
    client: reqwest::Client,
    endpoint: String,
    channel_token: String,
    checkout_url: Option<String>,
    cache: TagCache,
}

impl VendureClient {
    /// Create a new Shop API client.
    #[must_use]
    pub fn new(config: &VendureConfig) -> Self {
        Self {
            inner: Arc::new(VendureClientInner {
                client: reqwest::Client::new(),
                endpoint: config.shop_api_url.clone(),
                channel_token: config.channel_token.clone(),
                checkout_url: config.checkout_url.clone(),
                cache: TagCache::new(config.cache_ttl),
            }),
        }
    }

    /// Send a GraphQL document and decode its `data`.
    ///
    /// The session token, when given, is sent as a bearer token. Any token
    /// the Shop API returns is passed back in the result.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, HTTP 429 (`RateLimited`), any
    /// other non-success status, undecodable bodies, GraphQL errors, or a
    /// response without `data`.
    pub async fn fetch<T, V>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
        auth_token: Option<&str>,
    ) -> Result<FetchResult<T>, VendureError>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let request_body = QueryBody {
            variables,
            query,
            operation_name,
        };

        let mut request = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(CHANNEL_TOKEN_HEADER, &self.inner.channel_token)
            .header("Content-Type", "application/json")
            .json(&request_body);

        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(VendureError::RateLimited(retry_after));
        }

        let issued_token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                operation = operation_name,
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shop API returned non-success status"
            );
            return Err(VendureError::message(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let response: Response<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    operation = operation_name,
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shop API response"
                );
                return Err(VendureError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(operation = operation_name, errors = ?errors, "GraphQL errors in response");
            return Err(VendureError::GraphQL(
                errors.into_iter().map(Into::into).collect(),
            ));
        }

        let data = response.data.ok_or_else(|| {
            tracing::error!(
                operation = operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shop API response has no data and no errors"
            );
            VendureError::message("No data in response")
        })?;

        Ok(FetchResult {
            status: status.as_u16(),
            data,
            auth_token: issued_token,
        })
    }

    /// Fetch without a session. Used by the cached catalog reads.
    async fn execute<T, V>(
        &self,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<T, VendureError>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        Ok(self.fetch(operation_name, query, variables, None).await?.data)
    }

    /// Fetch on behalf of a customer, keeping their session token current.
    async fn execute_for_session<T, V>(
        &self,
        session: &mut ShopSession,
        operation_name: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<T, VendureError>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        let result = self
            .fetch(operation_name, query, variables, session.auth_token.as_deref())
            .await?;

        if session.update(result.auth_token) {
            debug!(operation = operation_name, "Shop API issued a new session token");
        }

        Ok(result.data)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle.
    ///
    /// Hidden products are returned too; they stay reachable by direct link.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product(&self, handle: &str) -> Result<Option<Product>, VendureError> {
        self.lookup_product(LookupVariables {
            slug: Some(handle.to_string()),
            id: None,
        })
        .await
    }

    async fn lookup_product(
        &self,
        variables: LookupVariables,
    ) -> Result<Option<Product>, VendureError> {
        let cache_key = TagCache::key("GetProduct", &variables);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            return Ok(product.map(|p| *p));
        }

        let fetched_at = self.inner.cache.generation();
        let data: ProductData = self
            .execute("GetProduct", GET_PRODUCT_QUERY, variables)
            .await?;

        let product = data.product.and_then(|p| reshape_product(p, false));

        self.inner
            .cache
            .insert(
                cache_key,
                &[CacheTag::Products],
                fetched_at,
                CacheValue::Product(product.clone().map(Box::new)),
            )
            .await;

        Ok(product)
    }

    /// List products, optionally filtered by name.
    ///
    /// Hidden products are left out. The Shop API cannot sort products by
    /// price, so price ordering uses each product's lowest variant price.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>, VendureError> {
        let cache_key = TagCache::key("GetProducts", query);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            return Ok(products);
        }

        let order = SortOrder::from_reverse(query.reverse);
        let sort = match query.sort {
            ProductSort::Title => Some(ProductSortParameter {
                name: Some(order),
                created_at: None,
            }),
            ProductSort::CreatedAt => Some(ProductSortParameter {
                name: None,
                created_at: Some(order),
            }),
            ProductSort::Relevance | ProductSort::Price => None,
        };

        let filter = query
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| ProductFilterParameter {
                name: StringOperators {
                    contains: q.to_string(),
                },
            });

        let variables = ProductsVariables {
            options: ProductListOptions {
                take: Some(LISTING_PAGE_SIZE),
                filter,
                sort,
            },
        };

        let fetched_at = self.inner.cache.generation();
        let data: ProductsData = self
            .execute("GetProducts", GET_PRODUCTS_QUERY, variables)
            .await?;

        let mut products = reshape_products(data.products.items);

        if query.sort == ProductSort::Price {
            products.sort_by_key(|p| p.price_range.min_variant_price.decimal());
            if query.reverse {
                products.reverse();
            }
        }

        self.inner
            .cache
            .insert(
                cache_key,
                &[CacheTag::Products],
                fetched_at,
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    /// Products related to a product, looked up by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if an API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_recommendations(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Product>, VendureError> {
        let product = self
            .lookup_product(LookupVariables {
                slug: None,
                id: Some(product_id.to_string()),
            })
            .await?;

        match product {
            Some(product) => self.get_related_products(&product).await,
            None => Ok(vec![]),
        }
    }

    /// Products related to an already loaded product.
    ///
    /// Related products share the product's first collection. The product
    /// itself and hidden products are excluded, and at most four are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(handle = %product.handle))]
    pub async fn get_related_products(
        &self,
        product: &Product,
    ) -> Result<Vec<Product>, VendureError> {
        let Some(collection) = product.collection_handles.first() else {
            return Ok(vec![]);
        };

        let products = self
            .get_collection_products(collection, ProductSort::Relevance, false)
            .await?;

        Ok(products
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(MAX_RECOMMENDATIONS)
            .collect())
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection(&self, handle: &str) -> Result<Option<Collection>, VendureError> {
        let variables = LookupVariables {
            slug: Some(handle.to_string()),
            id: None,
        };
        let cache_key = TagCache::key("GetCollection", &variables);

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            return Ok(collection.map(|c| *c));
        }

        let fetched_at = self.inner.cache.generation();
        let data: CollectionData = self
            .execute("GetCollection", GET_COLLECTION_QUERY, variables)
            .await?;

        let collection = data.collection.map(reshape_collection);

        self.inner
            .cache
            .insert(
                cache_key,
                &[CacheTag::Collections],
                fetched_at,
                CacheValue::Collection(collection.clone().map(Box::new)),
            )
            .await;

        Ok(collection)
    }

    /// List collections for navigation.
    ///
    /// A synthetic "All" collection comes first. Collections whose handle
    /// starts with `hidden` are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(&self) -> Result<Vec<Collection>, VendureError> {
        let cache_key = TagCache::key("GetCollections", &NoVariables {});

        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            return Ok(collections);
        }

        let fetched_at = self.inner.cache.generation();
        let data: CollectionsData = self
            .execute("GetCollections", GET_COLLECTIONS_QUERY, NoVariables {})
            .await?;

        let collections: Vec<Collection> = std::iter::once(all_products_collection())
            .chain(
                reshape_collections(data.collections.items)
                    .into_iter()
                    .filter(|c| !c.handle.starts_with(HIDDEN_COLLECTION_PREFIX)),
            )
            .collect();

        self.inner
            .cache
            .insert(
                cache_key,
                &[CacheTag::Collections],
                fetched_at,
                CacheValue::Collections(collections.clone()),
            )
            .await;

        Ok(collections)
    }

    /// Products in a collection.
    ///
    /// Returns an empty list when the collection does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_collection_products(
        &self,
        handle: &str,
        sort: ProductSort,
        reverse: bool,
    ) -> Result<Vec<Product>, VendureError> {
        let variables = CollectionProductsVariables {
            slug: handle.to_string(),
            skip: 0,
            take: LISTING_PAGE_SIZE,
            sort: search_sort(sort, reverse),
        };
        let cache_key = TagCache::key("GetCollectionProducts", &variables);

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            return Ok(products);
        }

        let fetched_at = self.inner.cache.generation();
        let data: CollectionProductsData = self
            .execute(
                "GetCollectionProducts",
                GET_COLLECTION_PRODUCTS_QUERY,
                variables,
            )
            .await?;

        let products = if data.collection.is_some() {
            reshape_search_results(data.search.items, &data.search.facet_values)
        } else {
            info!("No collection found for `{handle}`");
            vec![]
        };

        self.inner
            .cache
            .insert(
                cache_key,
                &[CacheTag::Collections, CacheTag::Products],
                fetched_at,
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    // =========================================================================
    // Search & Navigation
    // =========================================================================

    /// Faceted product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, VendureError> {
        let cache_key = TagCache::key("Search", query);

        if let Some(CacheValue::Search(results)) = self.inner.cache.get(&cache_key).await {
            return Ok(*results);
        }

        let variables = SearchVariables {
            input: SearchInput {
                term: query.term.clone().filter(|t| !t.trim().is_empty()),
                collection_slug: query.collection.clone().filter(|c| !c.is_empty()),
                facet_value_filters: query
                    .facet_value_ids
                    .iter()
                    .map(|id| FacetValueFilterInput { and: id.clone() })
                    .collect(),
                group_by_product: true,
                take: Some(LISTING_PAGE_SIZE),
                sort: search_sort(query.sort, query.reverse),
            },
        };

        let fetched_at = self.inner.cache.generation();
        let data: SearchData = self.execute("Search", SEARCH_QUERY, variables).await?;

        let hits = data.search.items.len();
        let products = reshape_search_results(data.search.items, &data.search.facet_values);
        let hidden = i64::try_from(hits.saturating_sub(products.len())).unwrap_or_default();

        let results = SearchResults {
            total: (data.search.total_items - hidden).max(0),
            facets: reshape_facets(data.search.facet_values, &query.facet_value_ids),
            products,
        };

        let tags: &[CacheTag] = if query.collection.is_some() {
            &[CacheTag::Collections, CacheTag::Products]
        } else {
            &[CacheTag::Products]
        };

        self.inner
            .cache
            .insert(
                cache_key,
                tags,
                fetched_at,
                CacheValue::Search(Box::new(results.clone())),
            )
            .await;

        Ok(results)
    }

    /// Navigation menu entries.
    ///
    /// The header menu lists the collections, the footer links to Vendure.
    /// Unknown menus are empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be loaded.
    #[instrument(skip(self))]
    pub async fn get_menu(&self, handle: &str) -> Result<Vec<Menu>, VendureError> {
        match handle {
            HEADER_MENU => Ok(self
                .get_collections()
                .await?
                .into_iter()
                .map(|c| Menu {
                    title: c.title,
                    path: c.path,
                })
                .collect()),
            FOOTER_MENU => Ok([
                ("About Vendure", "https://www.vendure.io/"),
                ("Vendure Docs", "https://docs.vendure.io/"),
                ("Vendure Blog", "https://www.vendure.io/blog"),
            ]
            .into_iter()
            .map(|(title, path)| Menu {
                title: title.to_string(),
                path: path.to_string(),
            })
            .collect()),
            _ => Ok(vec![]),
        }
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get the customer's active order.
    ///
    /// Returns `None` without a request when the session has no token yet,
    /// and when the Shop API has no active order (e.g., after checkout).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn get_cart(&self, session: &mut ShopSession) -> Result<Option<Cart>, VendureError> {
        if session.auth_token.is_none() {
            return Ok(None);
        }

        let data: ActiveOrderData = self
            .execute_for_session(session, "GetActiveOrder", GET_ACTIVE_ORDER_QUERY, NoVariables {})
            .await?;

        Ok(data
            .active_order
            .map(|order| reshape_cart(order, self.inner.checkout_url.as_deref())))
    }

    /// Add a variant to the active order.
    ///
    /// # Errors
    ///
    /// Returns `VendureError::Order` if Vendure rejects the change (e.g.,
    /// insufficient stock), or an error if the API request fails.
    #[instrument(skip(self, session), fields(variant_id = %variant_id))]
    pub async fn add_to_cart(
        &self,
        session: &mut ShopSession,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<Cart, VendureError> {
        let variables = AddItemVariables {
            variant_id: variant_id.to_string(),
            quantity,
        };

        let data: AddItemToOrderData = self
            .execute_for_session(session, "AddItemToOrder", ADD_ITEM_TO_ORDER_MUTATION, variables)
            .await?;

        self.order_result(data.add_item_to_order)
    }

    /// Start a cart with its first item.
    ///
    /// Vendure creates the active order on the first `addItemToOrder` of a
    /// session, so this is the same mutation as [`Self::add_to_cart`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_to_cart`].
    pub async fn create_cart(
        &self,
        session: &mut ShopSession,
        variant_id: &VariantId,
        quantity: i64,
    ) -> Result<Cart, VendureError> {
        debug!("Creating active order");
        self.add_to_cart(session, variant_id, quantity).await
    }

    /// Change the quantity of an order line.
    ///
    /// # Errors
    ///
    /// Returns `VendureError::Order` if Vendure rejects the change, or an
    /// error if the API request fails.
    #[instrument(skip(self, session), fields(line_id = %line_id))]
    pub async fn update_cart(
        &self,
        session: &mut ShopSession,
        line_id: &OrderLineId,
        quantity: i64,
    ) -> Result<Cart, VendureError> {
        let variables = AdjustLineVariables {
            line_id: line_id.to_string(),
            quantity,
        };

        let data: AdjustOrderLineData = self
            .execute_for_session(session, "AdjustOrderLine", ADJUST_ORDER_LINE_MUTATION, variables)
            .await?;

        self.order_result(data.adjust_order_line)
    }

    /// Remove an order line.
    ///
    /// # Errors
    ///
    /// Returns `VendureError::Order` if Vendure rejects the change, or an
    /// error if the API request fails.
    #[instrument(skip(self, session), fields(line_id = %line_id))]
    pub async fn remove_from_cart(
        &self,
        session: &mut ShopSession,
        line_id: &OrderLineId,
    ) -> Result<Cart, VendureError> {
        let variables = RemoveLineVariables {
            line_id: line_id.to_string(),
        };

        let data: RemoveOrderLineData = self
            .execute_for_session(session, "RemoveOrderLine", REMOVE_ORDER_LINE_MUTATION, variables)
            .await?;

        self.order_result(data.remove_order_line)
    }

    fn order_result(&self, result: OrderMutationResult) -> Result<Cart, VendureError> {
        match result {
            OrderMutationResult::Order(order) => {
                Ok(reshape_cart(*order, self.inner.checkout_url.as_deref()))
            }
            OrderMutationResult::Error(e) => Err(VendureError::Order {
                code: e.error_code,
                message: e.message,
            }),
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Drop every cached response carrying `tag`.
    pub fn revalidate_tag(&self, tag: CacheTag) {
        info!(tag = %tag, "Revalidating cache tag");
        self.inner.cache.revalidate_tag(tag);
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all().await;
    }

    /// Check that the Shop API answers queries. Never cached.
    ///
    /// # Errors
    ///
    /// Returns the error of the probe request.
    pub async fn ping(&self) -> Result<(), VendureError> {
        let _: CollectionsData = self
            .execute("GetCollections", GET_COLLECTIONS_QUERY, NoVariables {})
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_update() {
        let mut session = ShopSession::default();
        assert!(!session.update(None));
        assert!(session.update(Some("abc".to_string())));
        assert!(!session.update(Some("abc".to_string())));
        assert!(session.update(Some("def".to_string())));
        assert!(!session.update(None));
        assert_eq!(session.auth_token.as_deref(), Some("def"));
    }
}
