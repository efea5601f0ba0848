//! Integration tests for `VendureClient`.
//!
//! Uses `wiremock` to stand up a local Shop API for each test so no real
//! network traffic is made. Requests are told apart by their GraphQL
//! `operationName`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vendure_storefront::config::VendureConfig;
use vendure_storefront::vendure::{
    FOOTER_MENU, HEADER_MENU, SearchQuery, ShopSession, VendureClient, VendureError,
};
use vendure_storefront_core::{CacheTag, OrderLineId, ProductId, VariantId};

const CHANNEL_TOKEN: &str = "test-channel";

fn test_config(server: &MockServer) -> VendureConfig {
    VendureConfig {
        shop_api_url: format!("{}/shop-api", server.uri()),
        channel_token: CHANNEL_TOKEN.to_string(),
        checkout_url: None,
        revalidation_secret: SecretString::from("kX9#mQ2$vL7@pR4!".to_string()),
        cache_ttl: Duration::from_secs(60),
    }
}

fn test_client(server: &MockServer) -> VendureClient {
    VendureClient::new(&test_config(server))
}

fn operation(name: &str) -> wiremock::matchers::BodyPartialJsonMatcher {
    body_partial_json(json!({ "operationName": name }))
}

fn graphql(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

fn product_json(slug: &str, facet_codes: &[&str]) -> serde_json::Value {
    let facet_values: Vec<serde_json::Value> = facet_codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            json!({
                "id": format!("fv{i}"),
                "code": code,
                "name": code,
                "facet": { "id": "f1", "code": "category", "name": "Category" }
            })
        })
        .collect();

    json!({
        "id": format!("id-{slug}"),
        "slug": slug,
        "name": "Laptop",
        "description": "<p>Fast <b>laptop</b></p>",
        "updatedAt": "2024-01-01T00:00:00.000Z",
        "facetValues": facet_values,
        "optionGroups": [{
            "id": "og1",
            "code": "ram",
            "name": "RAM",
            "options": [
                { "id": "o1", "code": "8gb", "name": "8GB" },
                { "id": "o2", "code": "16gb", "name": "16GB" }
            ]
        }],
        "variants": [
            {
                "id": "v1",
                "name": "Laptop 8GB",
                "sku": "L8",
                "price": 100_000,
                "priceWithTax": 120_000,
                "currencyCode": "USD",
                "stockLevel": "IN_STOCK",
                "options": [{ "id": "o1", "code": "8gb", "name": "8GB",
                              "group": { "id": "og1", "code": "ram", "name": "RAM" } }]
            },
            {
                "id": "v2",
                "name": "Laptop 16GB",
                "sku": "L16",
                "price": 150_000,
                "priceWithTax": 180_000,
                "currencyCode": "USD",
                "stockLevel": "OUT_OF_STOCK",
                "options": [{ "id": "o2", "code": "16gb", "name": "16GB",
                              "group": { "id": "og1", "code": "ram", "name": "RAM" } }]
            }
        ],
        "featuredAsset": null,
        "assets": [{
            "id": "a1",
            "name": "",
            "preview": "https://cdn.example.com/assets/laptop.jpg",
            "width": 800,
            "height": 600
        }],
        "collections": [{ "id": "c1", "slug": "electronics", "name": "Electronics" }]
    })
}

fn order_json(total_quantity: i64) -> serde_json::Value {
    json!({
        "id": "1",
        "code": "ORDER1",
        "active": true,
        "state": "AddingItems",
        "currencyCode": "USD",
        "totalQuantity": total_quantity,
        "subTotal": 100_000,
        "subTotalWithTax": 120_000,
        "total": 100_000,
        "totalWithTax": 120_000,
        "shippingWithTax": 0,
        "taxSummary": [{ "description": "VAT", "taxRate": 20.0, "taxTotal": 20_000 }],
        "lines": [{
            "id": "line1",
            "quantity": total_quantity,
            "unitPriceWithTax": 120_000,
            "linePriceWithTax": 120_000,
            "featuredAsset": null,
            "productVariant": {
                "id": "v1",
                "name": "Laptop 8GB",
                "sku": "L8",
                "price": 100_000,
                "priceWithTax": 120_000,
                "currencyCode": "USD",
                "options": [],
                "product": { "id": "id-laptop", "slug": "laptop", "name": "Laptop", "featuredAsset": null }
            }
        }]
    })
}

fn search_hit(slug: &str, facet_value_ids: &[&str]) -> serde_json::Value {
    json!({
        "productId": format!("id-{slug}"),
        "productVariantId": format!("var-{slug}"),
        "productName": slug,
        "slug": slug,
        "currencyCode": "USD",
        "facetValueIds": facet_value_ids,
        "priceWithTax": { "value": 2_500 }
    })
}

fn facet_count(
    id: &str,
    code: &str,
    name: &str,
    facet: (&str, &str),
    count: i64,
) -> serde_json::Value {
    json!({
        "count": count,
        "facetValue": {
            "id": id,
            "code": code,
            "name": name,
            "facet": { "id": facet.0, "code": facet.1, "name": facet.1 }
        }
    })
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_product_reshapes_shop_api_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("vendure-token", CHANNEL_TOKEN))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": product_json("laptop", &[]) })))
        .expect(1)
        .mount(&server)
        .await;

    let product = test_client(&server)
        .get_product("laptop")
        .await
        .unwrap()
        .expect("product should exist");

    assert_eq!(product.handle, "laptop");
    assert_eq!(product.description, "Fast laptop");
    assert_eq!(product.price_range.min_variant_price.amount, "1200.00");
    assert_eq!(product.price_range.max_variant_price.amount, "1800.00");
    assert!(product.available_for_sale);
    assert!(!product.variants[1].available_for_sale);
    assert_eq!(product.variants[0].selected_options[0].name, "RAM");
    assert_eq!(product.collection_handles, vec!["electronics"]);

    // Falls back to the first asset, with a generated alt text
    let featured = product.featured_image.unwrap();
    assert_eq!(featured.url, "https://cdn.example.com/assets/laptop.jpg");
    assert_eq!(featured.alt_text, "Laptop - laptop");
}

#[tokio::test]
async fn get_product_returns_none_for_unknown_handle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": null })))
        .mount(&server)
        .await;

    let product = test_client(&server).get_product("missing").await.unwrap();
    assert!(product.is_none());
}

#[tokio::test]
async fn get_product_is_cached_until_products_tag_is_revalidated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": product_json("laptop", &[]) })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client.get_product("laptop").await.unwrap();
    client.get_product("laptop").await.unwrap();

    // Unrelated tags leave the entry in place
    client.revalidate_tag(CacheTag::Cart);
    client.get_product("laptop").await.unwrap();

    client.revalidate_tag(CacheTag::Products);
    client.get_product("laptop").await.unwrap();
}

#[tokio::test]
async fn revalidation_during_fetch_is_not_cached_over() {
    let server = MockServer::start().await;

    // The first request is still in flight when the webhook arrives
    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(
            graphql(json!({ "product": product_json("laptop", &[]) }))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let mut renamed = product_json("laptop", &[]);
    renamed["name"] = json!("Laptop Pro");
    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": renamed })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.get_product("laptop").await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.revalidate_tag(CacheTag::Products);

    let stale = in_flight.await.unwrap().unwrap().unwrap();
    assert_eq!(stale.title, "Laptop");

    let fresh = client.get_product("laptop").await.unwrap().unwrap();
    assert_eq!(fresh.title, "Laptop Pro");
}

#[tokio::test]
async fn get_products_leaves_out_hidden_products() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetProducts"))
        .respond_with(graphql(json!({
            "products": {
                "totalItems": 2,
                "items": [
                    product_json("visible", &["electronics"]),
                    product_json("secret", &["nextjs-frontend-hidden"])
                ]
            }
        })))
        .mount(&server)
        .await;

    let products = test_client(&server)
        .get_products(&Default::default())
        .await
        .unwrap();

    let handles: Vec<&str> = products.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, vec!["visible"]);
}

#[tokio::test]
async fn get_product_recommendations_excludes_the_product_itself() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": product_json("laptop", &[]) })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(operation("GetCollectionProducts"))
        .respond_with(graphql(json!({
            "collection": { "id": "c1", "slug": "electronics", "name": "Electronics" },
            "search": {
                "totalItems": 2,
                "items": [
                    {
                        "productId": "id-laptop",
                        "productName": "Laptop",
                        "slug": "laptop",
                        "currencyCode": "USD",
                        "priceWithTax": { "min": 120_000, "max": 180_000 }
                    },
                    {
                        "productId": "id-mouse",
                        "productName": "Mouse",
                        "slug": "mouse",
                        "currencyCode": "USD",
                        "productAsset": { "id": "a2", "preview": "https://cdn.example.com/mouse.jpg" },
                        "priceWithTax": { "value": 2_500 }
                    }
                ]
            }
        })))
        .mount(&server)
        .await;

    let related = test_client(&server)
        .get_product_recommendations(&ProductId::new("id-laptop"))
        .await
        .unwrap();

    assert_eq!(related.len(), 1);
    assert_eq!(related[0].handle, "mouse");
    assert_eq!(related[0].price_range.min_variant_price.amount, "25.00");
}

#[tokio::test]
async fn get_related_products_reuses_the_loaded_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetProduct"))
        .respond_with(graphql(json!({ "product": product_json("laptop", &[]) })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(operation("GetCollectionProducts"))
        .and(body_partial_json(json!({ "variables": { "slug": "electronics" } })))
        .respond_with(graphql(json!({
            "collection": { "id": "c1", "slug": "electronics", "name": "Electronics" },
            "search": {
                "totalItems": 2,
                "items": [search_hit("laptop", &[]), search_hit("mouse", &[])],
                "facetValues": []
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let product = client.get_product("laptop").await.unwrap().unwrap();
    let related = client.get_related_products(&product).await.unwrap();

    let handles: Vec<&str> = related.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, vec!["mouse"]);
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_collections_lists_all_first_and_skips_hidden() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetCollections"))
        .respond_with(graphql(json!({
            "collections": {
                "totalItems": 2,
                "items": [
                    { "id": "c1", "slug": "electronics", "name": "Electronics" },
                    { "id": "c2", "slug": "hidden-homepage-featured-items", "name": "Featured" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let collections = test_client(&server).get_collections().await.unwrap();

    let titles: Vec<&str> = collections.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["All", "Electronics"]);
    assert_eq!(collections[0].path, "/search");
    assert_eq!(collections[1].path, "/search/electronics");
}

#[tokio::test]
async fn get_collection_products_is_empty_for_unknown_collection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetCollectionProducts"))
        .respond_with(graphql(json!({
            "collection": null,
            "search": { "totalItems": 0, "items": [] }
        })))
        .mount(&server)
        .await;

    let products = test_client(&server)
        .get_collection_products("nope", Default::default(), false)
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
async fn get_collection_products_leaves_out_hidden_products() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetCollectionProducts"))
        .respond_with(graphql(json!({
            "collection": { "id": "c1", "slug": "electronics", "name": "Electronics" },
            "search": {
                "totalItems": 2,
                "items": [search_hit("visible", &["fv1"]), search_hit("secret", &["fv1", "fv9"])],
                "facetValues": [
                    facet_count("fv1", "computers", "Computers", ("f1", "category"), 2),
                    facet_count("fv9", "nextjs-frontend-hidden", "Hidden", ("f2", "visibility"), 1)
                ]
            }
        })))
        .mount(&server)
        .await;

    let products = test_client(&server)
        .get_collection_products("electronics", Default::default(), false)
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].handle, "visible");
    assert_eq!(products[0].tags, vec!["computers"]);
    assert_eq!(products[0].variants[0].id, VariantId::new("var-visible"));
}

// ---------------------------------------------------------------------------
// Search & Navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_groups_facets_and_drops_hidden_hits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("Search"))
        .and(body_partial_json(json!({
            "variables": { "input": { "term": "laptop", "facetValueFilters": [{ "and": "fv1" }] } }
        })))
        .respond_with(graphql(json!({
            "search": {
                "totalItems": 3,
                "items": [
                    search_hit("laptop", &["fv1", "fv2"]),
                    search_hit("laptop-sleeve", &["fv1"]),
                    search_hit("prototype", &["fv1", "fv9"])
                ],
                "facetValues": [
                    facet_count("fv1", "computers", "Computers", ("f1", "category"), 3),
                    facet_count("fv2", "acme", "Acme", ("f3", "brand"), 1),
                    facet_count("fv3", "accessories", "Accessories", ("f1", "category"), 1),
                    facet_count("fv9", "nextjs-frontend-hidden", "Hidden", ("f2", "visibility"), 1)
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery {
        term: Some("laptop".to_string()),
        facet_value_ids: vec!["fv1".to_string()],
        ..Default::default()
    };
    let results = test_client(&server).search(&query).await.unwrap();

    let handles: Vec<&str> = results.products.iter().map(|p| p.handle.as_str()).collect();
    assert_eq!(handles, vec!["laptop", "laptop-sleeve"]);
    assert_eq!(results.total, 2);

    let facets: Vec<(&str, usize, bool)> = results
        .facets
        .iter()
        .map(|f| (f.name.as_str(), f.values.len(), f.open))
        .collect();
    assert_eq!(facets, vec![("category", 2, true), ("brand", 1, false)]);
    assert!(results.facets[0].values[0].selected);
}

#[tokio::test]
async fn search_in_collection_is_revalidated_by_collections_tag() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("Search"))
        .respond_with(graphql(json!({
            "search": { "totalItems": 1, "items": [search_hit("laptop", &[])], "facetValues": [] }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let in_collection = SearchQuery {
        collection: Some("electronics".to_string()),
        ..Default::default()
    };
    let everywhere = SearchQuery::default();

    client.search(&in_collection).await.unwrap();
    client.search(&everywhere).await.unwrap();

    client.revalidate_tag(CacheTag::Collections);

    // Refetched
    client.search(&in_collection).await.unwrap();
    // Still cached
    client.search(&everywhere).await.unwrap();
}

#[tokio::test]
async fn get_menu_serves_header_footer_and_unknown_menus() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("GetCollections"))
        .respond_with(graphql(json!({
            "collections": {
                "totalItems": 1,
                "items": [{ "id": "c1", "slug": "electronics", "name": "Electronics" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let header: Vec<(String, String)> = client
        .get_menu(HEADER_MENU)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.title, m.path))
        .collect();
    assert_eq!(
        header,
        vec![
            ("All".to_string(), "/search".to_string()),
            ("Electronics".to_string(), "/search/electronics".to_string()),
        ]
    );

    let footer = client.get_menu(FOOTER_MENU).await.unwrap();
    assert_eq!(footer.len(), 3);
    assert_eq!(footer[0].title, "About Vendure");
    assert!(footer.iter().all(|m| m.path.starts_with("https://")));

    assert!(client.get_menu("sidebar").await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_cart_without_token_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(graphql(json!({ "activeOrder": null })))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = ShopSession::default();
    let cart = test_client(&server).get_cart(&mut session).await.unwrap();
    assert!(cart.is_none());
}

#[tokio::test]
async fn add_to_cart_keeps_issued_token_for_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("AddItemToOrder"))
        .respond_with(
            graphql(json!({ "addItemToOrder": order_json(1) }))
                .insert_header("vendure-auth-token", "session-abc"),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(operation("GetActiveOrder"))
        .and(header("authorization", "Bearer session-abc"))
        .respond_with(graphql(json!({ "activeOrder": order_json(1) })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = ShopSession::default();

    let cart = client
        .create_cart(&mut session, &VariantId::new("v1"), 1)
        .await
        .unwrap();
    assert_eq!(session.auth_token.as_deref(), Some("session-abc"));
    assert_eq!(cart.total_quantity, 1);
    assert_eq!(cart.cost.total_tax_amount.amount, "200.00");
    assert_eq!(cart.checkout_url, "/checkout");
    assert_eq!(cart.lines[0].merchandise.product.handle, "laptop");

    let cart = client.get_cart(&mut session).await.unwrap();
    assert_eq!(cart.map(|c| c.code.to_string()), Some("ORDER1".to_string()));
}

#[tokio::test]
async fn order_error_result_becomes_order_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("AdjustOrderLine"))
        .respond_with(graphql(json!({
            "adjustOrderLine": {
                "errorCode": "INSUFFICIENT_STOCK_ERROR",
                "message": "Only 2 items may be added to the order"
            }
        })))
        .mount(&server)
        .await;

    let mut session = ShopSession::new(Some("session-abc".to_string()));
    let result = test_client(&server)
        .update_cart(&mut session, &OrderLineId::new("line1"), 5)
        .await;

    match result {
        Err(VendureError::Order { code, .. }) => assert_eq!(code, "INSUFFICIENT_STOCK_ERROR"),
        other => panic!("expected order error, got {other:?}"),
    }
}

#[tokio::test]
async fn remove_from_cart_returns_updated_cart() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(operation("RemoveOrderLine"))
        .and(body_partial_json(json!({ "variables": { "lineId": "line1" } })))
        .respond_with(graphql(json!({ "removeOrderLine": order_json(0) })))
        .mount(&server)
        .await;

    let mut session = ShopSession::new(Some("session-abc".to_string()));
    let cart = test_client(&server)
        .remove_from_cart(&mut session, &OrderLineId::new("line1"))
        .await
        .unwrap();

    assert_eq!(cart.total_quantity, 0);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_response_reports_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let result = test_client(&server).get_collections().await;
    assert!(matches!(result, Err(VendureError::RateLimited(7))), "got {result:?}");
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Cannot query field \"foo\"" }]
        })))
        .mount(&server)
        .await;

    let result = test_client(&server).get_product("laptop").await;
    match result {
        Err(VendureError::GraphQL(errors)) => {
            assert_eq!(errors[0].message, "Cannot query field \"foo\"");
        }
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.get_collections().await.is_err());
    assert!(client.get_collections().await.is_err());
}
