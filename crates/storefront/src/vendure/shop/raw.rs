//! Raw Shop API shapes.
//!
//! Response types mirror the fields selected in [`super::queries`] and are
//! decoded straight from the GraphQL `data` object. Variable types are what
//! each document declares. Nothing here is exposed to templates; see
//! [`crate::vendure::types`] for the view model.

use serde::{Deserialize, Serialize};

// =============================================================================
// Shared
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureAsset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub preview: String,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

/// Facet summary as selected under a facet value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureFacet {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureFacetValue {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
    pub facet: VendureFacet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOptionGroupSummary {
    pub id: String,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOption {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Only selected on variant options.
    #[serde(default)]
    pub group: Option<VendureOptionGroupSummary>,
}

/// Paginated list wrapper (`ProductList`, `CollectionList`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemList<T> {
    #[serde(default)]
    pub total_items: i64,
    pub items: Vec<T>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOptionGroup {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub options: Vec<VendureOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureVariant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: i64,
    pub price_with_tax: i64,
    pub currency_code: String,
    /// `IN_STOCK`, `LOW_STOCK` or `OUT_OF_STOCK`.
    #[serde(default)]
    pub stock_level: Option<String>,
    #[serde(default)]
    pub options: Vec<VendureOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureCollectionRef {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureProduct {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub facet_values: Vec<VendureFacetValue>,
    #[serde(default)]
    pub option_groups: Vec<VendureOptionGroup>,
    #[serde(default)]
    pub variants: Vec<VendureVariant>,
    #[serde(default)]
    pub featured_asset: Option<VendureAsset>,
    #[serde(default)]
    pub assets: Vec<VendureAsset>,
    #[serde(default)]
    pub collections: Vec<VendureCollectionRef>,
}

// =============================================================================
// Search
// =============================================================================

/// `SearchResultPrice` union.
///
/// `PriceRange` is listed first: an untagged enum takes the first variant
/// that decodes, and a range object never has a `value` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchPrice {
    Range { min: i64, max: i64 },
    Single { value: i64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureSearchAsset {
    pub id: String,
    pub preview: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureSearchResult {
    pub product_id: String,
    #[serde(default)]
    pub product_variant_id: Option<String>,
    pub product_name: String,
    pub slug: String,
    #[serde(default)]
    pub facet_value_ids: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub currency_code: String,
    #[serde(default)]
    pub product_asset: Option<VendureSearchAsset>,
    pub price_with_tax: SearchPrice,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureFacetValueResult {
    pub count: i64,
    pub facet_value: VendureFacetValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureSearchResponse {
    #[serde(default)]
    pub total_items: i64,
    pub items: Vec<VendureSearchResult>,
    #[serde(default)]
    pub facet_values: Vec<VendureFacetValueResult>,
}

// =============================================================================
// Collections
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureCollection {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub featured_asset: Option<VendureAsset>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureTaxSummary {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tax_rate: f64,
    pub tax_total: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOrderProduct {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub featured_asset: Option<VendureAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOrderVariant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: i64,
    pub price_with_tax: i64,
    pub currency_code: String,
    #[serde(default)]
    pub options: Vec<VendureOption>,
    pub product: VendureOrderProduct,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOrderLine {
    pub id: String,
    pub quantity: i64,
    pub unit_price_with_tax: i64,
    pub line_price_with_tax: i64,
    #[serde(default)]
    pub featured_asset: Option<VendureAsset>,
    pub product_variant: VendureOrderVariant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureOrder {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub state: String,
    pub currency_code: String,
    pub total_quantity: i64,
    pub sub_total: i64,
    pub sub_total_with_tax: i64,
    pub total: i64,
    pub total_with_tax: i64,
    #[serde(default)]
    pub shipping_with_tax: i64,
    #[serde(default)]
    pub tax_summary: Vec<VendureTaxSummary>,
    #[serde(default)]
    pub lines: Vec<VendureOrderLine>,
}

/// An `ErrorResult` member of an order mutation union.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendureErrorResult {
    pub error_code: String,
    pub message: String,
}

/// Result of `addItemToOrder`, `adjustOrderLine` and `removeOrderLine`.
///
/// The error shape is tried first since an order never carries `errorCode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderMutationResult {
    Error(VendureErrorResult),
    Order(Box<VendureOrder>),
}

// =============================================================================
// Response Data
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub product: Option<VendureProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ItemList<VendureProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: VendureSearchResponse,
}

#[derive(Debug, Deserialize)]
pub struct CollectionData {
    pub collection: Option<VendureCollection>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsData {
    pub collections: ItemList<VendureCollection>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionProductsData {
    pub collection: Option<VendureCollection>,
    pub search: VendureSearchResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrderData {
    pub active_order: Option<VendureOrder>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemToOrderData {
    pub add_item_to_order: OrderMutationResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustOrderLineData {
    pub adjust_order_line: OrderMutationResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveOrderLineData {
    pub remove_order_line: OrderMutationResult,
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Desc } else { Self::Asc }
    }
}

/// Variables for queries that look an entity up by slug or ID.
#[derive(Debug, Default, Serialize)]
pub struct LookupVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StringOperators {
    pub contains: String,
}

#[derive(Debug, Serialize)]
pub struct ProductFilterParameter {
    pub name: StringOperators,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSortParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<SortOrder>,
}

#[derive(Debug, Default, Serialize)]
pub struct ProductListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ProductFilterParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<ProductSortParameter>,
}

#[derive(Debug, Serialize)]
pub struct ProductsVariables {
    pub options: ProductListOptions,
}

/// `SearchResultSortParameter`. The Shop API sorts search results by name or
/// price only.
#[derive(Debug, Default, Serialize)]
pub struct SearchSortParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<SortOrder>,
}

#[derive(Debug, Serialize)]
pub struct FacetValueFilterInput {
    pub and: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_slug: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facet_value_filters: Vec<FacetValueFilterInput>,
    pub group_by_product: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSortParameter>,
}

#[derive(Debug, Serialize)]
pub struct SearchVariables {
    pub input: SearchInput,
}

#[derive(Debug, Serialize)]
pub struct CollectionProductsVariables {
    pub slug: String,
    pub skip: i64,
    pub take: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSortParameter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemVariables {
    pub variant_id: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustLineVariables {
    pub line_id: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineVariables {
    pub line_id: String,
}

/// Variables for documents that declare none.
#[derive(Debug, Serialize)]
pub struct NoVariables {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_price_decodes_both_union_members() {
        let single: SearchPrice = serde_json::from_value(json!({"value": 1299})).unwrap();
        assert!(matches!(single, SearchPrice::Single { value: 1299 }));

        let range: SearchPrice =
            serde_json::from_value(json!({"min": 1000, "max": 2500})).unwrap();
        assert!(matches!(range, SearchPrice::Range { min: 1000, max: 2500 }));
    }

    #[test]
    fn test_order_mutation_result_error_member() {
        let result: OrderMutationResult = serde_json::from_value(json!({
            "errorCode": "INSUFFICIENT_STOCK_ERROR",
            "message": "Only 2 items may be added to the order due to insufficient stock"
        }))
        .unwrap();

        match result {
            OrderMutationResult::Error(e) => assert_eq!(e.error_code, "INSUFFICIENT_STOCK_ERROR"),
            OrderMutationResult::Order(_) => panic!("expected an error result"),
        }
    }

    #[test]
    fn test_order_mutation_result_order_member() {
        let result: OrderMutationResult = serde_json::from_value(json!({
            "id": "1",
            "code": "ABC123",
            "state": "AddingItems",
            "currencyCode": "USD",
            "totalQuantity": 0,
            "subTotal": 0,
            "subTotalWithTax": 0,
            "total": 0,
            "totalWithTax": 0,
            "lines": []
        }))
        .unwrap();

        assert!(matches!(result, OrderMutationResult::Order(order) if order.code == "ABC123"));
    }

    #[test]
    fn test_search_input_omits_empty_fields() {
        let input = SearchInput {
            term: Some("shoe".to_string()),
            group_by_product: true,
            ..SearchInput::default()
        };
        assert_eq!(
            serde_json::to_value(input).unwrap(),
            json!({"term": "shoe", "groupByProduct": true})
        );
    }

    #[test]
    fn test_cart_variables_are_camel_case() {
        let vars = AddItemVariables {
            variant_id: "42".to_string(),
            quantity: 2,
        };
        assert_eq!(
            serde_json::to_value(vars).unwrap(),
            json!({"variantId": "42", "quantity": 2})
        );
    }
}
