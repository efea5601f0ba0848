//! GraphQL documents for the Vendure Shop API.
//!
//! Fragments are macros so documents can be assembled with `concat!` at
//! compile time. Every document includes exactly the fragments it spreads;
//! the Shop API rejects documents with unused fragments.

macro_rules! asset_fragment {
    () => {
        r"
fragment AssetFields on Asset {
  id
  name
  preview
  width
  height
}
"
    };
}

macro_rules! product_fragment {
    () => {
        r"
fragment ProductFields on Product {
  id
  slug
  name
  description
  updatedAt
  facetValues {
    id
    code
    name
    facet {
      id
      code
      name
    }
  }
  optionGroups {
    id
    code
    name
    options {
      id
      code
      name
    }
  }
  variants {
    id
    name
    sku
    price
    priceWithTax
    currencyCode
    stockLevel
    options {
      id
      code
      name
      group {
        id
        code
        name
      }
    }
  }
  featuredAsset {
    ...AssetFields
  }
  assets {
    ...AssetFields
  }
  collections {
    id
    slug
    name
  }
}
"
    };
}

macro_rules! collection_fragment {
    () => {
        r"
fragment CollectionFields on Collection {
  id
  slug
  name
  description
  updatedAt
  featuredAsset {
    ...AssetFields
  }
}
"
    };
}

macro_rules! search_result_fragment {
    () => {
        r"
fragment SearchResultFields on SearchResult {
  productId
  productVariantId
  productName
  slug
  facetValueIds
  description
  currencyCode
  productAsset {
    id
    preview
  }
  priceWithTax {
    ... on PriceRange {
      min
      max
    }
    ... on SinglePrice {
      value
    }
  }
}
"
    };
}

macro_rules! cart_fragment {
    () => {
        r"
fragment CartFields on Order {
  id
  code
  active
  createdAt
  updatedAt
  state
  currencyCode
  totalQuantity
  subTotal
  subTotalWithTax
  total
  totalWithTax
  shippingWithTax
  taxSummary {
    description
    taxRate
    taxTotal
  }
  lines {
    id
    quantity
    unitPriceWithTax
    linePriceWithTax
    featuredAsset {
      ...AssetFields
    }
    productVariant {
      id
      name
      sku
      price
      priceWithTax
      currencyCode
      options {
        id
        code
        name
        group {
          id
          code
          name
        }
      }
      product {
        id
        slug
        name
        featuredAsset {
          ...AssetFields
        }
      }
    }
  }
}
"
    };
}

// =============================================================================
// Products
// =============================================================================

pub const GET_PRODUCT_QUERY: &str = concat!(
    r"
query GetProduct($slug: String, $id: ID) {
  product(slug: $slug, id: $id) {
    ...ProductFields
  }
}
",
    product_fragment!(),
    asset_fragment!()
);

pub const GET_PRODUCTS_QUERY: &str = concat!(
    r"
query GetProducts($options: ProductListOptions) {
  products(options: $options) {
    totalItems
    items {
      ...ProductFields
    }
  }
}
",
    product_fragment!(),
    asset_fragment!()
);

pub const SEARCH_QUERY: &str = concat!(
    r"
query Search($input: SearchInput!) {
  search(input: $input) {
    totalItems
    items {
      ...SearchResultFields
    }
    facetValues {
      count
      facetValue {
        id
        code
        name
        facet {
          id
          code
          name
        }
      }
    }
  }
}
",
    search_result_fragment!()
);

// =============================================================================
// Collections
// =============================================================================

pub const GET_COLLECTION_QUERY: &str = concat!(
    r"
query GetCollection($slug: String, $id: ID) {
  collection(slug: $slug, id: $id) {
    ...CollectionFields
  }
}
",
    collection_fragment!(),
    asset_fragment!()
);

pub const GET_COLLECTIONS_QUERY: &str = concat!(
    r"
query GetCollections {
  collections {
    items {
      ...CollectionFields
    }
  }
}
",
    collection_fragment!(),
    asset_fragment!()
);

pub const GET_COLLECTION_PRODUCTS_QUERY: &str = concat!(
    r"
query GetCollectionProducts($slug: String, $skip: Int, $take: Int, $sort: SearchResultSortParameter) {
  collection(slug: $slug) {
    ...CollectionFields
  }
  search(
    input: {
      collectionSlug: $slug
      groupByProduct: true
      skip: $skip
      take: $take
      sort: $sort
    }
  ) {
    totalItems
    items {
      ...SearchResultFields
    }
    facetValues {
      count
      facetValue {
        id
        code
        name
        facet {
          id
          code
          name
        }
      }
    }
  }
}
",
    collection_fragment!(),
    asset_fragment!(),
    search_result_fragment!()
);

// =============================================================================
// Cart (active order)
// =============================================================================

pub const GET_ACTIVE_ORDER_QUERY: &str = concat!(
    r"
query GetActiveOrder {
  activeOrder {
    ...CartFields
  }
}
",
    cart_fragment!(),
    asset_fragment!()
);

pub const ADD_ITEM_TO_ORDER_MUTATION: &str = concat!(
    r"
mutation AddItemToOrder($variantId: ID!, $quantity: Int!) {
  addItemToOrder(productVariantId: $variantId, quantity: $quantity) {
    ...CartFields
    ... on ErrorResult {
      errorCode
      message
    }
  }
}
",
    cart_fragment!(),
    asset_fragment!()
);

pub const ADJUST_ORDER_LINE_MUTATION: &str = concat!(
    r"
mutation AdjustOrderLine($lineId: ID!, $quantity: Int!) {
  adjustOrderLine(orderLineId: $lineId, quantity: $quantity) {
    ...CartFields
    ... on ErrorResult {
      errorCode
      message
    }
  }
}
",
    cart_fragment!(),
    asset_fragment!()
);

pub const REMOVE_ORDER_LINE_MUTATION: &str = concat!(
    r"
mutation RemoveOrderLine($lineId: ID!) {
  removeOrderLine(orderLineId: $lineId) {
    ...CartFields
    ... on ErrorResult {
      errorCode
      message
    }
  }
}
",
    cart_fragment!(),
    asset_fragment!()
);

#[cfg(test)]
mod tests {
    use super::*;

    /// Names of fragments defined in a document.
    fn defined_fragments(document: &str) -> Vec<&str> {
        document
            .lines()
            .filter_map(|line| line.trim().strip_prefix("fragment "))
            .filter_map(|rest| rest.split_whitespace().next())
            .collect()
    }

    /// Names of fragments spread in a document.
    fn spread_fragments(document: &str) -> Vec<&str> {
        let mut names: Vec<&str> = document
            .lines()
            .filter_map(|line| line.trim().strip_prefix("..."))
            .filter(|rest| !rest.starts_with(" on"))
            .map(str::trim)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    #[test]
    fn test_every_document_defines_exactly_the_fragments_it_spreads() {
        for document in [
            GET_PRODUCT_QUERY,
            GET_PRODUCTS_QUERY,
            SEARCH_QUERY,
            GET_COLLECTION_QUERY,
            GET_COLLECTIONS_QUERY,
            GET_COLLECTION_PRODUCTS_QUERY,
            GET_ACTIVE_ORDER_QUERY,
            ADD_ITEM_TO_ORDER_MUTATION,
            ADJUST_ORDER_LINE_MUTATION,
            REMOVE_ORDER_LINE_MUTATION,
        ] {
            let mut defined = defined_fragments(document);
            defined.sort_unstable();
            assert_eq!(defined, spread_fragments(document), "in document:\n{document}");
        }
    }

    #[test]
    fn test_operation_names_match_documents() {
        assert!(GET_PRODUCT_QUERY.contains("query GetProduct("));
        assert!(GET_ACTIVE_ORDER_QUERY.contains("query GetActiveOrder "));
        assert!(ADD_ITEM_TO_ORDER_MUTATION.contains("mutation AddItemToOrder("));
    }

    #[test]
    fn test_listing_queries_select_facet_codes() {
        for document in [SEARCH_QUERY, GET_COLLECTION_PRODUCTS_QUERY] {
            assert!(document.contains("facetValueIds"));
            assert!(document.contains("productVariantId"));
            let facet_values = document
                .split("facetValues {")
                .nth(1)
                .unwrap_or_default();
            assert!(facet_values.contains("code"), "in document:\n{document}");
        }
    }
}
