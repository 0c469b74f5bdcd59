pub(super) const CATEGORIES: &str = r"
  query GetCategories {
    categoryList(filters: {}) {
      id
      name
      product_count
    }
  }
";

pub(super) const PRODUCTS_BY_CATEGORY: &str = r"
  query GetProductsByCategory($catId: String!, $pageSize: Int!, $currentPage: Int!) {
    products(
      filter: { category_id: { eq: $catId } }
      pageSize: $pageSize
      currentPage: $currentPage
    ) {
      total_count
      page_info {
        current_page
        total_pages
      }
      items {
        sku
        name
        is_salable
        url_key
        url_suffix
        small_image { url }
        image { url }
        price_range {
          minimum_price {
            regular_price { value currency }
            final_price { value currency }
          }
        }
        categories {
          name
          url_path
          level
        }
        ... on PhysicalProductInterface {
          weight
        }
      }
    }
  }
";
