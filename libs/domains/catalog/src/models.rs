use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page size for paged product listings
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u64 = 100;

/// Whether a read also resolves the related entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Plain,
    WithRelated,
}

/// Product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Products in this category, present only when eager-loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub products: Option<Vec<Product>>,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub price: f64,
    pub is_active: bool,
    /// Public URL of the uploaded image
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Owning category, present only when eager-loaded.
    /// `Some(None)` serializes as `null`: the category no longer exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion, value_type = Option<Category>)]
    pub category: Option<Option<Category>>,
}

/// Validated category fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryInput {
    #[schema(example = "Footwear", max_length = 255)]
    pub name: String,
    pub is_active: bool,
}

/// Body of a status update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusInput {
    /// `true`/`false`, `1`/`0`, `"1"`/`"0"` or `"true"`/`"false"`
    pub is_active: bool,
}

/// Validated product fields (the image travels separately)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductInput {
    #[schema(example = "Trail Runner", max_length = 255)]
    pub name: String,
    pub category_id: i32,
    #[schema(minimum = 0.0, example = 89.9)]
    pub price: f64,
    pub is_active: bool,
}

/// Multipart form accepted by product create/update
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProductUpload {
    name: String,
    category_id: i32,
    price: f64,
    is_active: bool,
    /// jpeg, png, jpg or gif; at most 2048 KiB
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

/// Filters for the non-paged product listing, ANDed together
#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub category_id: Option<i32>,
    /// Inclusive lower price bound
    pub min_price: Option<f64>,
    /// Inclusive upper price bound
    pub max_price: Option<f64>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if product.category_id != category_id {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        true
    }
}

/// Query parameters selecting the paged product listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct PageParams {
    /// 1-based page number (default 1)
    page: Option<u64>,
    /// Page size, clamped to 1..=100 (default 10)
    limit: Option<u64>,
}

/// A clamped page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let per_page = limit
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u64;
        let page = page.unwrap_or(1).max(1) as u64;
        Self { page, per_page }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            current_page: request.page,
            last_page: total.div_ceil(request.per_page).max(1),
            per_page: request.per_page,
            total,
        }
    }
}

/// Result of `GET /product/get-all`
#[derive(Debug, Clone, PartialEq)]
pub enum ProductListing {
    All(Vec<Product>),
    Paged(Page<Product>),
}
