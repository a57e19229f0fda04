//! HTTP handlers and response envelopes.
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | /product-category/create | [`category`] |
//! | GET | /product-category/get-all | |
//! | GET | /product-category/get-one/{id} | |
//! | PUT | /product-category/update/{id} | |
//! | PATCH | /product-category/soft-delete/{id} | |
//! | DELETE | /product-category/delete/{id} | |
//! | POST | /product/create | [`product`] |
//! | GET | /product/get-all | |
//! | GET | /product/get-one/{id} | |
//! | PUT | /product/update/{id} | |
//! | PATCH | /product/soft-delete/{id} | |
//! | DELETE | /product/delete/{id} | |

pub mod category;
pub mod product;

use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::models::{Category, Page, Product};
use crate::repository::{CategoryRepository, ProductRepository};
use crate::service::{CategoryService, ProductService};
use crate::storage::ImageStore;

/// OpenAPI documentation for the catalog routes
#[derive(OpenApi)]
#[openapi(nest(
    (path = "/product-category", api = category::ApiDoc),
    (path = "/product", api = product::ApiDoc)
))]
pub struct ApiDoc;

/// Category and product routes, to be nested under `/api`.
pub fn router<C, P, S>(categories: CategoryService<C>, products: ProductService<P, S>) -> Router
where
    C: CategoryRepository + 'static,
    P: ProductRepository + 'static,
    S: ImageStore + 'static,
{
    Router::new()
        .nest("/product-category", category::router(categories))
        .nest("/product", product::router(products))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub success: bool,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CategoryResponse {
    pub fn new(category: Category, message: Option<&str>) -> Self {
        Self {
            success: true,
            category,
            message: message.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductResponse {
    pub fn new(product: Product, message: Option<&str>) -> Self {
        Self {
            success: true,
            product,
            message: message.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductPageResponse {
    pub success: bool,
    pub products: Page<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    #[schema(example = "Category deleted successfully!")]
    pub message: String,
}

impl DeletedResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}
