//! Catalog Domain
//!
//! Product categories and the products filed under them, exposed over a
//! form-friendly JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, response envelopes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌────────────┐
//! │   Service   │────▶│ ImageStore │  ← uploaded product images
//! └──────┬──────┘     └────────────┘
//!        │  validation
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory / Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Category, Product, filters, pages
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     CategoryService, InMemoryCatalog, LocalImageStore, ProductService, UploadConfig, handlers,
//! };
//!
//! let catalog = InMemoryCatalog::new();
//! let categories = CategoryService::new(catalog.category_repository());
//! let products = ProductService::new(
//!     catalog.product_repository(),
//!     LocalImageStore::new(UploadConfig::default()),
//! );
//!
//! // Nest under /api
//! let router = handlers::router(categories, products);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    Category, CategoryInput, Fetch, Page, PageRequest, Product, ProductFilter, ProductInput,
    ProductListing,
};
pub use postgres::{PgCategoryRepository, PgProductRepository};
pub use repository::{
    CategoryRepository, InMemoryCatalog, InMemoryCategoryRepository, InMemoryProductRepository,
    ProductRepository,
};
pub use service::{CategoryService, ProductService};
pub use storage::{ImageStore, LocalImageStore, UPLOADS_ROUTE, UploadConfig};
