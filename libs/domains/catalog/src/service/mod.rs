//! Business logic: validation, existence checks, orchestration.
//!
//! Update-class operations validate first (422), then check existence (404),
//! then mutate.

mod category;
mod product;

pub use category::CategoryService;
pub use product::ProductService;
