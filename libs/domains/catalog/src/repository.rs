use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CategoryInput, Fetch, Page, PageRequest, Product, ProductFilter, ProductInput,
};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, input: CategoryInput) -> CatalogResult<Category>;

    /// `Fetch::WithRelated` attaches every product of the category, active or not.
    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Category>>;

    /// Active categories ordered by id
    async fn list_active(&self, fetch: Fetch) -> CatalogResult<Vec<Category>>;

    async fn update(&self, id: i32, input: CategoryInput) -> CatalogResult<Category>;

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Category>;

    /// Hard delete; products referencing the category are left untouched.
    async fn delete(&self, id: i32) -> CatalogResult<bool>;

    /// Whether another category (other than `except`) already uses `name`
    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool>;
}

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: ProductInput, image: Option<String>) -> CatalogResult<Product>;

    /// `Fetch::WithRelated` attaches the category (`Some(None)` if it is gone).
    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Product>>;

    /// Active products matching `filter`, ordered by id
    async fn list_active(&self, filter: ProductFilter, fetch: Fetch) -> CatalogResult<Vec<Product>>;

    /// One page of active products, ordered by id
    async fn paginate_active(&self, page: PageRequest, fetch: Fetch) -> CatalogResult<Page<Product>>;

    /// `image: None` keeps the stored image.
    async fn update(&self, id: i32, input: ProductInput, image: Option<String>)
    -> CatalogResult<Product>;

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Product>;

    async fn delete(&self, id: i32) -> CatalogResult<bool>;

    /// Deactivate every product of a category; returns the number of rows touched.
    async fn inactivate_by_category(&self, category_id: i32) -> CatalogResult<u64>;

    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool>;

    async fn category_exists(&self, category_id: i32) -> CatalogResult<bool>;
}

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i32, Category>,
    products: BTreeMap<i32, Product>,
    last_category_id: i32,
    last_product_id: i32,
}

impl Tables {
    fn with_products(&self, mut category: Category) -> Category {
        category.products = Some(
            self.products
                .values()
                .filter(|p| p.category_id == category.id)
                .cloned()
                .collect(),
        );
        category
    }

    fn with_category(&self, mut product: Product) -> Product {
        product.category = Some(self.categories.get(&product.category_id).cloned());
        product
    }

    fn load_product(&self, product: &Product, fetch: Fetch) -> Product {
        match fetch {
            Fetch::Plain => product.clone(),
            Fetch::WithRelated => self.with_category(product.clone()),
        }
    }

    fn category_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn product_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.products
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }
}

/// Shared in-memory store backing both in-memory repositories (for development/testing)
///
/// ```rust
/// use domain_catalog::InMemoryCatalog;
///
/// let catalog = InMemoryCatalog::new();
/// let categories = catalog.category_repository();
/// let products = catalog.product_repository();
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_repository(&self) -> InMemoryCategoryRepository {
        InMemoryCategoryRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn product_repository(&self) -> InMemoryProductRepository {
        InMemoryProductRepository {
            tables: self.tables.clone(),
        }
    }
}

/// In-memory implementation of CategoryRepository
#[derive(Debug, Clone)]
pub struct InMemoryCategoryRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, input: CategoryInput) -> CatalogResult<Category> {
        let mut tables = self.tables.write().await;

        if tables.category_name_taken(&input.name, None) {
            return Err(CatalogError::Conflict(format!(
                "category name '{}' already exists",
                input.name
            )));
        }

        tables.last_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: tables.last_category_id,
            name: input.name,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
            products: None,
        };
        tables.categories.insert(category.id, category.clone());

        tracing::info!(category_id = category.id, "Created category");
        Ok(category)
    }

    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.get(&id).cloned().map(|c| match fetch {
            Fetch::Plain => c,
            Fetch::WithRelated => tables.with_products(c),
        }))
    }

    async fn list_active(&self, fetch: Fetch) -> CatalogResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .map(|c| match fetch {
                Fetch::Plain => c,
                Fetch::WithRelated => tables.with_products(c),
            })
            .collect())
    }

    async fn update(&self, id: i32, input: CategoryInput) -> CatalogResult<Category> {
        let mut tables = self.tables.write().await;

        if tables.category_name_taken(&input.name, Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "category name '{}' already exists",
                input.name
            )));
        }

        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound(id))?;
        category.name = input.name;
        category.is_active = input.is_active;
        category.updated_at = Utc::now();

        tracing::info!(category_id = id, "Updated category");
        Ok(category.clone())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Category> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(CatalogError::CategoryNotFound(id))?;
        category.is_active = is_active;
        category.updated_at = Utc::now();

        tracing::info!(category_id = id, is_active, "Updated category status");
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> CatalogResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.categories.remove(&id).is_some() {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool> {
        Ok(self.tables.read().await.category_name_taken(name, except))
    }
}

/// In-memory implementation of ProductRepository
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: ProductInput, image: Option<String>) -> CatalogResult<Product> {
        let mut tables = self.tables.write().await;

        if tables.product_name_taken(&input.name, None) {
            return Err(CatalogError::Conflict(format!(
                "product name '{}' already exists",
                input.name
            )));
        }

        tables.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: tables.last_product_id,
            name: input.name,
            category_id: input.category_id,
            price: input.price,
            is_active: input.is_active,
            image,
            created_at: now,
            updated_at: now,
            category: None,
        };
        tables.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).map(|p| tables.load_product(p, fetch)))
    }

    async fn list_active(&self, filter: ProductFilter, fetch: Fetch) -> CatalogResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.is_active && filter.matches(p))
            .map(|p| tables.load_product(p, fetch))
            .collect())
    }

    async fn paginate_active(&self, page: PageRequest, fetch: Fetch) -> CatalogResult<Page<Product>> {
        let tables = self.tables.read().await;
        let active: Vec<&Product> = tables.products.values().filter(|p| p.is_active).collect();
        let total = active.len() as u64;

        let items = active
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .map(|p| tables.load_product(p, fetch))
            .collect();

        Ok(Page::new(items, page, total))
    }

    async fn update(
        &self,
        id: i32,
        input: ProductInput,
        image: Option<String>,
    ) -> CatalogResult<Product> {
        let mut tables = self.tables.write().await;

        if tables.product_name_taken(&input.name, Some(id)) {
            return Err(CatalogError::Conflict(format!(
                "product name '{}' already exists",
                input.name
            )));
        }

        let product = tables
            .products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        product.name = input.name;
        product.category_id = input.category_id;
        product.price = input.price;
        product.is_active = input.is_active;
        if image.is_some() {
            product.image = image;
        }
        product.updated_at = Utc::now();

        tracing::info!(product_id = id, "Updated product");
        Ok(product.clone())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Product> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        product.is_active = is_active;
        product.updated_at = Utc::now();

        tracing::info!(product_id = id, is_active, "Updated product status");
        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> CatalogResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn inactivate_by_category(&self, category_id: i32) -> CatalogResult<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut affected = 0;

        for product in tables
            .products
            .values_mut()
            .filter(|p| p.category_id == category_id)
        {
            product.is_active = false;
            product.updated_at = now;
            affected += 1;
        }

        tracing::info!(category_id, affected, "Deactivated products of category");
        Ok(affected)
    }

    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool> {
        Ok(self.tables.read().await.product_name_taken(name, except))
    }

    async fn category_exists(&self, category_id: i32) -> CatalogResult<bool> {
        Ok(self.tables.read().await.categories.contains_key(&category_id))
    }
}
