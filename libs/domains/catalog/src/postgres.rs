use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, ActiveModelTrait,
};

use crate::{
    entity::{category, product},
    error::{CatalogError, CatalogResult},
    models::{
        Category, CategoryInput, Fetch, Page, PageRequest, Product, ProductFilter, ProductInput,
    },
    repository::{CategoryRepository, ProductRepository},
};

/// `LIKE` pattern matching `search` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct PgCategoryRepository {
    db: DatabaseConnection,
}

impl PgCategoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn attach_products(&self, models: Vec<category::Model>) -> CatalogResult<Vec<Category>> {
        let products = models
            .load_many(
                product::Entity::find().order_by_asc(product::Column::Id),
                &self.db,
            )
            .await?;

        Ok(models
            .into_iter()
            .zip(products)
            .map(|(model, products)| {
                let mut category = Category::from(model);
                category.products = Some(products.into_iter().map(Product::from).collect());
                category
            })
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, input: CategoryInput) -> CatalogResult<Category> {
        let now = Utc::now();
        let model = category::ActiveModel {
            name: Set(input.name),
            is_active: Set(input.is_active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Category>> {
        let Some(model) = category::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        match fetch {
            Fetch::Plain => Ok(Some(model.into())),
            Fetch::WithRelated => {
                let products = model
                    .find_related(product::Entity)
                    .order_by_asc(product::Column::Id)
                    .all(&self.db)
                    .await?;
                let mut category = Category::from(model);
                category.products = Some(products.into_iter().map(Product::from).collect());
                Ok(Some(category))
            }
        }
    }

    async fn list_active(&self, fetch: Fetch) -> CatalogResult<Vec<Category>> {
        let models = category::Entity::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        match fetch {
            Fetch::Plain => Ok(models.into_iter().map(Category::from).collect()),
            Fetch::WithRelated => self.attach_products(models).await,
        }
    }

    async fn update(&self, id: i32, input: CategoryInput) -> CatalogResult<Category> {
        let mut active = category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?
            .into_active_model();

        active.name = Set(input.name);
        active.is_active = Set(input.is_active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;

        tracing::info!(category_id = id, "Updated category");
        Ok(model.into())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Category> {
        let mut active = category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))?
            .into_active_model();

        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;

        tracing::info!(category_id = id, is_active, "Updated category status");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> CatalogResult<bool> {
        let result = category::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(category_id = id, "Deleted category");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool> {
        let mut query = category::Entity::find().filter(category::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, models: Vec<product::Model>, fetch: Fetch) -> CatalogResult<Vec<Product>> {
        if fetch == Fetch::Plain {
            return Ok(models.into_iter().map(Product::from).collect());
        }

        let categories = models.load_one(category::Entity, &self.db).await?;

        Ok(models
            .into_iter()
            .zip(categories)
            .map(|(model, category)| {
                let mut product = Product::from(model);
                product.category = Some(category.map(Category::from));
                product
            })
            .collect())
    }

    fn active() -> sea_orm::Select<product::Entity> {
        product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Id)
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: ProductInput, image: Option<String>) -> CatalogResult<Product> {
        let now = Utc::now();
        let model = product::ActiveModel {
            name: Set(input.name),
            category_id: Set(input.category_id),
            price: Set(input.price),
            is_active: Set(input.is_active),
            image: Set(image),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32, fetch: Fetch) -> CatalogResult<Option<Product>> {
        let Some(model) = product::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.load(vec![model], fetch).await?.pop())
    }

    async fn list_active(&self, filter: ProductFilter, fetch: Fetch) -> CatalogResult<Vec<Product>> {
        let mut query = Self::active();

        if let Some(search) = &filter.search {
            query = query.filter(Expr::cust_with_values(
                "LOWER(\"products\".\"name\") LIKE $1",
                [contains_pattern(search)],
            ));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max_price));
        }

        let models = query.all(&self.db).await?;
        self.load(models, fetch).await
    }

    async fn paginate_active(&self, page: PageRequest, fetch: Fetch) -> CatalogResult<Page<Product>> {
        let total = Self::active().count(&self.db).await?;

        // Past the last row there is nothing to fetch, and the offset may not fit a BIGINT.
        let offset = page.offset();
        if offset >= total {
            return Ok(Page::new(Vec::new(), page, total));
        }

        let models = Self::active()
            .limit(page.per_page)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(Page::new(self.load(models, fetch).await?, page, total))
    }

    async fn update(
        &self,
        id: i32,
        input: ProductInput,
        image: Option<String>,
    ) -> CatalogResult<Product> {
        let mut active = product::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?
            .into_active_model();

        active.name = Set(input.name);
        active.category_id = Set(input.category_id);
        active.price = Set(input.price);
        active.is_active = Set(input.is_active);
        if let Some(url) = image {
            active.image = Set(Some(url));
        }
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;

        tracing::info!(product_id = id, "Updated product");
        Ok(model.into())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> CatalogResult<Product> {
        let mut active = product::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?
            .into_active_model();

        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;

        tracing::info!(product_id = id, is_active, "Updated product status");
        Ok(model.into())
    }

    async fn delete(&self, id: i32) -> CatalogResult<bool> {
        let result = product::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn inactivate_by_category(&self, category_id: i32) -> CatalogResult<u64> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = product::Entity::update_many()
            .col_expr(product::Column::IsActive, Expr::value(false))
            .col_expr(product::Column::UpdatedAt, Expr::value(now))
            .filter(product::Column::CategoryId.eq(category_id))
            .exec(&self.db)
            .await?;

        tracing::info!(
            category_id,
            affected = result.rows_affected,
            "Deactivated products of category"
        );
        Ok(result.rows_affected)
    }

    async fn name_taken(&self, name: &str, except: Option<i32>) -> CatalogResult<bool> {
        let mut query = product::Entity::find().filter(product::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(product::Column::Id.ne(id));
        }
        Ok(query.count(&self.db).await? > 0)
    }

    async fn category_exists(&self, category_id: i32) -> CatalogResult<bool> {
        Ok(category::Entity::find_by_id(category_id)
            .count(&self.db)
            .await?
            > 0)
    }
}
