use axum_helpers::{FormInput, UploadedFile};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Fetch, Product, ProductInput, ProductListing};
use crate::repository::ProductRepository;
use crate::storage::ImageStore;
use crate::validation::{self, Report, Rule};

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository, S: ImageStore> {
    repository: Arc<R>,
    images: Arc<S>,
}

impl<R: ProductRepository, S: ImageStore> ProductService<R, S> {
    pub fn new(repository: R, images: S) -> Self {
        Self {
            repository: Arc::new(repository),
            images: Arc::new(images),
        }
    }

    /// Shape checks on fields and image, then name uniqueness and category existence.
    async fn validate(
        &self,
        input: &FormInput,
        image: Option<&UploadedFile>,
        except: Option<i32>,
    ) -> CatalogResult<ProductInput> {
        let mut report = Report::new();
        let draft = validation::product(&input.fields, image, &mut report);

        if let Some(name) = &draft.name {
            if self.repository.name_taken(name, except).await? {
                report.fail("name", Rule::Unique);
            }
        }
        if let Some(category_id) = draft.category_id {
            if !self.repository.category_exists(category_id).await? {
                report.fail("category_id", Rule::Exists);
            }
        }

        report.finish()?;
        draft
            .complete()
            .ok_or_else(|| CatalogError::Internal("validated product is incomplete".to_string()))
    }

    async fn ensure_exists(&self, id: i32) -> CatalogResult<()> {
        self.repository
            .find_by_id(id, Fetch::Plain)
            .await?
            .map(|_| ())
            .ok_or(CatalogError::ProductNotFound(id))
    }

    async fn store_image(&self, image: Option<UploadedFile>) -> CatalogResult<Option<String>> {
        match image {
            Some(file) => Ok(Some(self.images.store(&file.file_name, file.bytes).await?)),
            None => Ok(None),
        }
    }

    /// The image, if any, is written only after validation passes.
    #[instrument(skip(self, input))]
    pub async fn create(&self, mut input: FormInput) -> CatalogResult<Product> {
        let image = input.take_file("image");
        let product = self.validate(&input, image.as_ref(), None).await?;

        let url = self.store_image(image).await?;
        self.repository.create(product, url).await
    }

    /// Filtered listing, or a page when the query carries `page` or `limit`.
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: &FormInput) -> CatalogResult<ProductListing> {
        if let Some(page) = validation::page_request(&query.fields) {
            let page = self
                .repository
                .paginate_active(page, Fetch::WithRelated)
                .await?;
            return Ok(ProductListing::Paged(page));
        }

        let mut report = Report::new();
        let filter = validation::product_filter(&query.fields, &mut report);
        if let Some(category_id) = filter.category_id {
            if !self.repository.category_exists(category_id).await? {
                report.fail("category_id", Rule::Exists);
            }
        }
        report.finish()?;

        let products = self
            .repository
            .list_active(filter, Fetch::WithRelated)
            .await?;
        Ok(ProductListing::All(products))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> CatalogResult<Product> {
        self.repository
            .find_by_id(id, Fetch::WithRelated)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Without a new image the stored URL is kept; old files are not removed.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, mut input: FormInput) -> CatalogResult<Product> {
        let image = input.take_file("image");
        let product = self.validate(&input, image.as_ref(), Some(id)).await?;
        self.ensure_exists(id).await?;

        let url = self.store_image(image).await?;
        self.repository.update(id, product, url).await
    }

    #[instrument(skip(self, input))]
    pub async fn set_active(&self, id: i32, input: &FormInput) -> CatalogResult<Product> {
        let mut report = Report::new();
        let is_active = validation::status(&input.fields, &mut report);
        report.finish()?;
        let is_active = is_active
            .ok_or_else(|| CatalogError::Internal("validated status is missing".to_string()))?;

        self.ensure_exists(id).await?;
        self.repository.set_active(id, is_active).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        self.ensure_exists(id).await?;

        if !self.repository.delete(id).await? {
            return Err(CatalogError::ProductNotFound(id));
        }
        Ok(())
    }

    /// Deactivate every product of a category. Not exposed over HTTP.
    #[instrument(skip(self))]
    pub async fn deactivate_by_category(&self, category_id: i32) -> CatalogResult<u64> {
        self.repository.inactivate_by_category(category_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Page, PageRequest, ProductFilter};
    use crate::repository::MockProductRepository;
    use crate::storage::MockImageStore;
    use axum::body::Bytes;
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::json;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn form(value: serde_json::Value) -> FormInput {
        match value {
            serde_json::Value::Object(fields) => FormInput {
                fields,
                files: vec![],
            },
            _ => panic!("expected an object"),
        }
    }

    fn with_image(mut input: FormInput, file_name: &str, bytes: &'static [u8]) -> FormInput {
        input.files.push(UploadedFile {
            field: "image".to_string(),
            file_name: file_name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(bytes),
        });
        input
    }

    fn valid_body() -> FormInput {
        form(json!({"name": "Lamp", "category_id": "1", "price": "19.5", "is_active": "1"}))
    }

    fn product(id: i32, input: &ProductInput, image: Option<String>) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: input.name.clone(),
            category_id: input.category_id,
            price: input.price,
            is_active: input.is_active,
            image,
            created_at: now,
            updated_at: now,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let mut repo = MockProductRepository::new();
        repo.expect_name_taken().returning(|_, _| Ok(false));
        repo.expect_category_exists()
            .with(eq(1))
            .returning(|_| Ok(false));
        repo.expect_create().never();

        let mut images = MockImageStore::new();
        images.expect_store().never();

        let service = ProductService::new(repo, images);
        let err = service
            .create(with_image(valid_body(), "lamp.png", PNG))
            .await
            .unwrap_err();

        match err {
            CatalogError::Validation(errors) => {
                assert!(errors.field_errors().contains_key("category_id"))
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_stores_image_after_validation() {
        let mut repo = MockProductRepository::new();
        repo.expect_name_taken().returning(|_, _| Ok(false));
        repo.expect_category_exists().returning(|_| Ok(true));
        repo.expect_create()
            .withf(|input, image| {
                input.price == 19.5
                    && image.as_deref() == Some("http://localhost:8080/uploads/products/1_lamp.png")
            })
            .returning(|input, image| Ok(product(1, &input, image)));

        let mut images = MockImageStore::new();
        images
            .expect_store()
            .withf(|name, bytes| name == "lamp.png" && bytes.len() == PNG.len())
            .times(1)
            .returning(|_, _| Ok("http://localhost:8080/uploads/products/1_lamp.png".to_string()));

        let service = ProductService::new(repo, images);
        let created = service
            .create(with_image(valid_body(), "lamp.png", PNG))
            .await
            .unwrap();
        assert!(created.image.is_some());
    }

    #[tokio::test]
    async fn test_invalid_image_writes_nothing() {
        let mut repo = MockProductRepository::new();
        repo.expect_name_taken().returning(|_, _| Ok(false));
        repo.expect_category_exists().returning(|_| Ok(true));
        repo.expect_create().never();

        let mut images = MockImageStore::new();
        images.expect_store().never();

        let service = ProductService::new(repo, images);
        let err = service
            .create(with_image(valid_body(), "notes.txt", b"plain text"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let service = ProductService::new(MockProductRepository::new(), MockImageStore::new());

        let err = service
            .update(99, form(json!({"price": "-5"})))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_id_stores_no_image() {
        let mut repo = MockProductRepository::new();
        repo.expect_name_taken()
            .withf(|_, except| *except == Some(99))
            .returning(|_, _| Ok(false));
        repo.expect_category_exists().returning(|_| Ok(true));
        repo.expect_find_by_id().returning(|_, _| Ok(None));

        let mut images = MockImageStore::new();
        images.expect_store().never();

        let service = ProductService::new(repo, images);
        let err = service
            .update(99, with_image(valid_body(), "lamp.png", PNG))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ProductNotFound(99)));
    }

    #[tokio::test]
    async fn test_update_without_image_keeps_url() {
        let mut repo = MockProductRepository::new();
        repo.expect_name_taken().returning(|_, _| Ok(false));
        repo.expect_category_exists().returning(|_| Ok(true));
        repo.expect_find_by_id()
            .returning(|id, _| {
                let input = ProductInput {
                    name: "Lamp".into(),
                    category_id: 1,
                    price: 1.0,
                    is_active: true,
                };
                Ok(Some(product(id, &input, Some("old".into()))))
            });
        repo.expect_update()
            .withf(|id, _, image| *id == 3 && image.is_none())
            .returning(|id, input, _| Ok(product(id, &input, Some("old".into()))));

        let service = ProductService::new(repo, MockImageStore::new());
        let updated = service.update(3, valid_body()).await.unwrap();
        assert_eq!(updated.image.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_list_with_limit_is_paged_and_ignores_filters() {
        let mut repo = MockProductRepository::new();
        repo.expect_paginate_active()
            .with(
                eq(PageRequest {
                    page: 1,
                    per_page: 5,
                }),
                eq(Fetch::WithRelated),
            )
            .returning(|page, _| Ok(Page::new(vec![], page, 0)));
        repo.expect_list_active().never();
        repo.expect_category_exists().never();

        let service = ProductService::new(repo, MockImageStore::new());
        let listing = service
            .list(&form(json!({"limit": "5", "category_id": "abc"})))
            .await
            .unwrap();
        assert!(matches!(listing, ProductListing::Paged(page) if page.last_page == 1));
    }

    #[tokio::test]
    async fn test_list_filters_validate_category() {
        let mut repo = MockProductRepository::new();
        repo.expect_category_exists()
            .with(eq(7))
            .returning(|_| Ok(false));
        repo.expect_list_active().never();

        let service = ProductService::new(repo, MockImageStore::new());
        let err = service
            .list(&form(json!({"category_id": "7"})))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_passes_filter() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_active()
            .with(
                eq(ProductFilter {
                    search: Some("foo".into()),
                    min_price: Some(10.0),
                    max_price: Some(20.0),
                    ..Default::default()
                }),
                eq(Fetch::WithRelated),
            )
            .returning(|_, _| Ok(vec![]));

        let service = ProductService::new(repo, MockImageStore::new());
        let listing = service
            .list(&form(json!({"search": "foo", "min_price": "10", "max_price": 20})))
            .await
            .unwrap();
        assert_eq!(listing, ProductListing::All(vec![]));
    }

    #[tokio::test]
    async fn test_deactivate_by_category_returns_count() {
        let mut repo = MockProductRepository::new();
        repo.expect_inactivate_by_category()
            .with(eq(4))
            .times(1)
            .returning(|_| Ok(3));

        let service = ProductService::new(repo, MockImageStore::new());
        assert_eq!(service.deactivate_by_category(4).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_checks_existence_first() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_, _| Ok(None));
        repo.expect_delete().never();

        let service = ProductService::new(repo, MockImageStore::new());
        assert!(matches!(
            service.delete(1).await.unwrap_err(),
            CatalogError::ProductNotFound(1)
        ));
    }
}
