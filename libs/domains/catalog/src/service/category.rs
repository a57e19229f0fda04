use axum_helpers::FormInput;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, CategoryInput, Fetch};
use crate::repository::CategoryRepository;
use crate::validation::{self, Report, Rule};

/// Service layer for Category business logic
#[derive(Clone)]
pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Shape checks, then uniqueness (ignoring `except`).
    async fn validate(&self, input: &FormInput, except: Option<i32>) -> CatalogResult<CategoryInput> {
        let mut report = Report::new();
        let draft = validation::category(&input.fields, &mut report);

        if let Some(name) = &draft.name {
            if self.repository.name_taken(name, except).await? {
                report.fail("name", Rule::Unique);
            }
        }

        report.finish()?;
        draft
            .complete()
            .ok_or_else(|| CatalogError::Internal("validated category is incomplete".to_string()))
    }

    async fn ensure_exists(&self, id: i32) -> CatalogResult<()> {
        self.repository
            .find_by_id(id, Fetch::Plain)
            .await?
            .map(|_| ())
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &FormInput) -> CatalogResult<Category> {
        let input = self.validate(input, None).await?;
        self.repository.create(input).await
    }

    /// Active categories with their products
    #[instrument(skip(self))]
    pub async fn list(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_active(Fetch::WithRelated).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> CatalogResult<Category> {
        self.repository
            .find_by_id(id, Fetch::WithRelated)
            .await?
            .ok_or(CatalogError::CategoryNotFound(id))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, input: &FormInput) -> CatalogResult<Category> {
        let input = self.validate(input, Some(id)).await?;
        self.ensure_exists(id).await?;
        self.repository.update(id, input).await
    }

    /// Only `is_active` is read from the input.
    #[instrument(skip(self, input))]
    pub async fn set_active(&self, id: i32, input: &FormInput) -> CatalogResult<Category> {
        let mut report = Report::new();
        let is_active = validation::status(&input.fields, &mut report);
        report.finish()?;
        let is_active = is_active
            .ok_or_else(|| CatalogError::Internal("validated status is missing".to_string()))?;

        self.ensure_exists(id).await?;
        self.repository.set_active(id, is_active).await
    }

    /// Hard delete; the category's products are kept.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> CatalogResult<()> {
        self.ensure_exists(id).await?;

        if !self.repository.delete(id).await? {
            return Err(CatalogError::CategoryNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCategoryRepository;
    use chrono::Utc;
    use mockall::predicate::eq;
    use serde_json::json;

    fn form(value: serde_json::Value) -> FormInput {
        match value {
            serde_json::Value::Object(fields) => FormInput {
                fields,
                files: vec![],
            },
            _ => panic!("expected an object"),
        }
    }

    fn category(id: i32, name: &str, is_active: bool) -> Category {
        let now = Utc::now();
        Category {
            id,
            name: name.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
            products: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_taken_name() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_name_taken()
            .withf(|name, except| name == "Shoes" && except.is_none())
            .returning(|_, _| Ok(true));
        repo.expect_create().never();

        let service = CategoryService::new(repo);
        let err = service
            .create(&form(json!({"name": "Shoes", "is_active": true})))
            .await
            .unwrap_err();

        match err {
            CatalogError::Validation(errors) => assert!(errors.field_errors().contains_key("name")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_passes_trimmed_input() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_name_taken().returning(|_, _| Ok(false));
        repo.expect_create()
            .with(eq(CategoryInput {
                name: "Shoes".to_string(),
                is_active: false,
            }))
            .returning(|input| Ok(category(1, &input.name, input.is_active)));

        let service = CategoryService::new(repo);
        let created = service
            .create(&form(json!({"name": " Shoes ", "is_active": "0"})))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        // No expectations: any repository call would panic.
        let service = CategoryService::new(MockCategoryRepository::new());

        let err = service.update(404, &form(json!({}))).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_name_taken()
            .withf(|_, except| *except == Some(404))
            .returning(|_, _| Ok(false));
        repo.expect_find_by_id().returning(|_, _| Ok(None));
        repo.expect_update().never();

        let service = CategoryService::new(repo);
        let err = service
            .update(404, &form(json!({"name": "Bags", "is_active": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(404)));
    }

    #[tokio::test]
    async fn test_set_active_reads_only_the_flag() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_id()
            .with(eq(5), eq(Fetch::Plain))
            .returning(|id, _| Ok(Some(category(id, "Shoes", true))));
        repo.expect_set_active()
            .with(eq(5), eq(false))
            .returning(|id, is_active| Ok(category(id, "Shoes", is_active)));

        let service = CategoryService::new(repo);
        let updated = service
            .set_active(5, &form(json!({"is_active": "false", "name": ""})))
            .await
            .unwrap();
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_does_not_mutate() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_id().returning(|_, _| Ok(None));
        repo.expect_delete().never();

        let service = CategoryService::new(repo);
        let err = service.delete(8).await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(8)));
    }

    #[tokio::test]
    async fn test_get_loads_products() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_find_by_id()
            .with(eq(2), eq(Fetch::WithRelated))
            .returning(|id, _| {
                let mut c = category(id, "Shoes", true);
                c.products = Some(vec![]);
                Ok(Some(c))
            });

        let service = CategoryService::new(repo);
        assert_eq!(service.get(2).await.unwrap().products, Some(vec![]));
    }
}
