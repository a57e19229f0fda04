//! Integration tests for the catalog domain
//!
//! These run the Postgres repositories against a real database via
//! testcontainers to ensure:
//! - Queries and relation loading work
//! - Unique constraints are enforced
//! - Search, price filters and pagination agree with the in-memory store

use domain_catalog::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn category_input(name: &str, is_active: bool) -> CategoryInput {
    CategoryInput {
        name: name.to_string(),
        is_active,
    }
}

fn product_input(name: &str, category_id: i32, price: f64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        category_id,
        price,
        is_active: true,
    }
}

// ============================================================================
// Category Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_get_category() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get_category");

    let created = repo
        .create(category_input(&builder.name("category", "main"), true))
        .await
        .unwrap();
    assert_eq!(created.name, builder.name("category", "main"));
    assert!(created.is_active);
    assert!(created.products.is_none());

    let plain = assert_some(
        repo.find_by_id(created.id, Fetch::Plain).await.unwrap(),
        "category should exist",
    );
    assert!(plain.products.is_none());

    let loaded = assert_some(
        repo.find_by_id(created.id, Fetch::WithRelated).await.unwrap(),
        "category should exist",
    );
    assert_eq!(loaded.products, Some(vec![]));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_category_name_is_conflict() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());

    repo.create(category_input("Shoes", true)).await.unwrap();
    let result = repo.create(category_input("Shoes", false)).await;

    assert!(
        matches!(result, Err(CatalogError::Conflict(_))),
        "expected a conflict, got {result:?}"
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_category_name_taken_ignores_own_row() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());

    let shoes = repo.create(category_input("Shoes", true)).await.unwrap();

    assert!(repo.name_taken("Shoes", None).await.unwrap());
    assert!(!repo.name_taken("Shoes", Some(shoes.id)).await.unwrap());
    assert!(!repo.name_taken("Bags", None).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_active_categories_with_products() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    categories.create(category_input("Hidden", false)).await.unwrap();
    products
        .create(product_input("Runner", shoes.id, 80.0), None)
        .await
        .unwrap();

    let listed = categories.list_active(Fetch::WithRelated).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Shoes");
    let embedded = assert_some(listed[0].products.clone(), "products should be loaded");
    assert_eq!(embedded.len(), 1);
    assert_eq!(embedded[0].name, "Runner");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_set_active_and_delete_category() {
    let db = TestDatabase::new().await;
    let repo = PgCategoryRepository::new(db.connection());

    let created = repo.create(category_input("Shoes", true)).await.unwrap();

    let updated = repo
        .update(created.id, category_input("Footwear", true))
        .await
        .unwrap();
    assert_eq!(updated.name, "Footwear");
    assert!(updated.updated_at >= created.updated_at);

    let inactive = repo.set_active(created.id, false).await.unwrap();
    assert!(!inactive.is_active);
    assert_eq!(inactive.name, "Footwear");

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(repo.find_by_id(created.id, Fetch::Plain).await.unwrap().is_none());
}

// ============================================================================
// Product Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_product_and_load_category() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_product");

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    let price = builder.price();
    let created = products
        .create(
            product_input(&builder.name("product", "main"), shoes.id, price),
            Some("http://localhost:8080/uploads/products/1_a.png".to_string()),
        )
        .await
        .unwrap();

    assert_price_eq(created.price, price, "created price");
    assert!(created.category.is_none());
    assert_eq!(
        created.image.as_deref(),
        Some("http://localhost:8080/uploads/products/1_a.png")
    );

    let loaded = assert_some(
        products
            .find_by_id(created.id, Fetch::WithRelated)
            .await
            .unwrap(),
        "product should exist",
    );
    let category = assert_some(loaded.category, "category should be loaded");
    assert_eq!(category.map(|c| c.name), Some("Shoes".to_string()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_product_of_deleted_category_has_null_category() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    let runner = products
        .create(product_input("Runner", shoes.id, 10.0), None)
        .await
        .unwrap();
    categories.delete(shoes.id).await.unwrap();

    let loaded = assert_some(
        products
            .find_by_id(runner.id, Fetch::WithRelated)
            .await
            .unwrap(),
        "product survives its category",
    );
    assert_eq!(loaded.category, Some(None));
    assert!(!products.category_exists(shoes.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_active_products_filters() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    let bags = categories.create(category_input("Bags", true)).await.unwrap();
    products
        .create(product_input("Trail Runner", shoes.id, 80.0), None)
        .await
        .unwrap();
    products
        .create(product_input("Road Runner", shoes.id, 120.0), None)
        .await
        .unwrap();
    products
        .create(product_input("100% Tote", bags.id, 40.0), None)
        .await
        .unwrap();

    let filter = ProductFilter {
        search: Some("runner".to_string()),
        max_price: Some(100.0),
        ..Default::default()
    };
    let found = products.list_active(filter, Fetch::Plain).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Trail Runner");

    // LIKE wildcards in the search term are literal.
    let filter = ProductFilter {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let found = products.list_active(filter, Fetch::Plain).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "100% Tote");

    let filter = ProductFilter {
        category_id: Some(shoes.id),
        min_price: Some(80.0),
        ..Default::default()
    };
    let found = products.list_active(filter, Fetch::WithRelated).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.category.is_some()));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_paginate_active_products() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    for i in 0..25 {
        products
            .create(product_input(&format!("Product {i:02}"), shoes.id, 1.0), None)
            .await
            .unwrap();
    }

    let page = products
        .paginate_active(PageRequest::new(Some(3), Some(10)), Fetch::WithRelated)
        .await
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.last_page, 3);
    assert_eq!(page.current_page, 3);
    assert_eq!(page.items.len(), 5);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_keeps_image_and_inactivate_by_category() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let products = PgProductRepository::new(db.connection());

    let shoes = categories.create(category_input("Shoes", true)).await.unwrap();
    let runner = products
        .create(
            product_input("Runner", shoes.id, 10.0),
            Some("http://x/uploads/products/1_r.png".to_string()),
        )
        .await
        .unwrap();
    products
        .create(product_input("Sandal", shoes.id, 5.0), None)
        .await
        .unwrap();

    let updated = products
        .update(runner.id, product_input("Runner", shoes.id, 12.0), None)
        .await
        .unwrap();
    assert_eq!(updated.image, runner.image);
    assert_price_eq(updated.price, 12.0, "updated price");

    assert_eq!(products.inactivate_by_category(shoes.id).await.unwrap(), 2);
    let active = products
        .list_active(ProductFilter::default(), Fetch::Plain)
        .await
        .unwrap();
    assert!(active.is_empty());

    db.truncate_all().await;
    assert!(products.find_by_id(runner.id, Fetch::Plain).await.unwrap().is_none());
}
