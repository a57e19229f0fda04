use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use axum_helpers::{
    ErrorResponse, FormInput, IdPath, ValidationErrorResponse,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
        UnprocessableEntityResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use super::{CategoriesResponse, CategoryResponse, DeletedResponse};
use crate::error::CatalogResult;
use crate::models::{Category, CategoryInput, Product, StatusInput};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

pub const TAG: &str = "Product categories";

const CREATED: &str = "Category created successfully!";
const UPDATED: &str = "Category updated successfully!";
const STATUS_UPDATED: &str = "Category status updated successfully!";
const DELETED: &str = "Category deleted successfully!";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_category,
        list_categories,
        get_category,
        update_category,
        set_category_status,
        delete_category,
    ),
    components(
        schemas(
            Category, Product, CategoryInput, StatusInput, CategoryResponse,
            CategoriesResponse, DeletedResponse, ErrorResponse, ValidationErrorResponse
        ),
        responses(
            NotFoundResponse,
            UnprocessableEntityResponse,
            BadRequestResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product category management")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<CategoryService<R>>>;

pub fn router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    Router::new()
        .route("/create", post(create_category))
        .route("/get-all", get(list_categories))
        .route("/get-one/{id}", get(get_category))
        .route("/update/{id}", put(update_category))
        .route("/soft-delete/{id}", patch(set_category_status))
        .route("/delete/{id}", delete(delete_category))
        .with_state(Arc::new(service))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, response = BadRequestResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): SharedService<R>,
    input: FormInput,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse::new(category, Some(CREATED))),
    ))
}

/// List active categories with their products
#[utoipa::path(
    get,
    path = "/get-all",
    tag = TAG,
    responses(
        (status = 200, description = "Active categories", body = CategoriesResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): SharedService<R>,
) -> CatalogResult<Json<CategoriesResponse>> {
    let categories = service.list().await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

/// Get a category with its products
#[utoipa::path(
    get,
    path = "/get-one/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<CategoryResponse>> {
    let category = service.get(id).await?;
    Ok(Json(CategoryResponse::new(category, None)))
}

/// Update a category's name and status
#[utoipa::path(
    put,
    path = "/update/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
    input: FormInput,
) -> CatalogResult<Json<CategoryResponse>> {
    let category = service.update(id, &input).await?;
    Ok(Json(CategoryResponse::new(category, Some(UPDATED))))
}

/// Activate or deactivate a category
#[utoipa::path(
    patch,
    path = "/soft-delete/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Category ID")),
    request_body = StatusInput,
    responses(
        (status = 200, description = "Status updated", body = CategoryResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_category_status<R: CategoryRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
    input: FormInput,
) -> CatalogResult<Json<CategoryResponse>> {
    let category = service.set_active(id, &input).await?;
    Ok(Json(CategoryResponse::new(category, Some(STATUS_UPDATED))))
}

/// Permanently delete a category (its products are kept)
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = DeletedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): SharedService<R>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<DeletedResponse>> {
    service.delete(id).await?;
    Ok(Json(DeletedResponse::new(DELETED)))
}
