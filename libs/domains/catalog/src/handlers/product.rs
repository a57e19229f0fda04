use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use axum_helpers::{
    AppError, ErrorResponse, FormInput, IdPath, ValidationErrorResponse,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
        PayloadTooLargeResponse, UnprocessableEntityResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use super::{DeletedResponse, ProductPageResponse, ProductResponse, ProductsResponse};
use crate::error::CatalogResult;
use crate::models::{
    Category, PageParams, Product, ProductFilter, ProductInput, ProductListing, ProductUpload,
    StatusInput,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::storage::ImageStore;

pub const TAG: &str = "Products";

/// Room for a 2048 KiB image plus the other form fields; larger files
/// still reach validation as long as they fit.
pub const BODY_LIMIT: usize = 4 * 1024 * 1024;

const CREATED: &str = "Product created successfully!";
const UPDATED: &str = "Product updated successfully!";
const STATUS_UPDATED: &str = "Product status updated successfully!";
const DELETED: &str = "Product deleted successfully!";

#[derive(OpenApi)]
#[openapi(
    paths(
        create_product,
        list_products,
        get_product,
        update_product,
        set_product_status,
        delete_product,
    ),
    components(
        schemas(
            Product, Category, ProductInput, ProductUpload, StatusInput, ProductResponse,
            ProductsResponse, ProductPageResponse, DeletedResponse, ErrorResponse,
            ValidationErrorResponse
        ),
        responses(
            NotFoundResponse,
            UnprocessableEntityResponse,
            BadRequestResponse,
            PayloadTooLargeResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product management")
    )
)]
pub struct ApiDoc;

type SharedService<R, S> = State<Arc<ProductService<R, S>>>;

pub fn router<R, S>(service: ProductService<R, S>) -> Router
where
    R: ProductRepository + 'static,
    S: ImageStore + 'static,
{
    Router::new()
        .route("/create", post(create_product))
        .route("/get-all", get(list_products))
        .route("/get-one/{id}", get(get_product))
        .route("/update/{id}", put(update_product))
        .route("/soft-delete/{id}", patch(set_product_status))
        .route("/delete/{id}", delete(delete_product))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(Arc::new(service))
}

/// Create a product, optionally uploading its image
///
/// Accepts multipart (for the image), JSON or urlencoded bodies.
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    input: FormInput,
) -> CatalogResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::new(product, Some(CREATED))),
    ))
}

/// List active products
///
/// With `page` or `limit` the response is paged and the filters are ignored;
/// otherwise all matching products are returned.
#[utoipa::path(
    get,
    path = "/get-all",
    tag = TAG,
    params(ProductFilter, PageParams),
    responses(
        (status = 200, description = "Filtered list, or a `ProductPageResponse` when page or limit is given", body = ProductsResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    uri: Uri,
) -> Result<Response, AppError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri)
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    let query = FormInput::from_pairs(pairs);

    let response = match service.list(&query).await? {
        ProductListing::All(products) => Json(ProductsResponse {
            success: true,
            products,
        })
        .into_response(),
        ProductListing::Paged(products) => Json(ProductPageResponse {
            success: true,
            products,
        })
        .into_response(),
    };
    Ok(response)
}

/// Get a product with its category
#[utoipa::path(
    get,
    path = "/get-one/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.get(id).await?;
    Ok(Json(ProductResponse::new(product, None)))
}

/// Update a product; omit the image to keep the current one
#[utoipa::path(
    put,
    path = "/update/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    IdPath(id): IdPath,
    input: FormInput,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.update(id, input).await?;
    Ok(Json(ProductResponse::new(product, Some(UPDATED))))
}

/// Activate or deactivate a product
#[utoipa::path(
    patch,
    path = "/soft-delete/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    request_body = StatusInput,
    responses(
        (status = 200, description = "Status updated", body = ProductResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_product_status<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    IdPath(id): IdPath,
    input: FormInput,
) -> CatalogResult<Json<ProductResponse>> {
    let product = service.set_active(id, &input).await?;
    Ok(Json(ProductResponse::new(product, Some(STATUS_UPDATED))))
}

/// Permanently delete a product
#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = DeletedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository, S: ImageStore>(
    State(service): SharedService<R, S>,
    IdPath(id): IdPath,
) -> CatalogResult<Json<DeletedResponse>> {
    service.delete(id).await?;
    Ok(Json(DeletedResponse::new(DELETED)))
}
