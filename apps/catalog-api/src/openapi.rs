use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::ValidationErrorResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "API for managing product categories and products"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct CatalogInfo;

/// Served at `/api-docs/openapi.json`
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = CatalogInfo::openapi();
        doc.merge(domain_catalog::ApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_lists_catalog_routes() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Catalog API");

        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/product-category/create"));
        assert!(paths.contains_key("/product/get-all"));
        assert!(paths.contains_key("/product/get-one/{id}"));
    }
}
