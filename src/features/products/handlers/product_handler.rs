use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::products::dtos::{CreateProductDto, ProductResponseDto, UpdateProductDto};
use crate::features::products::services::ProductService;
use crate::shared::types::ApiResponse;

/// List all products
///
/// Each product carries the name of its category, or null when uncategorized.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of products", body = Vec<ProductResponseDto>),
        (status = 500, description = "Storage error")
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
) -> Result<Json<Vec<ProductResponseDto>>> {
    let products = service.list().await?;
    Ok(Json(products))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponseDto),
        (status = 400, description = "Malformed product ID"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ProductResponseDto>> {
    let product = service.get(id).await?;
    Ok(Json(product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = ProductResponseDto),
        (status = 400, description = "Missing required field or unknown CategoryID")
    ),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    AppJson(dto): AppJson<CreateProductDto>,
) -> Result<(StatusCode, Json<ProductResponseDto>)> {
    dto.validate()?;

    let product = service.create(dto).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = ProductResponseDto),
        (status = 400, description = "Invalid field or unknown CategoryID"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<UpdateProductDto>,
) -> Result<Json<ProductResponseDto>> {
    dto.validate()?;

    let product = service.update(id, dto).await?;
    Ok(Json(product))
}

/// Delete a product (hard delete)
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Product {} deleted successfully", id)),
    )))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::{json, Value};

    use crate::features::categories::dtos::CategoryResponseDto;
    use crate::features::products::dtos::ProductResponseDto;
    use crate::shared::test_helpers::{create_test_pool, insert_category};

    async fn server() -> (TestServer, sqlx::SqlitePool) {
        let pool = create_test_pool().await;
        let app = crate::build_api_router(pool.clone());
        (TestServer::new(app).unwrap(), pool)
    }

    async fn create(server: &TestServer, body: Value) -> ProductResponseDto {
        let response = server.post("/api/products").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<ProductResponseDto>()
    }

    #[tokio::test]
    async fn test_create_without_category_lists_null_category() {
        let (server, _pool) = server().await;
        let name: String = Word().fake();

        let created = create(&server, json!({ "ProductName": name, "UnitPrice": 3.5 })).await;
        assert_eq!(created.category_id, None);

        let listed: Vec<Value> = server.get("/api/products").await.json();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["ProductID"], created.product_id);
        assert!(listed[0]["CategoryID"].is_null());
        assert!(listed[0]["CategoryName"].is_null());
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_is_rejected() {
        let (server, _pool) = server().await;
        create(&server, json!({ "ProductName": "Existing", "UnitPrice": 1.0 })).await;

        let response = server
            .post("/api/products")
            .json(&json!({ "ProductName": "Widget", "UnitPrice": 19.99, "CategoryID": 424242 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Category with ID 424242 not found.");

        let listed: Vec<Value> = server.get("/api/products").await.json();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_values() {
        let (server, _pool) = server().await;

        let created = create(
            &server,
            json!({ "ProductName": "Widget", "UnitPrice": 19.99 }),
        )
        .await;

        let response = server
            .get(&format!("/api/products/{}", created.product_id))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["ProductName"], "Widget");
        assert_eq!(body["UnitPrice"], 19.99);
        assert!(body["DateAdded"].is_string());
    }

    #[tokio::test]
    async fn test_missing_required_fields_are_rejected() {
        let (server, _pool) = server().await;

        server
            .post("/api/products")
            .json(&json!({ "UnitPrice": 19.99 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/products")
            .json(&json!({ "ProductName": "Widget" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/products")
            .json(&json!({ "ProductName": "Widget", "UnitPrice": -1 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let listed: Vec<Value> = server.get("/api/products").await.json();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (server, _pool) = server().await;

        let response = server
            .post("/api/products")
            .json(&json!({ "ProductName": "Widget", "UnitPrice": "cheap" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_with_non_integer_id_is_bad_request() {
        let (server, _pool) = server().await;

        server
            .get("/api/products/abc")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_unknown_product_is_not_found() {
        let (server, _pool) = server().await;
        let created = create(&server, json!({ "ProductName": "Widget", "UnitPrice": 1 })).await;

        server
            .delete(&format!("/api/products/{}", created.product_id + 1000))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (server, _pool) = server().await;
        let created = create(&server, json!({ "ProductName": "Widget", "UnitPrice": 1 })).await;
        let path = format!("/api/products/{}", created.product_id);

        let response = server.delete(&path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            format!("Product {} deleted successfully", created.product_id)
        );

        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_listed_category_name_matches_category() {
        let (server, pool) = server().await;
        let category_id = insert_category(&pool, "Garden").await;

        create(
            &server,
            json!({ "ProductName": "Rake", "UnitPrice": 12.0, "CategoryID": category_id }),
        )
        .await;
        create(&server, json!({ "ProductName": "Mystery", "UnitPrice": 2.0 })).await;

        let categories: Vec<CategoryResponseDto> = server.get("/api/categories").await.json();
        let products: Vec<ProductResponseDto> = server.get("/api/products").await.json();
        assert_eq!(products.len(), 2);

        for product in products {
            let expected = product.category_id.map(|id| {
                categories
                    .iter()
                    .find(|c| c.category_id == id)
                    .map(|c| c.category_name.clone())
                    .unwrap()
            });
            assert_eq!(product.category_name, expected);
        }
    }

    #[tokio::test]
    async fn test_update_refreshes_last_updated() {
        let (server, _pool) = server().await;
        let created = create(
            &server,
            json!({ "ProductName": "Widget", "UnitPrice": 19.99, "CategoryID": 1 }),
        )
        .await;

        tokio::time::sleep(Duration::from_millis(10)).await;

        let response = server
            .put(&format!("/api/products/{}", created.product_id))
            .json(&json!({ "ProductName": "Widget Pro" }))
            .await;
        response.assert_status_ok();

        let updated: ProductResponseDto = response.json();
        assert_eq!(updated.product_name, "Widget Pro");
        assert_eq!(updated.unit_price, 19.99);
        assert_eq!(updated.category_id, Some(1));
        assert_eq!(updated.date_added, created.date_added);
        assert!(updated.last_updated > created.last_updated);
    }

    #[tokio::test]
    async fn test_update_validation_and_not_found() {
        let (server, _pool) = server().await;
        let created = create(&server, json!({ "ProductName": "Widget", "UnitPrice": 5 })).await;
        let path = format!("/api/products/{}", created.product_id);

        server
            .put(&path)
            .json(&json!({ "UnitPrice": -3 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put(&path)
            .json(&json!({ "CategoryID": 777 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put("/api/products/999999")
            .json(&json!({ "UnitPrice": 3 }))
            .await
            .assert_status_not_found();
    }
}
