use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Products
        products_handlers::list_products,
        products_handlers::get_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
    ),
    components(
        schemas(
            // Products
            products_dtos::CreateProductDto,
            products_dtos::UpdateProductDto,
            products_dtos::ProductResponseDto,
            // Categories
            categories_dtos::CategoryResponseDto,
        )
    ),
    tags(
        (name = "products", description = "Product catalog"),
        (name = "categories", description = "Product categories (read-only)"),
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "API documentation for the product catalog",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
