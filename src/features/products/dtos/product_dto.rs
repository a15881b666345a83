use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::products::models::Product;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("ProductName is required".into()));
    }
    Ok(())
}

/// Request DTO for creating a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductDto {
    #[serde(rename = "ProductName", default)]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Widget")]
    pub product_name: String,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    /// Unit price in the store currency (required, non-negative)
    #[serde(rename = "UnitPrice")]
    #[validate(
        required(message = "UnitPrice is required"),
        range(min = 0.0, message = "UnitPrice must be a non-negative number")
    )]
    #[schema(example = 19.99)]
    pub unit_price: Option<f64>,

    /// Must reference an existing category when present
    #[serde(rename = "CategoryID")]
    pub category_id: Option<i64>,

    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
}

/// Request DTO for a partial product update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductDto {
    #[serde(rename = "ProductName")]
    #[validate(custom(function = "validate_not_blank"))]
    pub product_name: Option<String>,

    #[serde(rename = "Description")]
    pub description: Option<String>,

    #[serde(rename = "UnitPrice")]
    #[validate(range(min = 0.0, message = "UnitPrice must be a non-negative number"))]
    pub unit_price: Option<f64>,

    #[serde(rename = "CategoryID")]
    pub category_id: Option<i64>,

    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
}

/// Response DTO for product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponseDto {
    #[serde(rename = "ProductID")]
    pub product_id: i64,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "CategoryID")]
    pub category_id: Option<i64>,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "DateAdded")]
    pub date_added: DateTime<Utc>,
    #[serde(rename = "LastUpdated")]
    pub last_updated: DateTime<Utc>,
    /// Name of the referenced category, null when uncategorized
    #[serde(rename = "CategoryName")]
    pub category_name: Option<String>,
}

impl From<Product> for ProductResponseDto {
    fn from(p: Product) -> Self {
        Self {
            product_id: p.product_id,
            product_name: p.product_name,
            description: p.description,
            category_id: p.category_id,
            unit_price: p.unit_price,
            image_url: p.image_url,
            date_added: p.date_added,
            last_updated: p.last_updated,
            category_name: p.category_name,
        }
    }
}
