use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::models::Category;

/// Response DTO for category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    #[serde(rename = "CategoryID")]
    pub category_id: i64,
    #[serde(rename = "CategoryName")]
    pub category_name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            category_id: c.category_id,
            category_name: c.category_name,
            description: c.description,
        }
    }
}
