use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::Category;

const CATEGORY_SELECT: &str = r#"
    SELECT CategoryID   AS category_id,
           CategoryName AS category_name,
           Description  AS description
    FROM Categories
"#;

/// Service for category operations
pub struct CategoryService {
    pool: SqlitePool,
}

impl CategoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all categories in storage order
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let query = format!("{} ORDER BY CategoryID", CATEGORY_SELECT);
        let categories = sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get category by id
    pub async fn get(&self, id: i64) -> Result<CategoryResponseDto> {
        let query = format!("{} WHERE CategoryID = ?", CATEGORY_SELECT);
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category with ID {} not found", id)))
    }
}
