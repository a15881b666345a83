use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{CreateProductDto, ProductResponseDto, UpdateProductDto};
use crate::features::products::models::Product;

/// Columns of `Product`, with the category name pulled in by an explicit join
const PRODUCT_SELECT: &str = r#"
    SELECT p.ProductID   AS product_id,
           p.ProductName AS product_name,
           p.Description AS description,
           p.CategoryID  AS category_id,
           p.UnitPrice   AS unit_price,
           p.ImageURL    AS image_url,
           p.DateAdded   AS date_added,
           p.LastUpdated AS last_updated,
           c.CategoryName AS category_name
    FROM Products p
    LEFT JOIN Categories c ON c.CategoryID = p.CategoryID
"#;

fn category_not_found(category_id: i64) -> AppError {
    AppError::Validation(format!("Category with ID {} not found.", category_id))
}

fn product_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Product with ID {} not found", id))
}

/// A category can disappear between the existence check and the write
fn map_foreign_key_violation(err: sqlx::Error, category_id: Option<i64>) -> AppError {
    if let (sqlx::Error::Database(db_err), Some(category_id)) = (&err, category_id) {
        if db_err.is_foreign_key_violation() {
            return category_not_found(category_id);
        }
    }

    AppError::Database(err)
}

/// Service for product operations.
///
/// Every write is a single autocommit statement so SQLite's busy handler
/// serializes concurrent writers.
pub struct ProductService {
    pool: SqlitePool,
}

impl ProductService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all products in storage order, joined with category name
    pub async fn list(&self) -> Result<Vec<ProductResponseDto>> {
        let query = format!("{} ORDER BY p.ProductID", PRODUCT_SELECT);
        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// Get product by id
    pub async fn get(&self, id: i64) -> Result<ProductResponseDto> {
        let query = format!("{} WHERE p.ProductID = ?", PRODUCT_SELECT);
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        product.map(|p| p.into()).ok_or_else(|| product_not_found(id))
    }

    /// Create a product; `DateAdded` and `LastUpdated` are assigned here, never by the caller
    pub async fn create(&self, dto: CreateProductDto) -> Result<ProductResponseDto> {
        let unit_price = dto
            .unit_price
            .ok_or_else(|| AppError::Validation("UnitPrice is required".to_string()))?;

        if let Some(category_id) = dto.category_id {
            self.ensure_category_exists(category_id).await?;
        }

        let now = Utc::now();
        let product_id = sqlx::query(
            r#"
            INSERT INTO Products (ProductName, Description, CategoryID, UnitPrice, ImageURL, DateAdded, LastUpdated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&dto.product_name)
        .bind(&dto.description)
        .bind(dto.category_id)
        .bind(unit_price)
        .bind(&dto.image_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, dto.category_id))?
        .last_insert_rowid();

        tracing::info!(
            "Product created: id={}, name={}",
            product_id,
            dto.product_name
        );

        self.get(product_id).await
    }

    /// Apply a partial update and refresh `LastUpdated`
    pub async fn update(&self, id: i64, dto: UpdateProductDto) -> Result<ProductResponseDto> {
        if let Some(category_id) = dto.category_id {
            self.ensure_category_exists(category_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE Products
            SET ProductName = COALESCE(?, ProductName),
                Description = COALESCE(?, Description),
                CategoryID  = COALESCE(?, CategoryID),
                UnitPrice   = COALESCE(?, UnitPrice),
                ImageURL    = COALESCE(?, ImageURL),
                LastUpdated = ?
            WHERE ProductID = ?
            "#,
        )
        .bind(&dto.product_name)
        .bind(&dto.description)
        .bind(dto.category_id)
        .bind(dto.unit_price)
        .bind(&dto.image_url)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, dto.category_id))?;

        if result.rows_affected() == 0 {
            return Err(product_not_found(id));
        }

        tracing::info!("Product updated: id={}", id);

        self.get(id).await
    }

    /// Hard delete; a missing row is reported as not found
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM Products WHERE ProductID = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Product with ID {} not found or already deleted",
                id
            )));
        }

        tracing::info!("Product deleted: id={}", id);

        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<()> {
        let found =
            sqlx::query_scalar::<_, i64>("SELECT CategoryID FROM Categories WHERE CategoryID = ?")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(category_not_found(category_id)),
        }
    }
}
