use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub description: Option<String>,
}
