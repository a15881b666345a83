use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Product row joined with the name of its category (if any)
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub unit_price: f64,
    pub image_url: Option<String>,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub category_name: Option<String>,
}
