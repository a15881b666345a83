#[cfg(test)]
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

/// In-memory SQLite pool with the catalog schema and seed categories applied.
///
/// A single connection that never expires keeps the in-memory database alive
/// for the lifetime of the pool.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    crate::core::database::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Insert a category directly and return its id
#[cfg(test)]
pub async fn insert_category(pool: &SqlitePool, name: &str) -> i64 {
    sqlx::query("INSERT INTO Categories (CategoryName, Description) VALUES (?, ?)")
        .bind(name)
        .bind(format!("{} description", name))
        .execute(pool)
        .await
        .expect("failed to insert category")
        .last_insert_rowid()
}
