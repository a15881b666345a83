//! Read-only category listing. Categories are seeded by the schema migrations.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
