//! Product catalog feature.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/products` | List products joined with category name |
//! | POST | `/api/products` | Create product |
//! | GET | `/api/products/{id}` | Get product |
//! | PUT | `/api/products/{id}` | Partially update product |
//! | DELETE | `/api/products/{id}` | Hard delete product |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProductService;
