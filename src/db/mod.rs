use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{NewProduct, Product, ProductUpdate};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgProductStore;

/// Storage access for the `products` table. Each call is its own unit of work: writes
/// commit before returning or leave nothing behind.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, ascending by id.
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>>;

    /// Insert a product. A name clash detected by the store is reported as
    /// `AppError::Conflict`, even when it slips past an earlier `find_by_name`.
    async fn insert(&self, product: &NewProduct) -> AppResult<Product>;

    /// Apply the supplied fields of `patch` to the product called `name`.
    /// `None` when no such product exists.
    async fn update_by_name(&self, name: &str, patch: &ProductUpdate) -> AppResult<Option<Product>>;

    /// Remove the product and hand back what was deleted.
    async fn delete(&self, id: i32) -> AppResult<Option<Product>>;

    /// Round-trip to the backend.
    async fn ping(&self) -> AppResult<()>;

    /// Release the backend's resources. Called once at shutdown.
    async fn close(&self) {}
}

pub fn duplicate_name(name: &str) -> crate::error::AppError {
    crate::error::AppError::Conflict(format!("Product with name '{}' already exists", name))
}
