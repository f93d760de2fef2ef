use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::models::{Product, ProductChanges};

/// Persistence operations on the product collection.
///
/// A live store is what the connection manager caches and what the request
/// gate hands to the product routes.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), AppError>;

    /// All products in natural (insertion) order.
    async fn find_all(&self) -> Result<Vec<Product>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Product>, AppError>;

    /// Apply `changes` and return the updated document, or `None` if no
    /// product has this id.
    async fn update(
        &self,
        id: &ObjectId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError>;

    /// Remove and return the product, or `None` if no product has this id.
    async fn delete(&self, id: &ObjectId) -> Result<Option<Product>, AppError>;

    /// Round-trip to the backing database.
    async fn ping(&self) -> Result<(), AppError>;
}
