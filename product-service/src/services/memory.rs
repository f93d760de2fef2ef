use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::store::ProductStore;
use crate::models::{now_utc, Product, ProductChanges};

/// Process-local product store used by tests.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
    unreachable: AtomicBool,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` fail until reachability is restored.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: &Product) -> Result<(), AppError> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Product>, AppError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        Ok(products.iter_mut().find(|p| &p.id == id).map(|product| {
            product.apply(changes.clone(), now_utc());
            product.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write().await;
        Ok(products
            .iter()
            .position(|p| &p.id == id)
            .map(|index| products.remove(index)))
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection pool cleared: server unreachable"
            )));
        }
        Ok(())
    }
}
