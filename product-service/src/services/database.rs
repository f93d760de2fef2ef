use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{ClientOptions, FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;
use std::sync::Arc;

use super::connection::Connector;
use super::store::ProductStore;
use crate::config::MongoConfig;
use crate::models::{now_utc, Product, ProductChanges};

const APP_NAME: &str = "product-service";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    /// Open a client with bounded timeouts and verify it with a ping, so an
    /// unreachable server fails here instead of on the first query.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(
            server_selection_timeout_ms = config.server_selection_timeout_ms,
            connect_timeout_ms = config.connect_timeout_ms,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            AppError::ConnectionError(anyhow::Error::new(e))
        })?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.connect_timeout = Some(config.connect_timeout());

        let client = MongoClient::with_options(options)
            .map_err(|e| AppError::ConnectionError(anyhow::Error::new(e)))?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database));

        let mongo = Self { client, db };
        mongo
            .health_check()
            .await
            .map_err(|e| AppError::ConnectionError(anyhow::anyhow!("{}", e)))?;

        tracing::info!(database = %mongo.db.name(), "Successfully connected to MongoDB database");
        Ok(mongo)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection("products")
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ProductStore for MongoDb {
    async fn insert(&self, product: &Product) -> Result<(), AppError> {
        self.products()
            .insert_one(product, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert product: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        let cursor = self.products().find(doc! {}, None).await.map_err(|e| {
            tracing::error!("Failed to list products: {}", e);
            AppError::from(e)
        })?;
        cursor.try_collect::<Vec<Product>>().await.map_err(|e| {
            tracing::error!("Failed to read product cursor: {}", e);
            AppError::from(e)
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Product>, AppError> {
        self.products()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(product_id = %id, "Failed to find product: {}", e);
                AppError::from(e)
            })
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.products()
            .find_one_and_update(
                doc! { "_id": *id },
                changes.to_set_document(now_utc()),
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(product_id = %id, "Failed to update product: {}", e);
                AppError::from(e)
            })
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Product>, AppError> {
        self.products()
            .find_one_and_delete(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(product_id = %id, "Failed to delete product: {}", e);
                AppError::from(e)
            })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.health_check().await
    }
}

/// Connects to the MongoDB deployment named by `MONGO_URI`.
pub struct MongoConnector {
    config: MongoConfig,
}

impl MongoConnector {
    pub fn new(config: MongoConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self) -> Result<Arc<dyn ProductStore>, AppError> {
        Ok(Arc::new(MongoDb::connect(&self.config).await?))
    }
}
