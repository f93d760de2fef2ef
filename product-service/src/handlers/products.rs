//! Product CRUD handlers, mounted under `/api/products` behind the
//! database gate.

use axum::{extract::Path, http::StatusCode, Json};
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::dtos::{DataResponse, ProductInput, ProductPatch, ProductResponse};
use crate::middleware::Store;
use crate::models::{Product, ProductChanges};
use crate::utils::JsonBody;

type ProductResult = Result<Json<DataResponse<ProductResponse>>, AppError>;

fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id)
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid product id: {}", id)))
}

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Product not found"))
}

/// GET /api/products
#[tracing::instrument(skip(store))]
pub async fn list_products(
    Store(store): Store,
) -> Result<Json<DataResponse<Vec<ProductResponse>>>, AppError> {
    let products = store.find_all().await?;
    let responses: Vec<ProductResponse> =
        products.into_iter().map(ProductResponse::from).collect();

    Ok(Json(DataResponse::list(responses)))
}

/// GET /api/products/:id
#[tracing::instrument(skip(store))]
pub async fn get_product(Store(store): Store, Path(id): Path<String>) -> ProductResult {
    let id = parse_id(&id)?;
    let product = store.find_by_id(&id).await?.ok_or_else(not_found)?;

    Ok(Json(DataResponse::new(ProductResponse::from(product))))
}

/// POST /api/products
#[tracing::instrument(skip(store, input))]
pub async fn create_product(
    Store(store): Store,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<DataResponse<ProductResponse>>), AppError> {
    let product = Product::new(input.validate_new()?);
    store.insert(&product).await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ProductResponse::from(product))),
    ))
}

/// PUT /api/products/:id - full replacement, validated like a create.
#[tracing::instrument(skip(store, input))]
pub async fn replace_product(
    Store(store): Store,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ProductInput>,
) -> ProductResult {
    let id = parse_id(&id)?;
    let changes = ProductChanges::from(input.validate_new()?);
    let product = store.update(&id, &changes).await?.ok_or_else(not_found)?;

    tracing::info!(product_id = %product.id, "Product replaced");
    Ok(Json(DataResponse::new(ProductResponse::from(product))))
}

/// PATCH /api/products/:id - only the supplied fields change.
#[tracing::instrument(skip(store, patch))]
pub async fn update_product(
    Store(store): Store,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ProductPatch>,
) -> ProductResult {
    let id = parse_id(&id)?;
    let changes = patch.validate_changes()?;
    if changes.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "No updatable fields supplied"
        )));
    }
    let product = store.update(&id, &changes).await?.ok_or_else(not_found)?;

    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(DataResponse::new(ProductResponse::from(product))))
}

/// DELETE /api/products/:id
#[tracing::instrument(skip(store))]
pub async fn delete_product(Store(store): Store, Path(id): Path<String>) -> ProductResult {
    let id = parse_id(&id)?;
    let product = store.delete(&id).await?.ok_or_else(not_found)?;

    tracing::info!(product_id = %product.id, "Product deleted");
    Ok(Json(
        DataResponse::new(ProductResponse::from(product)).with_message("Product deleted"),
    ))
}
