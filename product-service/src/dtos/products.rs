use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::models::{Product, ProductChanges, ProductFields};

/// Body of `POST /api/products` and `PUT /api/products/:id`.
///
/// Every field is optional at the JSON level so that a missing field is
/// reported by validation, alongside every other violation, instead of
/// failing deserialization on the first one.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(
        required(message = "Product name is required"),
        length(min = 1, message = "Product name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = 1, message = "Description is required")
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Price is required"),
        range(min = 0.0, message = "Price must be a non-negative number")
    )]
    pub price: Option<f64>,

    #[validate(
        required(message = "Category is required"),
        length(min = 1, message = "Category is required")
    )]
    pub category: Option<String>,

    pub in_stock: Option<bool>,
}

impl ProductInput {
    /// Trim and validate into a complete product. `inStock` defaults to true.
    pub fn validate_new(mut self) -> Result<ProductFields, ValidationErrors> {
        self.name = self.name.map(|name| name.trim().to_string());
        self.validate()?;

        // `required` above guarantees all four are present.
        match (self.name, self.description, self.price, self.category) {
            (Some(name), Some(description), Some(price), Some(category)) => Ok(ProductFields {
                name,
                description,
                price,
                category,
                in_stock: self.in_stock.unwrap_or(true),
            }),
            _ => Err(ValidationErrors::new()),
        }
    }
}

/// Body of `PATCH /api/products/:id`. Only supplied fields are checked.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Price must be a non-negative number"))]
    pub price: Option<f64>,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,

    pub in_stock: Option<bool>,
}

impl ProductPatch {
    pub fn validate_changes(mut self) -> Result<ProductChanges, ValidationErrors> {
        self.name = self.name.map(|name| name.trim().to_string());
        self.validate()?;

        Ok(ProductChanges {
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            in_stock: self.in_stock,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            in_stock: product.in_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Success envelope shared by every product route.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            count: None,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> DataResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            message: None,
            data,
        }
    }
}
