use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// A product document as stored in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_in_stock() -> bool {
    true
}

/// Validated data for a complete product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}

/// Validated set of fields to overwrite on an existing product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

/// Current time at the precision BSON dates keep (milliseconds), so values
/// read back from the database compare equal to what was written.
pub fn now_utc() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

impl Product {
    pub fn new(fields: ProductFields) -> Self {
        let now = now_utc();
        Self {
            id: ObjectId::new(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            in_stock: fields.in_stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the supplied fields and bump `updated_at`.
    pub fn apply(&mut self, changes: ProductChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(in_stock) = changes.in_stock {
            self.in_stock = in_stock;
        }
        self.updated_at = now;
    }
}

impl From<ProductFields> for ProductChanges {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: Some(fields.name),
            description: Some(fields.description),
            price: Some(fields.price),
            category: Some(fields.category),
            in_stock: Some(fields.in_stock),
        }
    }
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.in_stock.is_none()
    }

    /// `$set` document for these changes, always including `updatedAt`.
    pub fn to_set_document(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updatedAt": bson::DateTime::from_chrono(now) };
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(category) = &self.category {
            set.insert("category", category.as_str());
        }
        if let Some(in_stock) = self.in_stock {
            set.insert("inStock", in_stock);
        }
        doc! { "$set": set }
    }
}
