pub mod product;

pub use product::{now_utc, Product, ProductChanges, ProductFields};
