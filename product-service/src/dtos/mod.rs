pub mod products;

pub use products::{DataResponse, ProductInput, ProductPatch, ProductResponse};
