pub mod health;
pub mod metrics;
pub mod products;

pub use health::{health_check, readiness_check, welcome};
pub use metrics::metrics;
pub use products::{
    create_product, delete_product, get_product, list_products, replace_product, update_product,
};
