pub mod connection;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use connection::{ConnectionManager, Connector, ReadyState};
pub use database::{MongoConnector, MongoDb};
pub use memory::InMemoryProductStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::ProductStore;
