pub mod db_gate;
pub mod fallback;

pub use db_gate::{db_gate_middleware, Store};
pub use fallback::{handle_panic, route_not_found};
