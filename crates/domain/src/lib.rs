//! Domain-level building blocks shared by the storage adapters and the HTTP
//! API: models, persistence contracts, shipping cost resolution, address
//! events and environment-driven configuration.

pub mod config;
pub mod model;
pub mod services;
pub mod storage;

pub use model::*;
pub use services::*;
pub use storage::*;
