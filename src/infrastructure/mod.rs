//! Infrastructure layer - Stores, external services and wiring

pub mod cache;
pub mod geocoder;
pub mod http_client;
pub mod logging;
pub mod observability;
pub mod services;
