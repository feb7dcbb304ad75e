//! HTTP API handlers for trf-ca

pub mod catalog;
pub mod charts;
pub mod health;

pub use catalog::catalog_routes;
pub use charts::chart_routes;
pub use health::health_routes;
