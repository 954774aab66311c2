pub mod aggregate;
pub mod config;
pub mod cycle_phase;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod store;
pub mod summary;
pub mod view;
pub mod window;
