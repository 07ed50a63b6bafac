//! Network and disk adapters for the five-card draw controller.

pub mod config;
pub mod http;
pub mod store;

pub use config::*;
pub use http::*;
pub use store::*;
