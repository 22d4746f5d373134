//! HTTP handlers for the chat service.
//!
//! `/ask` itself lives in `service_core::chat`.

pub mod health;

pub use health::health_check;
pub use service_core::chat::ask;
