//! Relay that commits uploaded media and a gallery manifest to a content store.
#[macro_use]
mod utils;
#[macro_use]
pub mod error;
pub mod api;
pub mod context;
pub mod cors;
pub mod handlers;
pub mod logger;
pub mod manifest;
pub mod media;
pub mod store;
