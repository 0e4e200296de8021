//! Narrator HTTP gateway
//!
//! Serves the upload page, accepts images on `/process_image`, and hosts the
//! generated narration audio.

pub mod error;
pub mod health_api;
pub mod index_page;
pub mod process_image;
pub mod server;

pub use error::ApiError;
pub use index_page::load_index_page;
pub use server::{build_router, start_server, GatewayState, RouterSettings};
