//! # Agora Shared
//!
//! Wire types shared between the API server and its clients.
//! Kept free of domain logic so it can be compiled for WASM front-ends.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
