// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between the transport (CLI) and the services
// - Translates raw JSON in and domain entities out into DTOs
// - Maps errors into ErrorResponse

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType};
pub use state::AppState;
