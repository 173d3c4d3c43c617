// src/error/mod.rs
//
// Crate-wide error type

pub mod types;

pub use types::{AppError, AppResult, ErrorKind};
