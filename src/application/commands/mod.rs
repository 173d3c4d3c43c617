// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the transport and the service
// - Commands accept raw JSON, return DTOs
// - Commands convert AppError into ErrorResponse
// - Commands NEVER contain business logic

pub mod gallery_commands;

pub use gallery_commands::*;
