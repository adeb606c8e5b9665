//! Actiongate - Action Authorization & Dispatch Layer
//!
//! This crate decides whether the current actor may invoke a named admin
//! action (bulk or single-record), resolves the concrete record set the
//! action applies to, and exposes the HTTP routes for each action.
//! Storage, UI and the ORM stay behind collaborator traits.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod query;
pub mod registry;
pub mod repository;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use config::AdminConfig;
pub use error::{AppError, Result};
