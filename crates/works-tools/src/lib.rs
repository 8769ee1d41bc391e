//! Validated tool surface over the Works REST API (tasks, task categories, calendars, events).
//!
//! Each tool validates its arguments locally, issues exactly one HTTP request with the
//! configured bearer token, and reshapes the JSON response. This crate is used by:
//! - `works-mcp` (the stdio MCP server)
//! - integration tests, through [`catalog::WorksToolSource`] or the per-tool functions
//!
//! It holds no mutable state: the only shared values are the [`config::WorksApiConfig`] and the
//! HTTP client handle.

pub mod calendars;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod request;
pub mod response;
pub mod semantics;
pub mod tasks;
pub mod validation;

pub use catalog::{WorksTool, WorksToolSource};
pub use client::{ApiResponse, WorksClient};
pub use config::{DEFAULT_BASE_URL, TOKEN_ENV, WorksApiConfig};
pub use error::{Result, WorksToolsError};
