//! # API Shared
//!
//! Shared utilities and definitions for the DDX APIs.
//!
//! Contains:
//! - Request/response wire types (`wire` module) with OpenAPI schemas
//! - Conversions from `ddx-core` domain types into wire types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and `cli` so both render identical JSON.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
