//! REST API client module for the Daemo crowdsourcing platform.
//!
//! This module provides the `DaemoClient` for managing projects, tasks,
//! assignments and templates, plus the layers it is built on: a single
//! request `Transport` and a `Paginator` for list endpoints.
//!
//! The API uses OAuth2 bearer token authentication; see `crate::auth`.

pub mod client;
pub mod error;
pub mod pagination;
pub mod transport;

pub use client::{DaemoClient, SharedClient};
pub use error::{DaemoError, Result};
pub use pagination::{Page, Paginator};
pub use transport::{HttpMethod, Transport};
