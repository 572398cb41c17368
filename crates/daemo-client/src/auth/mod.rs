//! Authentication module for managing requester credentials.
//!
//! This module provides:
//! - `CredentialStore`: JSON credential file load/save
//! - `AuthHeader`: bearer headers derived from the access token
//! - `TokenManager`: refresh-token grant against the OAuth2 endpoint
//!
//! Credentials are only written back to disk when a caller asks for it.

pub mod credentials;
pub mod header;
pub mod token;

pub use credentials::{CredentialStore, Credentials};
pub use header::{json_headers, AuthHeader};
pub use token::TokenManager;
