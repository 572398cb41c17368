//! Requester client for the Daemo crowdsourcing platform.
//!
//! The crate is layered the same way every call flows:
//!
//! - [`auth`]: credential file, bearer header and refresh-token grant
//! - [`api`]: single-request transport, cursor pagination and the
//!   [`DaemoClient`] resource operations built on them
//! - [`models`]: resource map type and typed request payloads
//! - [`config`]: environment selection and client configuration
//!
//! ```no_run
//! use daemo_client::{ClientConfig, DaemoClient, Environment, NewProject};
//!
//! # async fn run() -> daemo_client::Result<()> {
//! let config = ClientConfig::new("credentials.json", Environment::Sandbox)
//!     .refresh_credentials(true);
//! let client = DaemoClient::new(config).await?;
//!
//! let project = client
//!     .create_project(&NewProject::new("Image Captioning", 0.2, "Captioning Template"))
//!     .await?;
//! let recent = client.get_projects(Some(20)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{DaemoClient, DaemoError, HttpMethod, Page, Paginator, Result, SharedClient, Transport};
pub use auth::{AuthHeader, CredentialStore, Credentials, TokenManager};
pub use config::{ClientConfig, Environment};
pub use models::{
    ItemOption, ItemType, Layout, NewProject, NewTask, NewTemplate, NewTemplateItem, Resource,
    SubType,
};
