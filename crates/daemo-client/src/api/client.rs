//! API client for the Daemo REST API.
//!
//! This module provides the `DaemoClient` struct for making authenticated
//! requester calls over projects, tasks, assignments, templates and template
//! items.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info};

use super::error::{DaemoError, Result};
use super::pagination::Paginator;
use super::transport::Transport;
use crate::auth::{AuthHeader, CredentialStore, Credentials, TokenManager};
use crate::config::{ClientConfig, Environment};
use crate::models::{resource_id, NewProject, NewTask, NewTemplate, NewTemplateItem, Resource};

/// A client shared between tasks.
///
/// The mutex covers the credentials and the derived header together, so a
/// refresh can never be observed half-applied.
pub type SharedClient = Arc<tokio::sync::Mutex<DaemoClient>>;

/// Requester client for Daemo.
///
/// The client owns its credentials and the bearer header derived from them;
/// refreshing needs `&mut self`. Wrap it in a [`SharedClient`] to use one
/// instance from several tasks.
#[derive(Debug)]
pub struct DaemoClient {
    paginator: Paginator,
    transport: Transport,
    tokens: TokenManager,
    base_url: String,
    credentials: Credentials,
    credential_file: Option<PathBuf>,
    headers: HeaderMap,
}

impl DaemoClient {
    /// Create a client from configuration.
    ///
    /// Loads the credential file and, when `refresh_credentials` is set,
    /// refreshes the access token and saves it back before any other call.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let credential_file = config.credential_file.clone();
        let mut credentials = CredentialStore::load(credential_file.as_deref())?;

        let transport = Transport::new(config.timeout())?;
        let base_url = config.environment.base_url().to_string();
        let tokens = TokenManager::new(transport.clone(), &base_url);

        if config.refresh_credentials {
            tokens
                .refresh_and_save(&mut credentials, credential_file.as_deref())
                .await?;
        }

        Self::assemble(transport, tokens, base_url, credentials, credential_file)
    }

    /// Create a client from in-memory credentials, without a credential file.
    pub fn with_credentials(
        credentials: Credentials,
        environment: &Environment,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let transport = Transport::new(timeout)?;
        let base_url = environment.base_url().to_string();
        let tokens = TokenManager::new(transport.clone(), &base_url);
        Self::assemble(transport, tokens, base_url, credentials, None)
    }

    fn assemble(
        transport: Transport,
        tokens: TokenManager,
        base_url: String,
        credentials: Credentials,
        credential_file: Option<PathBuf>,
    ) -> Result<Self> {
        let headers = AuthHeader::from_credentials(&credentials)?.to_header_map()?;
        debug!(base_url = %base_url, "Daemo client ready");
        Ok(Self {
            paginator: Paginator::new(transport.clone()),
            transport,
            tokens,
            base_url,
            credentials,
            credential_file,
            headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credential_file(&self) -> Option<&Path> {
        self.credential_file.as_deref()
    }

    /// Refresh the access token and re-derive the auth header.
    ///
    /// With `save`, the new credentials are written to the file the client
    /// was loaded from.
    pub async fn refresh_credentials(&mut self, save: bool) -> Result<()> {
        // Credentials and header change together or not at all
        let mut refreshed = self.credentials.clone();
        self.tokens.refresh(&mut refreshed).await?;
        let headers = AuthHeader::from_credentials(&refreshed)?.to_header_map()?;
        self.credentials = refreshed;
        self.headers = headers;
        if save {
            let path = self.credential_file.as_deref().ok_or_else(|| {
                DaemoError::Configuration("client has no credential file to save to".to_string())
            })?;
            CredentialStore::save(&self.credentials, Some(path))?;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    async fn get_resource(&self, path: &str) -> Result<Resource> {
        let url = self.url(path);
        let value = self.transport.get(&url, &self.headers).await?;
        into_resource(&url, value)
    }

    async fn create(&self, path: &str, body: &impl serde::Serialize) -> Result<Resource> {
        let url = self.url(path);
        let value = self.transport.post(&url, body, &self.headers).await?;
        into_resource(&url, value)
    }

    async fn create_for_id(&self, path: &str, body: &impl serde::Serialize) -> Result<String> {
        let url = self.url(path);
        let resource = self.create(path, body).await?;
        resource_id(&resource).ok_or_else(|| DaemoError::protocol(&url, "response has no id"))
    }

    async fn action(&self, path: &str) -> Result<Value> {
        self.transport
            .post_action(&self.url(path), &self.headers)
            .await
    }

    async fn destroy(&self, path: &str) -> Result<()> {
        self.transport.delete(&self.url(path), &self.headers).await
    }

    async fn list(&self, path: &str, max_count: Option<u64>) -> Result<Vec<Resource>> {
        self.paginator
            .collect(&self.url(path), &self.headers, max_count)
            .await
    }

    // ===== Projects =====

    /// Create a project together with an empty template.
    pub async fn create_project(&self, project: &NewProject) -> Result<Resource> {
        let payload = project.payload()?;
        let created = self.create("projects/", &payload).await?;
        info!(name = %project.name, "Created project");
        Ok(created)
    }

    /// List the requester's projects; `max_count` stops paging early.
    pub async fn get_projects(&self, max_count: Option<u64>) -> Result<Vec<Resource>> {
        self.list("projects/?account_type=requester", max_count).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Resource> {
        self.get_resource(&format!("projects/{}/", project_id)).await
    }

    pub async fn destroy_project(&self, project_id: &str) -> Result<()> {
        self.destroy(&format!("projects/{}/", project_id)).await
    }

    pub async fn publish_project(&self, project_id: &str) -> Result<()> {
        self.action(&format!("projects/{}/publish/", project_id))
            .await?;
        info!(project_id = project_id, "Published project");
        Ok(())
    }

    // ===== Tasks =====

    pub async fn get_tasks(&self, project_id: &str, max_count: Option<u64>) -> Result<Vec<Resource>> {
        self.list(&format!("projects/{}/tasks/", project_id), max_count)
            .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Resource> {
        self.get_resource(&format!("tasks/{}/", task_id)).await
    }

    /// Create a task and return its id.
    pub async fn create_task(&self, project_id: &str, task: &NewTask) -> Result<String> {
        self.create_for_id(&format!("tasks/?project_id={}", project_id), task)
            .await
    }

    pub async fn destroy_task(&self, task_id: &str) -> Result<()> {
        self.destroy(&format!("tasks/{}/", task_id)).await
    }

    /// Results submitted for every assignment of a task.
    pub async fn get_task_results(&self, task_id: &str) -> Result<Vec<Resource>> {
        self.list(&format!("tasks/{}/assignment-results/", task_id), None)
            .await
    }

    // ===== Assignments =====

    pub async fn get_assignments(&self, task_id: &str) -> Result<Vec<Resource>> {
        self.list(&format!("assignments/?task_id={}", task_id), None)
            .await
    }

    pub async fn get_assignment(&self, assignment_id: &str) -> Result<Resource> {
        self.get_resource(&format!("assignments/{}/", assignment_id))
            .await
    }

    pub async fn approve_assignment(&self, assignment_id: &str) -> Result<Value> {
        self.action(&format!("assignments/{}/approve/", assignment_id))
            .await
    }

    pub async fn return_assignment(&self, assignment_id: &str) -> Result<Value> {
        self.action(&format!("assignments/{}/return/", assignment_id))
            .await
    }

    pub async fn reject_assignment(&self, assignment_id: &str) -> Result<Value> {
        self.action(&format!("assignments/{}/reject/", assignment_id))
            .await
    }

    // ===== Templates =====

    pub async fn get_templates(&self) -> Result<Vec<Resource>> {
        self.list("templates/", None).await
    }

    pub async fn get_template(&self, template_id: &str) -> Result<Resource> {
        self.get_resource(&format!("templates/{}/", template_id))
            .await
    }

    /// Create a template and return its id.
    pub async fn create_template(&self, template: &NewTemplate) -> Result<String> {
        self.create_for_id("templates/", template).await
    }

    // ===== Template items =====

    pub async fn get_template_items(&self, template_id: &str) -> Result<Vec<Resource>> {
        self.list(&format!("template-items/?template_id={}", template_id), None)
            .await
    }

    pub async fn get_template_item(&self, template_item_id: &str) -> Result<Resource> {
        self.get_resource(&format!("template-items/{}/", template_item_id))
            .await
    }

    /// Create a template item and return its id.
    ///
    /// Fails with a validation error, before any request, when the item type
    /// needs fields that are not set.
    pub async fn create_template_item(&self, item: &NewTemplateItem) -> Result<String> {
        let payload = item.payload()?;
        self.create_for_id("template-items/", &payload).await
    }

    pub async fn destroy_template_item(&self, template_item_id: &str) -> Result<()> {
        self.destroy(&format!("template-items/{}/", template_item_id))
            .await
    }
}

fn into_resource(url: &str, value: Value) -> Result<Resource> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DaemoError::protocol(
            url,
            format!("expected a JSON object, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
