use serde::Serialize;
use serde_json::Value;

use crate::api::{DaemoError, Result};

/// Assignments per task when not specified.
const DEFAULT_REPETITION: u32 = 1;

/// Task timeout when not specified.
const DEFAULT_TIMEOUT: u32 = 120;

/// Arguments for creating a project.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    /// Price paid per task.
    pub price: f64,
    /// Name of the template created alongside the project.
    pub template_name: String,
    /// Number of assignments each task should get.
    pub repetition: u32,
    /// Maximum time allocated to a task before it expires.
    pub timeout: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectPayload<'a> {
    name: &'a str,
    price: f64,
    repetition: u32,
    timeout: u32,
    template: TemplateStub<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateStub<'a> {
    name: &'a str,
    items: Vec<Value>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, price: f64, template_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            template_name: template_name.into(),
            repetition: DEFAULT_REPETITION,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn repetition(mut self, repetition: u32) -> Self {
        self.repetition = repetition;
        self
    }

    pub fn timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DaemoError::Validation(
                "'name' of project needs to be a non-empty string".to_string(),
            ));
        }
        // Also rejects NaN
        if !(self.price > 0.0) {
            return Err(DaemoError::Validation(
                "'price' needs to be a positive value".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Result<ProjectPayload<'_>> {
        self.validate()?;
        Ok(ProjectPayload {
            name: &self.name,
            price: self.price,
            repetition: self.repetition,
            timeout: self.timeout,
            template: TemplateStub {
                name: &self.template_name,
                items: Vec::new(),
            },
        })
    }
}
