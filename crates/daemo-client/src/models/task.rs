use serde::Serialize;
use serde_json::Value;

/// Arguments for creating a task in a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    /// Values substituted into the template's `{{placeholders}}`.
    pub data: Value,
    /// Overrides the project's default price for this task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl NewTask {
    pub fn new(data: Value) -> Self {
        Self { data, price: None }
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}
