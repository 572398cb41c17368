//! Data models for Daemo resources.
//!
//! Resources returned by the API (projects, tasks, assignments, templates,
//! template items) are kept as open JSON maps. Only the payloads this client
//! sends are typed:
//!
//! - `NewProject`: project creation with name/price checks
//! - `NewTask`: task data plus optional price override
//! - `NewTemplate`, `NewTemplateItem`: templates and their items, with the
//!   per-item-type required fields in `ItemType::requirements`

pub mod project;
pub mod task;
pub mod template;

use serde_json::{Map, Value};

pub use project::NewProject;
pub use task::NewTask;
pub use template::{
    ItemOption, ItemRequirements, ItemType, Layout, NewTemplate, NewTemplateItem, SubType,
};

/// A resource object as returned by the API.
pub type Resource = Map<String, Value>;

/// The `id` of a resource, as a string whether the server sent a string or a number.
pub fn resource_id(resource: &Resource) -> Option<String> {
    match resource.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
