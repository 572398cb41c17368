use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{DaemoError, Result};

/// Arguments for creating a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTemplate {
    pub name: String,
    /// Template item resources, passed through as-is.
    pub items: Vec<Value>,
}

impl NewTemplate {
    pub fn new(name: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Text,
    Instructions,
    FileUpload,
    Iframe,
    Audio,
    Image,
    Radio,
    SelectList,
    Checkbox,
}

/// Sub type of a `text` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    Number,
    TextArea,
    Text,
}

/// Option layout for choice items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Row,
    Column,
}

/// One choice of a radio, checkbox or select list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOption {
    pub value: String,
    pub position: u32,
}

impl ItemOption {
    pub fn new(value: impl Into<String>, position: u32) -> Self {
        Self {
            value: value.into(),
            position,
        }
    }
}

/// Fields an item type needs beyond the common ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRequirements {
    /// `src` must be set (media items).
    pub src: bool,
    /// `layout`, `shuffle` and `options` must be set (choice items).
    pub choices: bool,
}

const PLAIN: ItemRequirements = ItemRequirements {
    src: false,
    choices: false,
};
const MEDIA: ItemRequirements = ItemRequirements {
    src: true,
    choices: false,
};
const CHOICE: ItemRequirements = ItemRequirements {
    src: false,
    choices: true,
};

impl ItemType {
    pub const ALL: [ItemType; 9] = [
        ItemType::Text,
        ItemType::Instructions,
        ItemType::FileUpload,
        ItemType::Iframe,
        ItemType::Audio,
        ItemType::Image,
        ItemType::Radio,
        ItemType::SelectList,
        ItemType::Checkbox,
    ];

    pub fn requirements(self) -> ItemRequirements {
        match self {
            ItemType::Iframe | ItemType::Audio | ItemType::Image => MEDIA,
            ItemType::Radio | ItemType::SelectList | ItemType::Checkbox => CHOICE,
            ItemType::Text | ItemType::Instructions | ItemType::FileUpload => PLAIN,
        }
    }
}

/// Arguments for creating a template item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplateItem {
    pub name: String,
    pub item_type: ItemType,
    pub sub_type: Option<SubType>,
    /// Id of the item this one follows; `None` for the first item.
    pub predecessor: Option<String>,
    pub required: bool,
    /// Id of the template the item belongs to.
    pub template: String,
    /// Question shown above the item; may contain `{{placeholders}}`.
    pub question: String,
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
    pub placeholder: Option<String>,
    pub src: Option<String>,
    pub layout: Option<Layout>,
    pub shuffle: Option<bool>,
    pub options: Option<Vec<ItemOption>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TemplateItemPayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    item_type: ItemType,
    sub_type: Option<SubType>,
    predecessor: Option<&'a str>,
    required: bool,
    template: &'a str,
    aux_attributes: AuxAttributes<'a>,
}

#[derive(Debug, Serialize)]
struct AuxAttributes<'a> {
    question: Question<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shuffle_options: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a [ItemOption]>,
}

#[derive(Debug, Serialize)]
struct Question<'a> {
    value: &'a str,
    data_source: Option<&'a str>,
}

impl NewTemplateItem {
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        template: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            item_type,
            sub_type: None,
            predecessor: None,
            required: false,
            template: template.into(),
            question: question.into(),
            max_length: None,
            min_length: None,
            placeholder: None,
            src: None,
            layout: None,
            shuffle: None,
            options: None,
        }
    }

    pub fn sub_type(mut self, sub_type: SubType) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    pub fn predecessor(mut self, id: impl Into<String>) -> Self {
        self.predecessor = Some(id.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Set layout, shuffle and options together, as choice items need all three.
    pub fn choices(mut self, layout: Layout, shuffle: bool, options: Vec<ItemOption>) -> Self {
        self.layout = Some(layout);
        self.shuffle = Some(shuffle);
        self.options = Some(options);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let needs = self.item_type.requirements();
        if needs.src && self.src.is_none() {
            return Err(DaemoError::Validation(
                "src must be set when type is iframe, audio or image".to_string(),
            ));
        }
        if needs.choices
            && (self.layout.is_none() || self.shuffle.is_none() || self.options.is_none())
        {
            return Err(DaemoError::Validation(
                "layout, shuffle and options must be set for checkbox, radio and select_list"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> Result<TemplateItemPayload<'_>> {
        self.validate()?;
        let needs = self.item_type.requirements();

        let mut aux = AuxAttributes {
            question: Question {
                value: &self.question,
                data_source: None,
            },
            max_length: self.max_length,
            min_length: self.min_length,
            placeholder: self.placeholder.as_deref(),
            src: None,
            layout: None,
            shuffle_options: None,
            options: None,
        };
        if needs.src {
            aux.src = self.src.as_deref();
        }
        if needs.choices {
            aux.layout = self.layout;
            aux.shuffle_options = self.shuffle;
            aux.options = self.options.as_deref();
        }

        Ok(TemplateItemPayload {
            name: &self.name,
            item_type: self.item_type,
            sub_type: self.sub_type,
            predecessor: self.predecessor.as_deref(),
            required: self.required,
            template: &self.template,
            aux_attributes: aux,
        })
    }
}
