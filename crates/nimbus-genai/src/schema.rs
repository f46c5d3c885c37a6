//! Response schema types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GenAiError, GenAiResult};

/// Value type of a schema node, encoded upper-case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Describes the shape of structured model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(rename = "required", default, skip_serializing_if = "Option::is_none")]
    pub required_properties: Option<Vec<String>>,
}

impl Schema {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            format: None,
            description: None,
            nullable: None,
            enum_values: None,
            items: None,
            properties: None,
            required_properties: None,
        }
    }

    pub fn string() -> Self {
        Self::new(DataType::String)
    }

    pub fn number() -> Self {
        Self::new(DataType::Number)
    }

    pub fn integer() -> Self {
        Self::new(DataType::Integer)
    }

    pub fn boolean() -> Self {
        Self::new(DataType::Boolean)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(DataType::Array)
        }
    }

    pub fn object<K: Into<String>>(
        properties: impl IntoIterator<Item = (K, Schema)>,
        required: impl IntoIterator<Item = K>,
    ) -> Self {
        let properties = properties
            .into_iter()
            .map(|(name, schema)| (name.into(), schema))
            .collect();
        let required: Vec<String> = required.into_iter().map(Into::into).collect();
        Self {
            properties: Some(properties),
            required_properties: (!required.is_empty()).then_some(required),
            ..Self::new(DataType::Object)
        }
    }

    /// String enumeration, e.g. `["NORTH", "SOUTH"]`.
    pub fn enumeration<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            format: Some("enum".to_owned()),
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::string()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Checks that every required property exists and that nested schemas
    /// are consistent with their type.
    pub fn validate(&self) -> GenAiResult<()> {
        if let Some(required) = &self.required_properties {
            let properties = self.properties.as_ref();
            for name in required {
                if !properties.is_some_and(|props| props.contains_key(name)) {
                    return Err(GenAiError::InvalidConfig(format!(
                        "required property `{name}` is not declared"
                    )));
                }
            }
        }
        if self.data_type == DataType::Array && self.items.is_none() {
            return Err(GenAiError::InvalidConfig(
                "array schema needs an items schema".to_owned(),
            ));
        }
        if let Some(items) = &self.items {
            items.validate()?;
        }
        for schema in self.properties.iter().flat_map(|props| props.values()) {
            schema.validate()?;
        }
        Ok(())
    }
}
