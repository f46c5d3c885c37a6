//! Sampling and output options sent with a generate-content request.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GenAiError, GenAiResult};
use crate::schema::Schema;

/// Encodes an `f32` as the `f64` with the same shortest decimal form, so
/// `0.7_f32` stays `0.7` after passing through `serde_json::Value`.
fn shortest_f32<S: Serializer>(value: &Option<f32>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => {
            let widened: f64 = value
                .to_string()
                .parse()
                .map_err(serde::ser::Error::custom)?;
            serializer.serialize_f64(widened)
        }
        None => serializer.serialize_none(),
    }
}

/// Every option is optional; unset options are omitted from the encoding
/// and the backend defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "shortest_f32"
    )]
    pub temperature: Option<f32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "shortest_f32"
    )]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(
        rename = "responseMIMEType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Schema>,
}

impl GenerationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn candidate_count(mut self, candidate_count: u32) -> Self {
        self.candidate_count = Some(candidate_count);
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn stop_sequences<S: Into<String>>(
        mut self,
        sequences: impl IntoIterator<Item = S>,
    ) -> Self {
        self.stop_sequences = Some(sequences.into_iter().map(Into::into).collect());
        self
    }

    /// Structured output: `mime_type` (usually `application/json`) constrained by `schema`.
    pub fn response(mut self, mime_type: impl Into<String>, schema: Option<Schema>) -> Self {
        self.response_mime_type = Some(mime_type.into());
        self.response_schema = schema;
        self
    }

    pub fn validate(&self) -> GenAiResult<()> {
        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(GenAiError::InvalidConfig(format!(
                "temperature {temperature} outside 0..=2"
            )));
        }
        if let Some(top_p) = self.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(GenAiError::InvalidConfig(format!(
                "topP {top_p} outside 0..=1"
            )));
        }
        if self.candidate_count == Some(0) {
            return Err(GenAiError::InvalidConfig(
                "candidateCount must be at least 1".to_owned(),
            ));
        }
        if self.response_schema.is_some() && self.response_mime_type.is_none() {
            return Err(GenAiError::InvalidConfig(
                "responseSchema requires responseMIMEType".to_owned(),
            ));
        }
        if let Some(schema) = &self.response_schema {
            schema.validate()?;
        }
        Ok(())
    }

    /// Pretty JSON with keys sorted at every level.
    pub fn to_json_pretty(&self) -> GenAiResult<String> {
        // serde_json::Map is ordered by key unless `preserve_order` is enabled.
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
