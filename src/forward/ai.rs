//! AI completion client: fill missing specs on an extracted record.

use crate::extraction::{ProductRecord, SpecPair};
use crate::forward::error::ForwardError;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Task name the completion endpoint dispatches on.
const COMPLETE_TASK: &str = "complete_product_specs";

/// Timeout for completion requests.
const COMPLETE_TIMEOUT: Duration = Duration::from_secs(30);

/// What the AI endpoint sends back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecCompletion {
    /// Specs the model filled in. Separate from the record's own `specs`.
    #[serde(default)]
    pub specs_filled: Option<Vec<SpecPair>>,
    /// Free-form model notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request envelope for the completion endpoint.
#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    task: &'static str,
    input: &'a ProductRecord,
}

/// Client for the AI completion endpoint.
#[derive(Debug, Clone)]
pub struct AiClient {
    client: reqwest::Client,
    api_url: String,
}

impl AiClient {
    /// Create a client with an explicit endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Create a client from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.ai_api_url)
    }

    /// Use a shared HTTP client instead of a private one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Ask the AI service to complete the record's specs.
    ///
    /// Sends `{"task": "complete_product_specs", "input": <record>}`. A
    /// non-success status is an error carrying the status code.
    pub async fn complete(&self, record: &ProductRecord) -> Result<SpecCompletion, ForwardError> {
        debug!(url = %self.api_url, "requesting spec completion");
        let response = self
            .client
            .post(&self.api_url)
            .json(&CompleteRequest {
                task: COMPLETE_TASK,
                input: record,
            })
            .timeout(COMPLETE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::AiStatus {
                status: status.as_u16(),
            });
        }

        let completion = response.json::<SpecCompletion>().await?;
        debug!(
            filled = completion.specs_filled.as_ref().map_or(0, Vec::len),
            "completion received"
        );
        Ok(completion)
    }
}

/// Merge a completion into the record's transmission form.
///
/// The completion rides alongside the record's own fields as `specs_filled`
/// and `notes` keys; it does not overwrite `specs`. Both keys are always
/// present in the merged object, null when the service returned nothing.
pub fn merge_completion(record: &ProductRecord, completion: &SpecCompletion) -> serde_json::Value {
    let mut merged = serde_json::to_value(record).unwrap_or_else(|_| serde_json::json!({}));
    if let serde_json::Value::Object(map) = &mut merged {
        map.insert(
            "specs_filled".to_string(),
            serde_json::to_value(&completion.specs_filled).unwrap_or(serde_json::Value::Null),
        );
        map.insert(
            "notes".to_string(),
            serde_json::to_value(&completion.notes).unwrap_or(serde_json::Value::Null),
        );
    }
    merged
}
