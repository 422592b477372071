use crate::domain::error::{IngestionFailure, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fields that may hold acceptance criteria, tried in this order.
pub const ACCEPTANCE_FIELDS: [&str; 3] =
    ["customfield_10034", "Acceptance Criteria", "acceptanceCriteria"];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct JiraClient {
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IngestionFailure::TicketTransport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetches a story and flattens it to
    /// `Summary:<summary>Description:<description>Acceptance Criteria:<acceptance>`.
    pub async fn fetch_story(&self, base_url: &str, story_key: &str, token: &str) -> Result<String> {
        if token.trim().is_empty() {
            return Err(IngestionFailure::MissingAuthToken.into());
        }
        url::Url::parse(base_url)
            .map_err(|e| IngestionFailure::TicketTransport(format!("invalid base URL: {}", e)))?;

        let url = format!(
            "{}/rest/api/3/issue/{}",
            base_url.trim_end_matches('/'),
            story_key.trim()
        );
        debug!(%url, "Fetching Jira story");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Basic {}", token.trim()))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| IngestionFailure::TicketTransport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(IngestionFailure::TicketFetch { status, body }.into());
        }

        let issue: Value = response
            .json()
            .await
            .map_err(|e| IngestionFailure::TicketMalformed(e.to_string()))?;
        let empty = Value::Object(Default::default());
        Ok(compose_story(issue.get("fields").unwrap_or(&empty)))
    }
}

pub(crate) fn compose_story(fields: &Value) -> String {
    let summary = fields
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let description = fields
        .get("description")
        .and_then(field_text)
        .unwrap_or_default();
    let acceptance = ACCEPTANCE_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key).and_then(field_text))
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    format!(
        "Summary:{}Description:{}Acceptance Criteria:{}",
        summary, description, acceptance
    )
}

/// Plain strings are used verbatim; document trees are flattened.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(_) => {
            let mut out = String::new();
            flatten_document(value, &mut out);
            Some(out)
        }
        _ => None,
    }
}

/// Appends every `text` field of an ADF-style tree in document order.
fn flatten_document(node: &Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            flatten_document(child, out);
        }
    }
}
