use crate::domain::test_case::TestCase;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Characters of source text embedded in a prompt; the rest is silently dropped.
pub const MAX_SOURCE_CHARS: usize = 12_000;

/// Text produced by an ingestion adapter. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_truncated(&self) -> bool {
        self.char_count() > MAX_SOURCE_CHARS
    }

    /// The portion of the document that is sent to the model.
    pub fn prompt_text(&self) -> &str {
        match self.text.char_indices().nth(MAX_SOURCE_CHARS) {
            Some((byte_index, _)) => &self.text[..byte_index],
            None => &self.text,
        }
    }
}

/// Opaque identifier of a suspended clarification round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHandle(String);

impl ContextHandle {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ContextHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisContext {
    pub source: SourceDocument,
    pub questions: Vec<String>,
    pub owner: String,
    pub created_at: Instant,
}

impl SynthesisContext {
    pub fn new(source: SourceDocument, questions: Vec<String>, owner: impl Into<String>) -> Self {
        Self {
            source,
            questions,
            owner: owner.into(),
            created_at: Instant::now(),
        }
    }
}

/// Answers keyed by the question's position, as a string ("0", "1", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(HashMap<String, String>);

impl AnswerSet {
    pub fn new(answers: HashMap<String, String>) -> Self {
        Self(answers)
    }

    pub fn answer_for(&self, index: usize) -> &str {
        self.0
            .get(&index.to_string())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Settings snapshot the orchestrator reads for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisSettings {
    pub max_test_cases: usize,
    pub enable_follow_up_questions: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationRequest {
    pub follow_up_questions: Vec<String>,
    pub context_id: ContextHandle,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseSuite {
    pub test_cases: Vec<TestCase>,
}

/// What a generation request resolves to; exactly one variant is populated.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SynthesisOutcome {
    Completed(TestCaseSuite),
    NeedsClarification(ClarificationRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisStage {
    Initial,
    AwaitingClarification,
    Refining,
    Done,
}

impl fmt::Display for SynthesisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SynthesisStage::Initial => "initial",
            SynthesisStage::AwaitingClarification => "awaiting_clarification",
            SynthesisStage::Refining => "refining",
            SynthesisStage::Done => "done",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text_truncates_by_characters() {
        let text = "é".repeat(MAX_SOURCE_CHARS + 5);
        let doc = SourceDocument::new(text);
        assert!(doc.is_truncated());
        assert_eq!(doc.prompt_text().chars().count(), MAX_SOURCE_CHARS);
    }

    #[test]
    fn test_prompt_text_keeps_short_documents_whole() {
        let doc = SourceDocument::new("Summary:Consent");
        assert!(!doc.is_truncated());
        assert_eq!(doc.prompt_text(), "Summary:Consent");
    }

    #[test]
    fn test_answer_set_defaults_missing_index_to_empty() {
        let answers: AnswerSet = [("0".to_string(), "Clinician".to_string())]
            .into_iter()
            .collect();
        assert_eq!(answers.answer_for(0), "Clinician");
        assert_eq!(answers.answer_for(2), "");
    }

    #[test]
    fn test_outcome_serializes_without_variant_tag() {
        let outcome = SynthesisOutcome::NeedsClarification(ClarificationRequest {
            follow_up_questions: vec!["Q?".to_string()],
            context_id: ContextHandle::from("abc".to_string()),
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["followUpQuestions"][0], "Q?");
        assert_eq!(value["contextId"], "abc");
        assert!(value.get("testCases").is_none());

        let outcome = SynthesisOutcome::Completed(TestCaseSuite { test_cases: vec![] });
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value["testCases"].as_array().unwrap().is_empty());
    }
}
