use crate::domain::synthesis::SynthesisSettings;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Runtime-editable settings exposed through the admin routes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminSettings {
    pub gemini_api_key: String,
    pub jira_token: String,
    #[validate(range(min = 1, message = "maxTestCases must be a positive integer"))]
    pub max_test_cases: u32,
    pub enable_follow_up_questions: bool,
}

impl AdminSettings {
    pub fn synthesis_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            max_test_cases: self.max_test_cases as usize,
            enable_follow_up_questions: self.enable_follow_up_questions,
        }
    }
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            jira_token: String::new(),
            max_test_cases: 10,
            enable_follow_up_questions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_test_cases_is_rejected() {
        let settings = AdminSettings {
            max_test_cases: 0,
            ..AdminSettings::default()
        };
        assert!(settings.validate().is_err());
        assert!(AdminSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let settings: AdminSettings =
            serde_json::from_str(r#"{"maxTestCases": 5, "enableFollowUpQuestions": false}"#)
                .unwrap();
        assert_eq!(settings.max_test_cases, 5);
        assert!(!settings.enable_follow_up_questions);
        assert!(settings.jira_token.is_empty());
    }
}
