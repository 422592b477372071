use crate::domain::test_case::TestCase;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedSuite {
    pub(crate) test_cases: Vec<TestCase>,
    pub(crate) skipped_entries: usize,
}

/// Pulls a test-case suite out of raw model text.
///
/// The whole text is tried first, then the span from the first `{` to the
/// last `}`. `None` means no JSON object could be recovered at all, which the
/// caller treats the same as an empty suite. Never panics.
pub(crate) fn parse_synthesis_output(text: &str) -> Option<ParsedSuite> {
    let object = parse_object(text).or_else(|| braced_span(text).and_then(parse_object))?;
    Some(suite_from_object(object))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

fn suite_from_object(mut object: Map<String, Value>) -> ParsedSuite {
    let entries = match object.remove("testCases") {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let mut test_cases = Vec::with_capacity(entries.len());
    let mut skipped_entries = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<TestCase>(entry) {
            Ok(case) => test_cases.push(case),
            Err(err) => {
                skipped_entries += 1;
                debug!(index, error = %err, "Skipping malformed test case entry");
            }
        }
    }

    ParsedSuite {
        test_cases,
        skipped_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::Priority;

    const SUITE: &str = r#"{"testCases": [
        {"testCaseId": "TC-001", "title": "Withdraw consent", "description": "d",
         "testSteps": ["a", "b"], "expectedResults": "r", "priority": "P1"},
        {"testCaseId": "TC-002", "title": "Audit entry", "description": "d",
         "testSteps": [], "expectedResults": "r", "priority": "P3"}
    ]}"#;

    #[test]
    fn test_parses_pure_json() {
        let parsed = parse_synthesis_output(SUITE).unwrap();
        assert_eq!(parsed.test_cases.len(), 2);
        assert_eq!(parsed.test_cases[0].id, "TC-001");
        assert_eq!(parsed.test_cases[1].priority, Priority::P3);
        assert_eq!(parsed.skipped_entries, 0);
    }

    #[test]
    fn test_surrounding_prose_yields_same_structure() {
        let wrapped = format!(
            "Sure! Here are the test cases:\n```json\n{}\n```\nLet me know if you need more.",
            SUITE
        );
        assert_eq!(
            parse_synthesis_output(&wrapped),
            parse_synthesis_output(SUITE)
        );
    }

    #[test]
    fn test_text_without_braces_returns_none() {
        assert!(parse_synthesis_output("I could not generate any test cases.").is_none());
        assert!(parse_synthesis_output("only an opening { brace").is_none());
        assert!(parse_synthesis_output("closing } before opening {").is_none());
        assert!(parse_synthesis_output("").is_none());
    }

    #[test]
    fn test_broken_json_inside_braces_returns_none() {
        assert!(parse_synthesis_output("prefix {\"testCases\": [ } suffix").is_none());
    }

    #[test]
    fn test_object_without_test_cases_is_empty_not_none() {
        let parsed = parse_synthesis_output(r#"{"message": "nothing to do"}"#).unwrap();
        assert!(parsed.test_cases.is_empty());
    }

    #[test]
    fn test_top_level_array_falls_back_to_braced_span() {
        let parsed = parse_synthesis_output(r#"[{"testCases": []}]"#).unwrap();
        assert!(parsed.test_cases.is_empty());
    }

    #[test]
    fn test_malformed_entries_are_skipped_individually() {
        let text = r#"{"testCases": [
            {"testCaseId": "TC-001", "title": "ok", "description": "d",
             "testSteps": ["s"], "expectedResults": "r", "priority": "p2"},
            {"testCaseId": "TC-002", "title": "bad priority", "description": "d",
             "testSteps": ["s"], "expectedResults": "r", "priority": "urgent"},
            {"title": "missing id"}
        ]}"#;
        let parsed = parse_synthesis_output(text).unwrap();
        assert_eq!(parsed.test_cases.len(), 1);
        assert_eq!(parsed.test_cases[0].priority, Priority::P2);
        assert_eq!(parsed.skipped_entries, 2);
    }

    #[test]
    fn test_multibyte_prose_around_braces() {
        let text = format!("Résumé → {} ✓", SUITE);
        assert_eq!(parse_synthesis_output(&text).unwrap().test_cases.len(), 2);
    }
}
