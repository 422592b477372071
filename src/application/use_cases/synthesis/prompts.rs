use crate::application::use_cases::synthesis::followups::QuestionAnswer;
use crate::domain::synthesis::SourceDocument;

const SCHEMA_EXAMPLE: &str = r#"{
  "testCases": [
    {
      "testCaseId": "TC-001",
      "title": "Example",
      "description": "...",
      "testSteps": ["step 1", "step 2"],
      "expectedResults": "...",
      "priority": "P2"
    }
  ]
}"#;

pub(crate) fn build_generation_prompt(source: &SourceDocument, max_cases: usize) -> String {
    let instructions = format!(
        "You are a senior QA engineer for healthcare software. \
Generate a diverse suite of test cases (positive, negative, edge cases) with realistic test data. \
Focus on HIPAA, PHI handling, consent, audit logging, roles, clinical safety, interoperability (HL7/FHIR), and input validation. \
Return ONLY a valid JSON object with a top-level key 'testCases' which is an array of objects. \
Each object must have fields: testCaseId, title, description, testSteps (array of strings), \
expectedResults, priority (P1/P2/P3). \
Use at most {} test cases. Use readable IDs like TC-001, TC-002.",
        max_cases
    );

    format!(
        "{}\n\nContext:\n{}\n\nJSON Schema and Example:\n{}\n\nReturn only JSON with no extra text.",
        instructions,
        source.prompt_text(),
        SCHEMA_EXAMPLE
    )
}

pub(crate) fn build_refinement_prompt(
    source: &SourceDocument,
    qa_block: &str,
    max_cases: usize,
) -> String {
    let instructions = format!(
        "Refine and regenerate the healthcare QA test cases based on additional clarifications below. \
Return ONLY JSON with top-level key 'testCases'. Maintain the same schema. \
Ensure coverage of both normal and failure paths, boundary conditions, and compliance aspects. \
Use at most {} test cases.",
        max_cases
    );

    format!(
        "{}\n\nContext:\n{}\n\nClarifications:\n{}\n\nReturn only JSON.",
        instructions,
        source.prompt_text(),
        qa_block
    )
}

/// One `Q: <question> A: <answer>` line per question, in question order.
pub(crate) fn build_qa_block(pairs: &[QuestionAnswer<'_>]) -> String {
    pairs
        .iter()
        .map(|pair| format!("Q: {} A: {}", pair.question, pair.answer))
        .collect::<Vec<_>>()
        .join("\n")
}
