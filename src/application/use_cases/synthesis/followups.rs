use crate::domain::synthesis::AnswerSet;

/// Fixed clarifying questions; they do not depend on the source text.
pub(crate) const FOLLOW_UP_QUESTIONS: [&str; 3] = [
    "What user roles and permissions need to be covered (e.g., clinician, admin, patient)?",
    "What environments or integrations are in scope (e.g., FHIR server, EHR vendor, external IDP)?",
    "Any regulatory constraints or organizational policies we must validate beyond HIPAA (e.g., SOC2, ISO 27001)?",
];

/// Below this many parsed cases the first pass counts as insufficient.
pub(crate) const SUFFICIENT_CASE_COUNT: usize = 3;

pub(crate) fn propose_follow_ups() -> Vec<String> {
    FOLLOW_UP_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

pub(crate) fn needs_clarification(parsed_cases: usize, follow_ups_enabled: bool) -> bool {
    follow_ups_enabled && parsed_cases < SUFFICIENT_CASE_COUNT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuestionAnswer<'a> {
    pub(crate) question: &'a str,
    pub(crate) answer: &'a str,
}

pub(crate) fn pair_answers<'a>(
    questions: &'a [String],
    answers: &'a AnswerSet,
) -> Vec<QuestionAnswer<'a>> {
    questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionAnswer {
            question,
            answer: answers.answer_for(index),
        })
        .collect()
}
