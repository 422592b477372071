mod followups;
mod llm_output;
mod prompts;

use crate::application::use_cases::context_store::ContextStore;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::synthesis::{
    AnswerSet, ClarificationRequest, ContextHandle, SourceDocument, SynthesisContext,
    SynthesisOutcome, SynthesisSettings, SynthesisStage, TestCaseSuite, MAX_SOURCE_CHARS,
};
use crate::domain::test_case::TestCase;
use crate::infrastructure::llm_clients::LLMClient;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use followups::{needs_clarification, pair_answers, propose_follow_ups};
use llm_output::parse_synthesis_output;
use prompts::{build_generation_prompt, build_qa_block, build_refinement_prompt};

#[cfg(test)]
pub(crate) use followups::FOLLOW_UP_QUESTIONS as CLARIFYING_QUESTIONS;

/// Drives generation, the optional clarification round, and refinement.
pub struct SynthesisUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    context_store: Arc<dyn ContextStore>,
}

impl SynthesisUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        context_store: Arc<dyn ContextStore>,
    ) -> Self {
        Self {
            llm_client,
            context_store,
        }
    }

    /// First pass over freshly ingested source text.
    ///
    /// Returns the parsed cases, or, when follow-ups are enabled and fewer
    /// than three cases came back, the fixed clarifying questions together
    /// with the handle of the suspended context.
    pub async fn generate(
        &self,
        config: &LLMConfig,
        source: SourceDocument,
        owner: &str,
        settings: SynthesisSettings,
    ) -> Result<SynthesisOutcome> {
        validate_settings(&settings)?;
        if source.is_truncated() {
            warn!(
                owner,
                source_chars = source.char_count(),
                kept_chars = MAX_SOURCE_CHARS,
                "Source text exceeds prompt cap and will be partially covered"
            );
        }

        info!(owner, stage = %SynthesisStage::Initial, "Generating test cases");
        let prompt = build_generation_prompt(&source, settings.max_test_cases);
        let raw_output = self.llm_client.generate(config, &prompt).await?;
        let test_cases = parsed_cases(&raw_output);

        if needs_clarification(test_cases.len(), settings.enable_follow_up_questions) {
            let questions = propose_follow_ups();
            let context = SynthesisContext::new(source, questions.clone(), owner);
            let context_id = self.context_store.create(context);
            info!(
                owner,
                parsed_cases = test_cases.len(),
                context_id = %context_id,
                stage = %SynthesisStage::AwaitingClarification,
                "First pass insufficient, requesting clarifications"
            );
            return Ok(SynthesisOutcome::NeedsClarification(ClarificationRequest {
                follow_up_questions: questions,
                context_id,
            }));
        }

        let test_cases = finalize_cases(test_cases, settings.max_test_cases);
        info!(
            owner,
            test_cases = test_cases.len(),
            stage = %SynthesisStage::Done,
            "Generation complete"
        );
        Ok(SynthesisOutcome::Completed(TestCaseSuite { test_cases }))
    }

    /// Resumes a suspended context with the caller's answers.
    ///
    /// With `context_id` the handle is looked up directly and must belong to
    /// `owner`; without it the oldest context owned by `owner` is resumed.
    /// The context is consumed once the model has answered, whatever the
    /// parse outcome. A failed model call leaves it in place for a retry.
    pub async fn refine(
        &self,
        config: &LLMConfig,
        owner: &str,
        context_id: Option<&ContextHandle>,
        answers: &AnswerSet,
        settings: SynthesisSettings,
    ) -> Result<TestCaseSuite> {
        validate_settings(&settings)?;
        let handle = self.locate_context(owner, context_id)?;
        let context = self
            .context_store
            .take(&handle)
            .ok_or_else(|| AppError::NotFound("Context not found".to_string()))?;

        info!(
            owner,
            context_id = %handle,
            answered = answers.len(),
            stage = %SynthesisStage::Refining,
            "Refining test cases with clarifications"
        );
        let pairs = pair_answers(&context.questions, answers);
        let qa_block = build_qa_block(&pairs);
        let prompt = build_refinement_prompt(&context.source, &qa_block, settings.max_test_cases);

        let raw_output = match self.llm_client.generate(config, &prompt).await {
            Ok(output) => output,
            Err(err) => {
                warn!(owner, context_id = %handle, error = %err, "Refinement call failed, keeping context");
                self.context_store.restore(handle, context);
                return Err(err);
            }
        };

        let test_cases = finalize_cases(parsed_cases(&raw_output), settings.max_test_cases);
        info!(
            owner,
            context_id = %handle,
            test_cases = test_cases.len(),
            stage = %SynthesisStage::Done,
            "Refinement complete"
        );
        Ok(TestCaseSuite { test_cases })
    }

    fn locate_context(
        &self,
        owner: &str,
        context_id: Option<&ContextHandle>,
    ) -> Result<ContextHandle> {
        let found = match context_id {
            Some(handle) => self
                .context_store
                .get(handle)
                .filter(|context| context.owner == owner)
                .map(|_| handle.clone()),
            None => self
                .context_store
                .find(&|context| context.owner == owner)
                .map(|(handle, _)| handle),
        };
        found.ok_or_else(|| AppError::NotFound("Context not found".to_string()))
    }
}

fn validate_settings(settings: &SynthesisSettings) -> Result<()> {
    if settings.max_test_cases == 0 {
        return Err(AppError::ValidationError(
            "maxTestCases must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn parsed_cases(raw_output: &str) -> Vec<TestCase> {
    match parse_synthesis_output(raw_output) {
        Some(parsed) => {
            if parsed.skipped_entries > 0 {
                warn!(
                    skipped = parsed.skipped_entries,
                    "Model output contained malformed test cases"
                );
            }
            parsed.test_cases
        }
        None => {
            warn!(
                output_chars = raw_output.len(),
                "Model output contained no recoverable JSON"
            );
            Vec::new()
        }
    }
}

/// Caps the list and keeps identifiers unique within it.
fn finalize_cases(mut test_cases: Vec<TestCase>, max_cases: usize) -> Vec<TestCase> {
    if test_cases.len() > max_cases {
        info!(
            returned = test_cases.len(),
            max_cases, "Model exceeded case cap, truncating"
        );
        test_cases.truncate(max_cases);
    }

    let mut seen: HashSet<String> = HashSet::new();
    for case in test_cases.iter_mut() {
        if seen.insert(case.id.clone()) {
            continue;
        }
        let mut suffix = 2;
        let mut candidate = format!("{}-{}", case.id, suffix);
        while seen.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}-{}", case.id, suffix);
        }
        seen.insert(candidate.clone());
        case.id = candidate;
    }
    test_cases
}
