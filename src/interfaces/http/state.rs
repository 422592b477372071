use crate::application::{
    ActivityLog, AdminSettingsStore, AuthService, ContextStore, SynthesisUseCase,
};
use crate::infrastructure::config::LlmSection;
use crate::infrastructure::jira::JiraClient;
use crate::infrastructure::storage::UploadStore;
use std::sync::Arc;

pub struct AppState {
    pub synthesis: SynthesisUseCase,
    pub context_store: Arc<dyn ContextStore>,
    pub auth: AuthService,
    pub settings: AdminSettingsStore,
    pub activity: ActivityLog,
    pub jira: JiraClient,
    pub uploads: UploadStore,
    pub llm: LlmSection,
}
