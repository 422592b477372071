use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::application::{
    ActivityLog, AdminSettingsStore, AuthService, ContextStore, InMemoryContextStore,
    SynthesisUseCase,
};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::jira::JiraClient;
use crate::infrastructure::llm_clients::{GeminiClient, LLMClient};
use crate::infrastructure::storage::UploadStore;
use crate::interfaces::http::AppState;

/// Wires the shared state around a given model client.
pub fn build_state(
    config: &AppConfig,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
) -> Result<Arc<AppState>> {
    let context_store: Arc<dyn ContextStore> =
        Arc::new(InMemoryContextStore::new(config.contexts.store_config()));
    let synthesis = SynthesisUseCase::new(llm_client, context_store.clone());

    if config.auth.users.is_empty() {
        warn!("No users configured under [auth]; every login will be rejected");
    }

    Ok(Arc::new(AppState {
        synthesis,
        context_store,
        auth: AuthService::new(config.auth.users.clone()),
        settings: AdminSettingsStore::new(config.settings.clone().into()),
        activity: ActivityLog::new(),
        jira: JiraClient::new()?,
        uploads: UploadStore::new(config.storage.uploads_dir.clone()),
        llm: config.llm.clone(),
    }))
}

pub async fn setup(config: &AppConfig) -> Result<Arc<AppState>> {
    let llm_client: Arc<dyn LLMClient + Send + Sync> =
        Arc::new(GeminiClient::new(config.llm.timeout())?);
    let state = build_state(config, llm_client)?;

    state.uploads.ensure_dir().await?;
    info!(
        uploads_dir = %state.uploads.uploads_dir().display(),
        model = %config.llm.model,
        "Application state ready"
    );

    if let Some(max_age) = config.contexts.store_config().max_age {
        spawn_context_sweeper(
            state.context_store.clone(),
            Duration::from_secs(config.contexts.sweep_interval_secs),
        );
        info!(max_age_secs = max_age.as_secs(), "Context expiry enabled");
    }

    state
        .activity
        .info("System", "Test case synthesis service started");
    Ok(state)
}

pub fn spawn_context_sweeper(
    store: Arc<dyn ContextStore>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired();
            if removed > 0 {
                debug!(removed, remaining = store.len(), "Swept expired contexts");
            }
        }
    })
}
