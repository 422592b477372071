pub mod use_cases;

pub use use_cases::activity_log::ActivityLog;
pub use use_cases::admin_settings::AdminSettingsStore;
pub use use_cases::auth::AuthService;
pub use use_cases::context_store::{ContextStore, ContextStoreConfig, InMemoryContextStore};
pub use use_cases::synthesis::SynthesisUseCase;
