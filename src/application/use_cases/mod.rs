pub mod activity_log;
pub mod admin_settings;
pub mod auth;
pub mod context_store;
pub mod synthesis;
