pub mod error;
pub mod llm_config;
pub mod settings;
pub mod synthesis;
pub mod test_case;
pub mod user;
