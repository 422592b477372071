pub mod bootstrap;
pub mod config;
pub mod jira;
pub mod llm_clients;
pub mod pdf;
pub mod storage;
