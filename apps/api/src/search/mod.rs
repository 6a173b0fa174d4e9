pub mod chat;
pub mod grounding;
pub mod handlers;
pub mod intent;
pub mod prompts;
pub mod ranking;
pub mod service;
