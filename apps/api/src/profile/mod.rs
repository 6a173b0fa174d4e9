pub mod analytics;
pub mod certifications;
pub mod handlers;
pub mod ingest;
pub mod normalizer;
pub mod prompts;
pub mod summary;
pub mod vocabulary;
