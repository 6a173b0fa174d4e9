//! Outside collaborators consumed by ingest: document-to-text extraction and the
//! GitHub activity fetcher. Their failures surface to the caller but never reach the
//! matching core.

pub mod github;
pub mod resume_text;
