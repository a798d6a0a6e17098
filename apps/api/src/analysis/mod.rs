// ATS Analysis Engine.
// Implements: sector classification, prompt composition, structured-output
// extraction, demo fallback, and the two analysis pipelines (ATS score and
// job-description match). All model calls go through model_client.

pub mod analyzer;
pub mod composer;
pub mod extractor;
pub mod fallback;
pub mod handlers;
pub mod prompts;
pub mod result;
pub mod sector;
