//! Text-generation provider trait

use crate::error::Result;

/// Trait for the external text-completion collaborator.
///
/// Given identical input the service may return different output; the
/// pipeline performs one blocking call per request with no retry and does
/// not interpret the generated text.
pub trait TextGenerator: Send + Sync {
    /// Complete a single structured prompt
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
