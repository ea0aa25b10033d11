use thiserror::Error;

/// Failures of a name-suggestion request.
///
/// A response that parses to no candidates is not an error; the request
/// succeeds with an empty list.
#[derive(Debug, Error)]
pub enum NamerError {
    /// No API key configured. Raised before any network access.
    #[error(
        "API key is not configured, set `api_key` in storage/settings.yaml or the OPEN_AI_API_KEY environment variable"
    )]
    Configuration,

    #[error("request to the AI service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI service returned an error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("AI service response is malformed: {0}")]
    MalformedResponse(String),
}
