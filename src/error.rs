use std::time::Duration;
use thiserror::Error;

/// Terminal failure of a single extraction request
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Captions disabled, not found, or the transcript source was unreachable
    #[error("No transcript available for video '{video_id}'")]
    TranscriptUnavailable { video_id: String },

    /// The generation backend kept failing until the retry budget ran out
    #[error("Generation failed after {attempts} attempt(s): {source}")]
    Generation {
        attempts: u32,
        #[source]
        source: GenerationError,
    },

    /// The backend output never matched the recipe schema
    #[error("Parsing failed after {attempts} attempt(s): {source}")]
    Parse {
        attempts: u32,
        #[source]
        source: ParseError,
    },
}

impl ExtractionError {
    /// Whether the failure is caused by the caller's input rather than the service
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExtractionError::TranscriptUnavailable { .. })
    }
}

/// Errors reported by a text-generation backend
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Transport failure (connection, TLS, client timeout, body decoding)
    #[error("Request to generation backend failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status code
    #[error("Generation backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend accepted the request but reported an error
    #[error("Generation backend error: {0}")]
    Backend(String),

    /// The response had no text where the output was expected
    #[error("Generation backend returned no output: {0}")]
    MissingOutput(String),

    /// The prediction did not finish before the deadline
    #[error("Generation did not complete within {0:?}")]
    Timeout(Duration),
}

/// Errors produced when the model output is not schema-conformant recipe JSON.
///
/// Every variant keeps the raw text so it can be logged.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Model output is empty")]
    Empty { raw: String },

    #[error("Model output is not valid JSON: {source}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model output does not match the recipe schema: {reason}")]
    Schema { raw: String, reason: String },
}

impl ParseError {
    /// The raw model output that failed to parse
    pub fn raw(&self) -> &str {
        match self {
            ParseError::Empty { raw }
            | ParseError::InvalidJson { raw, .. }
            | ParseError::Schema { raw, .. } => raw,
        }
    }
}

/// Reasons a transcript could not be retrieved.
///
/// The orchestrator collapses all of them into [`ExtractionError::TranscriptUnavailable`].
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to fetch transcript: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transcript request returned status {0}")]
    Status(u16),

    #[error("Subtitles are disabled for video '{0}'")]
    Disabled(String),

    #[error("Video '{0}' is unavailable")]
    VideoUnavailable(String),

    #[error("Requests are being blocked by YouTube (captcha required)")]
    Blocked,

    #[error("No transcript found for video '{video_id}' in languages {languages:?}")]
    NotFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Unexpected caption data: {0}")]
    Malformed(String),
}

/// Errors resolving credentials from a secret store
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Secret blob is not a JSON object of strings: {0}")]
    InvalidBlob(String),

    #[error("Failed to read secrets file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors constructing the extraction service
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}
