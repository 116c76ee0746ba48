use thiserror::Error;

/// Errors surfaced by the dialogue client.
///
/// Precondition variants are raised locally before any request is sent;
/// the remaining variants come from the transport or the server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please paste a dialogue first")]
    EmptyDialogue,

    #[error("Please detect speakers first")]
    NoSpeakers,

    #[error("Audio generation is already in progress")]
    GenerationInFlight,

    #[error("Unknown speaker: {0}")]
    UnknownSpeaker(String),

    #[error("Voice {index} is out of range ({count} voices available)")]
    VoiceOutOfRange { index: usize, count: usize },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}")]
    Status { status: u16, detail: Option<String> },
}

impl ClientError {
    /// True for failures detected before any request was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ClientError::EmptyDialogue
                | ClientError::NoSpeakers
                | ClientError::GenerationInFlight
                | ClientError::UnknownSpeaker(_)
                | ClientError::VoiceOutOfRange { .. }
        )
    }
}
