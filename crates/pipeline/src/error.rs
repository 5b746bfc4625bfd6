use mangaka_core::error::CoreError;

/// Error type returned by phase collaborators and artifact stores.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a run failed.
///
/// Phase errors keep the collaborator's error as their source and name the
/// failing step in their message, e.g. `"panel generation step failed: ..."`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The payload could not be interpreted; no phase ran.
    #[error(transparent)]
    Input(#[from] CoreError),

    /// A phase collaborator returned an error.
    #[error("{step} step failed: {source}")]
    Phase {
        step: &'static str,
        #[source]
        source: BoxError,
    },

    /// A manga response could not be encoded for persistence.
    #[error("failed to encode manga response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An artifact could not be written.
    #[error("failed to write artifact {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: BoxError,
    },

    /// The run was cancelled while (or before) executing `step`.
    #[error("{step} step cancelled")]
    Cancelled { step: &'static str },
}

impl PipelineError {
    /// Whether redelivering the same task could succeed.
    ///
    /// Input and serialization failures are deterministic for a given
    /// payload. Everything else may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Input(_) | Self::Serialization(_) => false,
            Self::Phase { .. } | Self::Storage { .. } | Self::Cancelled { .. } => true,
        }
    }
}
