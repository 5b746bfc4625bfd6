/// Domain errors raised while interpreting a task before any phase runs.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unsupported command: '{0}'")]
    UnsupportedCommand(String),

    #[error("Invalid input for '{command}' command: {reason}")]
    InvalidInput {
        command: &'static str,
        reason: String,
    },
}
