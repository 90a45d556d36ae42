use crate::types::GamePhase;

/// Result type for catalog and game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors raised while loading prompts or driving a game session
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("Cannot {action} during {phase:?}")]
    InvalidAction {
        action: &'static str,
        phase: GamePhase,
    },

    #[error("Prompt catalog is empty")]
    EmptyCatalog,

    #[error("Malformed prompt {prompt}: {reason}")]
    MalformedPrompt { prompt: String, reason: String },

    #[error("Prompt {prompt}: \"{key}\" matches both rank {first_rank} and rank {second_rank}")]
    AliasCollision {
        prompt: String,
        key: String,
        first_rank: u32,
        second_rank: u32,
    },

    #[error("Failed to read prompt source: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Stable code sent to clients alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Validation(_) => "VALIDATION_FAILED",
            GameError::InvalidAction { .. } => "INVALID_ACTION",
            GameError::EmptyCatalog => "EMPTY_CATALOG",
            GameError::MalformedPrompt { .. } => "MALFORMED_PROMPT",
            GameError::AliasCollision { .. } => "ALIAS_COLLISION",
            GameError::Io(_) => "IO_ERROR",
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        GameError::Validation(msg.into())
    }

    pub(crate) fn malformed(prompt: impl Into<String>, reason: impl Into<String>) -> Self {
        GameError::MalformedPrompt {
            prompt: prompt.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GameError::validation("x").code(), "VALIDATION_FAILED");
        assert_eq!(GameError::EmptyCatalog.code(), "EMPTY_CATALOG");
        assert_eq!(
            GameError::InvalidAction {
                action: "submit a guess",
                phase: GamePhase::Setup,
            }
            .code(),
            "INVALID_ACTION"
        );
    }

    #[test]
    fn test_invalid_action_message() {
        let err = GameError::InvalidAction {
            action: "skip",
            phase: GamePhase::Reveal,
        };
        assert_eq!(err.to_string(), "Cannot skip during Reveal");
    }
}
