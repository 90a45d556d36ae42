use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Restrict prompts to one category (`None` = all categories)
    SelectCategory {
        #[serde(default)]
        category: Option<String>,
    },
    /// One team name, or several separated by commas
    AddTeam {
        name: String,
    },
    RemoveTeam {
        name: String,
    },
    /// Start with the given teams, or with the roster when omitted
    StartGame {
        #[serde(default)]
        teams: Option<Vec<String>>,
    },
    /// Handoff is done, show the prompt to the current team
    ReadyForTurn,
    SubmitGuess {
        text: String,
    },
    /// Replace the current prompt without using up a round
    Skip,
    /// Leave the reveal
    NextRound,
    NewGame,
}

impl ClientMessage {
    /// Game actions go through the per-connection action gate
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            ClientMessage::StartGame { .. }
                | ClientMessage::ReadyForTurn
                | ClientMessage::SubmitGuess { .. }
                | ClientMessage::Skip
                | ClientMessage::NextRound
                | ClientMessage::NewGame
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        session_id: SessionId,
        server_now: String,
        categories: Vec<String>,
        active_category: Option<String>,
        teams: Vec<TeamName>,
        scores: Vec<TeamScore>,
        view: PhaseView,
    },
    CategoriesChanged {
        categories: Vec<String>,
        active_category: Option<String>,
    },
    TeamsChanged {
        teams: Vec<TeamName>,
    },
    Phase {
        view: PhaseView,
    },
    /// Standings, highest score first
    Scores {
        scores: Vec<TeamScore>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<&GameError> for ServerMessage {
    fn from(err: &GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
