use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type SessionId = String;
pub type PromptId = String;
pub type TeamName = String;

/// Minimum number of teams in a game
pub const MIN_TEAMS: usize = 2;
/// Maximum number of teams in a game
pub const MAX_TEAMS: usize = 8;
/// Completed rounds after which the game ends
pub const MAX_ROUNDS: u32 = 10;

/// Category assigned to prompts that don't declare one
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Setup,
    Handoff,
    Turn,
    Reveal,
    GameOver,
}

/// One ranked entry of a prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub name: String,
    #[serde(default)]
    pub fact: Option<f64>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// A trivia question with its ranked answers (index 0 = rank 1)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prompt {
    pub id: PromptId,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(rename = "prompt")]
    pub prompt_text: String,
    #[serde(default)]
    pub fact_label: String,
    #[serde(default)]
    pub fact_unit: String,
    pub answers: Vec<Answer>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Prompt {
    /// Points for the lowest-ranked answer (and the highest a guess can earn)
    pub fn max_points(&self) -> u32 {
        self.answers.len() as u32
    }

    /// Human-readable fact for an answer, e.g. "1412 million"
    pub fn fact_text(&self, answer: &Answer) -> Option<String> {
        let value = answer.fact?;
        let value = if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        };

        let unit = self.fact_unit.trim();
        if unit.is_empty() {
            Some(value)
        } else {
            Some(format!("{} {}", value, unit))
        }
    }
}

/// Category filter applied to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn from_option(name: Option<String>) -> Self {
        match name {
            Some(name) => CategoryFilter::Named(name),
            None => CategoryFilter::All,
        }
    }

    pub fn as_option(&self) -> Option<String> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Named(name) => Some(name.clone()),
        }
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => prompt.category == *name,
        }
    }
}

/// Outcome of scoring a single guess
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessScore {
    pub points: u32,
    pub rank: Option<u32>,
}

impl GuessScore {
    pub const MISS: GuessScore = GuessScore {
        points: 0,
        rank: None,
    };

    pub fn hit(rank: u32) -> Self {
        Self {
            points: rank,
            rank: Some(rank),
        }
    }
}

/// One team's line in the round reveal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamResult {
    pub team: TeamName,
    pub guess: String,
    pub points: u32,
    pub rank: Option<u32>,
    /// True when the guess hit the last (most valuable) entry
    pub perfect: bool,
}

/// An entry of the official list, as shown on reveal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealedAnswer {
    pub rank: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamScore {
    pub team: TeamName,
    pub score: u32,
}

/// Phase-specific data the presentation layer renders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "phase", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseView {
    Setup,
    Handoff {
        team: TeamName,
        round_no: u32,
    },
    Turn {
        team: TeamName,
        round_no: u32,
        category: String,
        prompt_text: String,
        fact_label: String,
        max_points: u32,
    },
    Reveal {
        round_no: u32,
        results: Vec<TeamResult>,
        answers: Vec<RevealedAnswer>,
        game_over: bool,
    },
    GameOver {
        winners: Vec<TeamName>,
        final_scores: Vec<TeamScore>,
    },
}

impl PhaseView {
    pub fn phase(&self) -> GamePhase {
        match self {
            PhaseView::Setup => GamePhase::Setup,
            PhaseView::Handoff { .. } => GamePhase::Handoff,
            PhaseView::Turn { .. } => GamePhase::Turn,
            PhaseView::Reveal { .. } => GamePhase::Reveal,
            PhaseView::GameOver { .. } => GamePhase::GameOver,
        }
    }
}

/// Split comma-separated team input, dropping blanks
pub fn parse_team_list(raw: &str) -> Vec<TeamName> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
