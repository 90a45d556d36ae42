//! Round/turn state machine
//!
//! `GameSession` owns everything that changes during a game. Every transition
//! is a method taking the catalog explicitly, so a session can be driven in
//! isolation from the transport layer.

use crate::catalog::Catalog;
use crate::error::{GameError, GameResult};
use crate::lookup::Lookup;
use crate::scoring::score;
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// What happened after a guess was recorded
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// Another team still has to guess
    NextTeam { team: TeamName },
    /// Every team has guessed and the round was scored
    RoundComplete { results: Vec<TeamResult> },
}

#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    phase: GamePhase,
    teams: Vec<TeamName>,
    scores: HashMap<TeamName, u32>,
    round_no: u32,
    completed_rounds: u32,
    current_team_index: usize,
    guesses: HashMap<TeamName, String>,
    current_prompt: Option<Prompt>,
    current_lookup: Lookup,
    last_results: Vec<TeamResult>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            phase: GamePhase::Setup,
            teams: Vec::new(),
            scores: HashMap::new(),
            round_no: 0,
            completed_rounds: 0,
            current_team_index: 0,
            guesses: HashMap::new(),
            current_prompt: None,
            current_lookup: Lookup::default(),
            last_results: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn teams(&self) -> &[TeamName] {
        &self.teams
    }

    pub fn round_no(&self) -> u32 {
        self.round_no
    }

    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current_prompt.as_ref()
    }

    pub fn current_team(&self) -> Option<&TeamName> {
        match self.phase {
            GamePhase::Handoff | GamePhase::Turn => self.teams.get(self.current_team_index),
            _ => None,
        }
    }

    pub fn score_of(&self, team: &str) -> u32 {
        self.scores.get(team).copied().unwrap_or(0)
    }

    /// True once the round limit has been reached
    pub fn is_complete(&self) -> bool {
        self.completed_rounds >= MAX_ROUNDS
    }

    fn require(&self, action: &'static str, allowed: &[GamePhase]) -> GameResult<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(GameError::InvalidAction {
                action,
                phase: self.phase,
            })
        }
    }

    // =========================================================================
    // Setup roster
    // =========================================================================

    /// Add a team to the pre-game roster
    pub fn add_team(&mut self, name: &str) -> GameResult<()> {
        self.require("add teams", &[GamePhase::Setup])?;

        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::validation("Team name must not be empty"));
        }
        if self.teams.iter().any(|t| t == name) {
            return Err(GameError::validation(format!("Team \"{}\" already exists", name)));
        }
        if self.teams.len() >= MAX_TEAMS {
            return Err(GameError::validation(format!(
                "At most {} teams can play",
                MAX_TEAMS
            )));
        }

        self.teams.push(name.to_string());
        tracing::info!("Team added: {}", name);
        Ok(())
    }

    /// Remove a team from the pre-game roster
    pub fn remove_team(&mut self, name: &str) -> GameResult<()> {
        self.require("remove teams", &[GamePhase::Setup])?;

        let pos = self
            .teams
            .iter()
            .position(|t| t == name)
            .ok_or_else(|| GameError::validation(format!("Unknown team \"{}\"", name)))?;
        self.teams.remove(pos);
        tracing::info!("Team removed: {}", name);
        Ok(())
    }

    // =========================================================================
    // Game flow
    // =========================================================================

    /// Start a game with the given teams. Leaves the session untouched on error.
    pub fn start_game(&mut self, teams: Vec<TeamName>, catalog: &mut Catalog) -> GameResult<()> {
        self.require("start a game", &[GamePhase::Setup])?;

        let teams: Vec<TeamName> = teams.into_iter().map(|t| t.trim().to_string()).collect();
        validate_teams(&teams)?;
        if catalog.pool_size() == 0 {
            return Err(GameError::validation(
                "No prompts in the selected category, pick another one",
            ));
        }

        catalog.reset_used();
        let prompt = catalog.pick_next()?;

        self.scores = teams.iter().map(|t| (t.clone(), 0)).collect();
        self.teams = teams;
        self.round_no = 0;
        self.completed_rounds = 0;

        tracing::info!("Game {} started with teams {:?}", self.id, self.teams);
        self.begin_round(prompt);
        Ok(())
    }

    /// Begin the next round: pick a prompt and hand off to the first team
    pub fn advance_round(&mut self, catalog: &mut Catalog) -> GameResult<()> {
        let prompt = catalog.pick_next()?;
        self.begin_round(prompt);
        Ok(())
    }

    fn begin_round(&mut self, prompt: Prompt) {
        self.round_no += 1;
        self.load_prompt(prompt);

        tracing::info!(
            "Round {} started with prompt {}",
            self.round_no,
            self.current_prompt.as_ref().map(|p| p.id.as_str()).unwrap_or("-")
        );
    }

    fn load_prompt(&mut self, prompt: Prompt) {
        self.current_lookup = Lookup::build(&prompt);
        self.current_prompt = Some(prompt);
        self.current_team_index = 0;
        self.guesses.clear();
        self.last_results.clear();
        self.phase = GamePhase::Handoff;
    }

    /// The device has been handed to the current team
    pub fn ready_for_turn(&mut self) -> GameResult<()> {
        self.require("start a turn", &[GamePhase::Handoff])?;
        self.phase = GamePhase::Turn;
        Ok(())
    }

    /// Record the current team's guess; the last guess of a round scores it
    pub fn submit_guess(&mut self, text: &str) -> GameResult<GuessOutcome> {
        self.require("submit a guess", &[GamePhase::Turn])?;

        let team = self.teams[self.current_team_index].clone();
        self.guesses.insert(team.clone(), text.trim().to_string());
        tracing::info!("Guess recorded for {}", team);

        if self.current_team_index + 1 < self.teams.len() {
            self.current_team_index += 1;
            self.phase = GamePhase::Handoff;
            return Ok(GuessOutcome::NextTeam {
                team: self.teams[self.current_team_index].clone(),
            });
        }

        let results = self.score_round();
        self.completed_rounds += 1;
        self.phase = GamePhase::Reveal;
        self.last_results = results.clone();

        tracing::info!(
            "Round {} complete ({}/{} rounds)",
            self.round_no,
            self.completed_rounds,
            MAX_ROUNDS
        );
        Ok(GuessOutcome::RoundComplete { results })
    }

    fn score_round(&mut self) -> Vec<TeamResult> {
        let max_points = self
            .current_prompt
            .as_ref()
            .map(Prompt::max_points)
            .unwrap_or(0);

        let mut results = Vec::with_capacity(self.teams.len());
        for team in &self.teams {
            let guess = self.guesses.get(team).cloned().unwrap_or_default();
            let scored = score(&self.current_lookup, &guess);
            *self.scores.entry(team.clone()).or_insert(0) += scored.points;

            results.push(TeamResult {
                team: team.clone(),
                guess,
                points: scored.points,
                rank: scored.rank,
                perfect: scored.rank == Some(max_points),
            });
        }
        results
    }

    /// Leave the reveal: start the next round, or end the game at the limit
    pub fn next_round(&mut self, catalog: &mut Catalog) -> GameResult<()> {
        self.require("continue to the next round", &[GamePhase::Reveal])?;

        if self.is_complete() {
            self.phase = GamePhase::GameOver;
            tracing::info!("Game {} over, winners: {:?}", self.id, self.winners());
            Ok(())
        } else {
            self.advance_round(catalog)
        }
    }

    /// Swap the current prompt for a new one. Guesses so far are discarded
    /// and the round does not count towards the limit.
    pub fn skip(&mut self, catalog: &mut Catalog) -> GameResult<()> {
        self.require("skip a prompt", &[GamePhase::Handoff, GamePhase::Turn])?;

        let skipped = self.current_prompt.as_ref().map(|p| p.id.clone());
        let prompt = catalog.pick_next()?;
        self.load_prompt(prompt);

        tracing::info!(
            "Round {}: skipped prompt {:?}",
            self.round_no,
            skipped.unwrap_or_default()
        );
        Ok(())
    }

    /// Drop all session state and return to setup
    pub fn reset(&mut self) {
        tracing::info!("Game {} reset", self.id);
        *self = Self::new();
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Teams sorted by score, highest first (ties keep team order)
    pub fn standings(&self) -> Vec<TeamScore> {
        let mut standings: Vec<TeamScore> = self
            .teams
            .iter()
            .map(|t| TeamScore {
                team: t.clone(),
                score: self.score_of(t),
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score));
        standings
    }

    /// All teams sharing the highest score
    pub fn winners(&self) -> Vec<TeamName> {
        let best = match self.teams.iter().map(|t| self.score_of(t)).max() {
            Some(best) => best,
            None => return Vec::new(),
        };
        self.teams
            .iter()
            .filter(|t| self.score_of(t) == best)
            .cloned()
            .collect()
    }

    /// Payload for the current phase
    pub fn view(&self) -> PhaseView {
        match self.phase {
            GamePhase::Setup => PhaseView::Setup,
            GamePhase::Handoff => PhaseView::Handoff {
                team: self.teams[self.current_team_index].clone(),
                round_no: self.round_no,
            },
            GamePhase::Turn => {
                let prompt = self.current_prompt.as_ref();
                PhaseView::Turn {
                    team: self.teams[self.current_team_index].clone(),
                    round_no: self.round_no,
                    category: prompt.map(|p| p.category.clone()).unwrap_or_default(),
                    prompt_text: prompt.map(|p| p.prompt_text.clone()).unwrap_or_default(),
                    fact_label: prompt.map(|p| p.fact_label.clone()).unwrap_or_default(),
                    max_points: prompt.map(Prompt::max_points).unwrap_or(0),
                }
            }
            GamePhase::Reveal => PhaseView::Reveal {
                round_no: self.round_no,
                results: self.last_results.clone(),
                answers: self.revealed_answers(),
                game_over: self.is_complete(),
            },
            GamePhase::GameOver => PhaseView::GameOver {
                winners: self.winners(),
                final_scores: self.standings(),
            },
        }
    }

    fn revealed_answers(&self) -> Vec<RevealedAnswer> {
        let Some(prompt) = self.current_prompt.as_ref() else {
            return Vec::new();
        };
        prompt
            .answers
            .iter()
            .enumerate()
            .map(|(idx, answer)| RevealedAnswer {
                rank: idx as u32 + 1,
                name: answer.name.clone(),
                fact_text: prompt.fact_text(answer),
            })
            .collect()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_teams(teams: &[TeamName]) -> GameResult<()> {
    if teams.len() < MIN_TEAMS {
        return Err(GameError::validation(format!(
            "Need at least {} teams",
            MIN_TEAMS
        )));
    }
    if teams.len() > MAX_TEAMS {
        return Err(GameError::validation(format!(
            "At most {} teams can play",
            MAX_TEAMS
        )));
    }
    if teams.iter().any(|t| t.is_empty()) {
        return Err(GameError::validation("Team name must not be empty"));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = teams.iter().find(|t| !seen.insert(t.as_str())) {
        return Err(GameError::validation(format!("Team \"{}\" appears twice", dup)));
    }
    Ok(())
}
