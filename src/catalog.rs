//! Prompt catalog
//!
//! Loads the prompt source once at startup, filters it by category, and hands
//! out prompts at random without repeating one until the pool is used up.

use crate::error::{GameError, GameResult};
use crate::lookup;
use crate::types::{CategoryFilter, Prompt, PromptId};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// How the loader treats two ranks of one prompt sharing a normalized key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasPolicy {
    /// Abort loading
    Strict,
    /// Log a warning and let the later entry win
    Lenient,
}

pub struct Catalog {
    prompts: Vec<Prompt>,
    filter: CategoryFilter,
    /// Indices into `prompts` matching `filter`
    pool: Vec<usize>,
    used: HashSet<PromptId>,
    rng: StdRng,
}

impl Catalog {
    /// Build a catalog from already-decoded prompts, validating them first
    pub fn new(prompts: Vec<Prompt>, policy: AliasPolicy) -> GameResult<Self> {
        validate(&prompts, policy)?;
        Ok(Self::with_rng(prompts, StdRng::from_os_rng()))
    }

    /// Like [`Catalog::new`] but with a reproducible selection order
    pub fn seeded(prompts: Vec<Prompt>, policy: AliasPolicy, seed: u64) -> GameResult<Self> {
        validate(&prompts, policy)?;
        Ok(Self::with_rng(prompts, StdRng::seed_from_u64(seed)))
    }

    fn with_rng(prompts: Vec<Prompt>, rng: StdRng) -> Self {
        let pool = (0..prompts.len()).collect();
        Self {
            prompts,
            filter: CategoryFilter::All,
            pool,
            used: HashSet::new(),
            rng,
        }
    }

    /// Parse a JSON prompt source (an array of prompt objects)
    pub fn from_json(json: &str, policy: AliasPolicy) -> GameResult<Self> {
        let prompts = parse_prompts(json)?;
        Self::new(prompts, policy)
    }

    /// Read and parse the prompt source file
    pub fn load(path: &Path, policy: AliasPolicy) -> GameResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content, policy)?;
        tracing::info!(
            "Loaded {} prompts in {} categories from {}",
            catalog.len(),
            catalog.list_categories().len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Distinct category names, sorted
    pub fn list_categories(&self) -> Vec<String> {
        self.prompts
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn active_category(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Change the filter, recompute the pool, and forget used prompts
    pub fn set_active_category(&mut self, filter: CategoryFilter) {
        self.pool = self
            .prompts
            .iter()
            .enumerate()
            .filter(|(_, p)| filter.matches(p))
            .map(|(idx, _)| idx)
            .collect();
        self.used.clear();

        tracing::info!(
            "Category set to {:?} ({} prompts in pool)",
            filter,
            self.pool.len()
        );
        self.filter = filter;
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Start a fresh rotation over the current pool
    pub fn reset_used(&mut self) {
        tracing::debug!("Clearing {} used prompts", self.used.len());
        self.used.clear();
    }

    /// Pick a random unused prompt and mark it used.
    ///
    /// Falls back from the active pool to the full catalog once the pool is
    /// exhausted, and starts a fresh cycle once everything has been used.
    pub fn pick_next(&mut self) -> GameResult<Prompt> {
        let idx = match self.choose_unused(true) {
            Some(idx) => idx,
            None => match self.choose_unused(false) {
                Some(idx) => {
                    tracing::debug!("Category pool exhausted, borrowing from full catalog");
                    idx
                }
                None => {
                    tracing::debug!("All prompts used, starting a new cycle");
                    self.used.clear();
                    self.choose_unused(false).ok_or(GameError::EmptyCatalog)?
                }
            },
        };

        let prompt = self.prompts[idx].clone();
        self.used.insert(prompt.id.clone());
        Ok(prompt)
    }

    fn choose_unused(&mut self, pool_only: bool) -> Option<usize> {
        let candidates: Vec<usize> = if pool_only {
            self.pool
                .iter()
                .copied()
                .filter(|&idx| !self.used.contains(&self.prompts[idx].id))
                .collect()
        } else {
            (0..self.prompts.len())
                .filter(|&idx| !self.used.contains(&self.prompts[idx].id))
                .collect()
        };
        candidates.choose(&mut self.rng).copied()
    }
}

fn parse_prompts(json: &str) -> GameResult<Vec<Prompt>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| GameError::malformed("<source>", format!("expected a list of prompts: {}", e)))?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let label = value
                .get("id")
                .and_then(|id| id.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", idx));
            serde_json::from_value::<Prompt>(value).map_err(|e| GameError::malformed(label, e.to_string()))
        })
        .collect()
}

fn validate(prompts: &[Prompt], policy: AliasPolicy) -> GameResult<()> {
    if prompts.is_empty() {
        return Err(GameError::EmptyCatalog);
    }

    let mut ids = HashSet::new();
    for prompt in prompts {
        if prompt.id.trim().is_empty() {
            return Err(GameError::malformed("<blank>", "id must not be empty"));
        }
        if !ids.insert(prompt.id.as_str()) {
            return Err(GameError::malformed(&prompt.id, "duplicate id"));
        }
        if prompt.prompt_text.trim().is_empty() {
            return Err(GameError::malformed(&prompt.id, "prompt text must not be empty"));
        }
        if prompt.answers.is_empty() {
            return Err(GameError::malformed(&prompt.id, "needs at least one answer"));
        }
        if let Some(pos) = prompt.answers.iter().position(|a| a.name.trim().is_empty()) {
            return Err(GameError::malformed(
                &prompt.id,
                format!("answer #{} has an empty name", pos + 1),
            ));
        }

        for collision in lookup::collisions(prompt) {
            match policy {
                AliasPolicy::Strict => {
                    return Err(GameError::AliasCollision {
                        prompt: prompt.id.clone(),
                        key: collision.key,
                        first_rank: collision.first_rank,
                        second_rank: collision.second_rank,
                    });
                }
                AliasPolicy::Lenient => tracing::warn!(
                    "Prompt {}: \"{}\" matches rank {} and rank {}, rank {} wins",
                    prompt.id,
                    collision.key,
                    collision.first_rank,
                    collision.second_rank,
                    collision.second_rank
                ),
            }
        }
    }

    Ok(())
}
