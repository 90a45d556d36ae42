//! Per-round matcher: normalized answer text -> rank.

use crate::normalize::normalize;
use crate::types::Prompt;
use std::collections::HashMap;

/// Normalized answer names and aliases mapped to their 1-based rank
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup {
    ranks: HashMap<String, u32>,
}

/// Two different ranks of one prompt sharing a normalized key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub first_rank: u32,
    pub second_rank: u32,
}

impl Lookup {
    /// Build the lookup for a prompt. Later entries overwrite earlier ones
    /// sharing a key; catalog loading checks for that via [`collisions`].
    pub fn build(prompt: &Prompt) -> Self {
        let mut ranks = HashMap::new();
        for (key, rank) in keys(prompt) {
            ranks.insert(key, rank);
        }
        Self { ranks }
    }

    /// Rank for an already-normalized key
    pub fn rank(&self, key: &str) -> Option<u32> {
        self.ranks.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// Every (normalized key, rank) pair in insertion order, empty keys skipped
fn keys(prompt: &Prompt) -> impl Iterator<Item = (String, u32)> + '_ {
    prompt.answers.iter().enumerate().flat_map(|(idx, answer)| {
        let rank = idx as u32 + 1;
        std::iter::once(&answer.name)
            .chain(answer.aliases.iter())
            .map(|text| normalize(text))
            .filter(|key| !key.is_empty())
            .map(move |key| (key, rank))
    })
}

/// Keys claimed by more than one rank within a prompt
pub fn collisions(prompt: &Prompt) -> Vec<KeyCollision> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut found = Vec::new();

    for (key, rank) in keys(prompt) {
        match seen.get(&key) {
            Some(&first_rank) if first_rank != rank => found.push(KeyCollision {
                key,
                first_rank,
                second_rank: rank,
            }),
            Some(_) => {}
            None => {
                seen.insert(key, rank);
            }
        }
    }

    found
}
