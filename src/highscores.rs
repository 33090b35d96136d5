//! High score leaderboard system
//!
//! One top-10 list per category: `classic_easy`, `classic_normal`,
//! `classic_hard` and `challenge`. Storage is left to the caller, which
//! moves the board around as JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, GameMode};
use crate::sim::RoundSummary;

/// Maximum number of high scores to keep per category
pub const MAX_HIGH_SCORES: usize = 10;

/// Longest player name kept on the board
pub const MAX_NAME_LEN: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Seconds the round lasted
    pub elapsed: f32,
}

/// High score leaderboard, keyed by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub categories: BTreeMap<String, Vec<HighScoreEntry>>,
}

/// Leaderboard category for a mode/difficulty pair. Challenge ignores
/// difficulty.
pub fn category_key(mode: GameMode, difficulty: Difficulty) -> String {
    match mode {
        GameMode::Challenge => "challenge".to_string(),
        GameMode::Classic => format!("classic_{}", difficulty.as_str()),
    }
}

/// Letters only, at most `MAX_NAME_LEN` of them
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphabetic())
        .take(MAX_NAME_LEN)
        .collect()
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries for a category, best first
    pub fn entries(&self, category: &str) -> &[HighScoreEntry] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if a score qualifies for the category's board
    pub fn qualifies(&self, category: &str, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let entries = self.entries(category);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry
        entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, category: &str, score: u64) -> Option<usize> {
        if !self.qualifies(category, score) {
            return None;
        }
        let entries = self.entries(category);
        let rank = entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(entries.len()) + 1)
    }

    /// Add a new score (if it qualifies). Ties rank below the existing
    /// entry. Returns the rank achieved (1-indexed).
    pub fn add_score(
        &mut self,
        category: &str,
        name: &str,
        score: u64,
        elapsed: f32,
    ) -> Option<usize> {
        if !self.qualifies(category, score) {
            return None;
        }

        let entry = HighScoreEntry {
            name: sanitize_name(name),
            score,
            elapsed,
        };

        let entries = self.categories.entry(category.to_string()).or_default();
        let pos = entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                entries.insert(i, entry);
                i + 1
            }
            None => {
                entries.push(entry);
                entries.len()
            }
        };

        entries.truncate(MAX_HIGH_SCORES);
        log::info!("High score {} in {} (rank {})", score, category, rank);

        Some(rank)
    }

    /// Record a finished round under its own category
    pub fn record_round(&mut self, name: &str, summary: &RoundSummary) -> Option<usize> {
        let category = category_key(summary.mode, summary.difficulty);
        self.add_score(&category, name, summary.final_score, summary.elapsed)
    }

    /// Check if every board is empty
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }

    /// Get the category's top score (if any)
    pub fn top_score(&self, category: &str) -> Option<u64> {
        self.entries(category).first().map(|e| e.score)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a saved board, re-sorting and trimming each category
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        for entries in scores.categories.values_mut() {
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(MAX_HIGH_SCORES);
        }
        log::info!("Loaded high scores for {} categories", scores.categories.len());
        Ok(scores)
    }
}
