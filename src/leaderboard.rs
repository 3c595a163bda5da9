//! Leaderboard collaborator
//!
//! One best score per (game, player) pair. A submission only replaces the
//! stored score when it is strictly higher; the display name is always
//! refreshed. The local implementation persists to a key-value store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::storage::{KeyValueStore, StorageError};

/// Maximum number of entries returned by [`Leaderboard::get_top`]
pub const MAX_TOP_ENTRIES: usize = 10;

/// Longest accepted display name (characters)
pub const MAX_NAME_LEN: usize = 24;

/// Leaderboard failures
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("could not encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A row of the top list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u32,
}

/// A player's standing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub player_name: String,
    pub score: u32,
    /// 1-indexed
    pub rank: usize,
}

/// Score storage contract used by the game-over path
pub trait Leaderboard {
    fn submit_score(
        &mut self,
        game_id: &str,
        player_id: &str,
        player_name: &str,
        score: u32,
    ) -> Result<(), LeaderboardError>;

    /// Best entries for a game, highest first
    fn get_top(&self, game_id: &str) -> Vec<LeaderboardEntry>;

    fn get_rank(&self, game_id: &str, player_id: &str) -> Option<RankedEntry>;
}

/// Persisted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Record {
    game_id: String,
    player_id: String,
    player_name: String,
    score: u32,
}

/// Leaderboard kept in a key-value store (LocalStorage on the web)
pub struct LocalLeaderboard<S: KeyValueStore> {
    store: S,
    records: Vec<Record>,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    /// Storage key
    const STORAGE_KEY: &'static str = "flappy_leaderboard";

    /// Load from the store; missing or corrupt data starts fresh
    pub fn load(store: S) -> Self {
        let records = match store.get(Self::STORAGE_KEY) {
            Some(json) => match serde_json::from_str::<Vec<Record>>(&json) {
                Ok(records) => {
                    log::info!("Loaded {} leaderboard records", records.len());
                    records
                }
                Err(e) => {
                    log::warn!("Discarding corrupt leaderboard: {}", e);
                    Vec::new()
                }
            },
            None => {
                log::info!("No leaderboard found, starting fresh");
                Vec::new()
            }
        };
        Self { store, records }
    }

    fn save(&self, records: &[Record]) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string(records)?;
        self.store.set(Self::STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Records for one game sorted by score (desc), then name
    fn sorted_for(&self, game_id: &str) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| r.game_id == game_id)
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.player_name.cmp(&b.player_name))
        });
        rows
    }
}

impl<S: KeyValueStore> Leaderboard for LocalLeaderboard<S> {
    fn submit_score(
        &mut self,
        game_id: &str,
        player_id: &str,
        player_name: &str,
        score: u32,
    ) -> Result<(), LeaderboardError> {
        let name: String = player_name.trim().chars().take(MAX_NAME_LEN).collect();
        if name.is_empty() {
            return Err(LeaderboardError::EmptyName);
        }

        // Only committed in memory once the store accepts it
        let mut records = self.records.clone();
        let existing = records
            .iter_mut()
            .find(|r| r.game_id == game_id && r.player_id == player_id);

        match existing {
            Some(record) => {
                record.player_name = name;
                if score > record.score {
                    log::info!("New best for {}: {} -> {}", player_id, record.score, score);
                    record.score = score;
                }
            }
            None => records.push(Record {
                game_id: game_id.to_string(),
                player_id: player_id.to_string(),
                player_name: name,
                score,
            }),
        }

        self.save(&records)?;
        self.records = records;
        Ok(())
    }

    fn get_top(&self, game_id: &str) -> Vec<LeaderboardEntry> {
        self.sorted_for(game_id)
            .into_iter()
            .take(MAX_TOP_ENTRIES)
            .map(|r| LeaderboardEntry {
                player_name: r.player_name.clone(),
                score: r.score,
            })
            .collect()
    }

    fn get_rank(&self, game_id: &str, player_id: &str) -> Option<RankedEntry> {
        let record = self
            .records
            .iter()
            .find(|r| r.game_id == game_id && r.player_id == player_id)?;
        let better = self
            .records
            .iter()
            .filter(|r| r.game_id == game_id && r.score > record.score)
            .count();
        Some(RankedEntry {
            player_name: record.player_name.clone(),
            score: record.score,
            rank: better + 1,
        })
    }
}
