//! Anonymous player identity
//!
//! The id is an opaque client-generated token, persisted locally so repeat
//! visits keep the same leaderboard slot. It is not an account.

use rand::Rng;

use super::storage::KeyValueStore;

const ID_KEY: &str = "flappy_player_id";

/// Who is submitting scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub id: String,
    pub name: String,
}

impl PlayerIdentity {
    /// Load the stored id or mint and persist a new one
    pub fn load_or_create(store: &dyn KeyValueStore, rng: &mut impl Rng, name: &str) -> Self {
        let id = match store.get(ID_KEY) {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = format!("{:016x}{:08x}", rng.random::<u64>(), rng.random::<u32>());
                if let Err(e) = store.set(ID_KEY, &id) {
                    log::warn!("Could not persist player id: {}", e);
                }
                log::info!("Created player id {}", id);
                id
            }
        };
        Self {
            id,
            name: name.to_string(),
        }
    }
}
