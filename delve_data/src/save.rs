use serde::{Deserialize, Serialize};

use crate::state::GameState;

/// Envelope the emitted runtime writes when the player saves.
///
/// The compiler never produces one of these; the type exists so tooling and
/// tests can round-trip saves against the same schema the runtime uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Save format version; currently always `"1.0"`.
    pub version: String,
    /// ISO-8601 timestamp of the save.
    pub timestamp: String,
    pub game_state: GameState,
}

impl SaveFile {
    pub const VERSION: &'static str = "1.0";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::*;
    use std::collections::BTreeMap;

    fn minimal_state() -> GameState {
        GameState {
            world: WorldState::default(),
            user: UserState {
                unique_name: "hero".into(),
                position: [2, 3],
                health: 100,
                experience: 0,
                level: 1,
                inventory: Vec::new(),
                context: None,
                talked_to_npcs: Vec::new(),
                show_health_bar: false,
            },
            terrain: BTreeMap::new(),
            furniture: Vec::new(),
            mythics: Vec::new(),
            items: Vec::new(),
            monsters: Vec::new(),
            npcs: Vec::new(),
            variables: Vec::new(),
            quests: Vec::new(),
            rules: Vec::new(),
            end_game: None,
            on_game_start: None,
        }
    }

    #[test]
    fn save_file_round_trips() {
        let save = SaveFile {
            version: SaveFile::VERSION.to_string(),
            timestamp: "2025-06-01T12:00:00Z".to_string(),
            game_state: minimal_state(),
        };
        let json = serde_json::to_string_pretty(&save).unwrap();
        let back: SaveFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, "1.0");
        assert_eq!(back.game_state.user.position, [2, 3]);
    }
}
