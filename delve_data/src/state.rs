use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grid coordinate, serialised as a 2-element `[x, y]` array.
pub type Coord = [i64; 2];

/// Numeric literal that keeps the integer/float distinction from the
/// source, so grid coordinates and counters never grow decimal points in
/// the emitted JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    Int(i64),
    Float(f64),
}

/// A scalar literal carried from the DSL into the game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

/// Where an entity starts on the grid.
///
/// `Random` placements are left unresolved here; the runtime rolls them
/// once at game start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlacementState {
    All,
    Coordinate { coord: Coord },
    Range { coord1: Coord, coord2: Coord },
    Random { percentage: Num },
}

/// Grid dimensions of the playfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub width: i64,
    pub height: i64,
}

impl Default for WorldState {
    fn default() -> Self {
        Self { width: 100, height: 100 }
    }
}

/// The player character. Health, level, and experience start from fixed
/// defaults; `show_health_bar` is runtime combat UI state saved so that
/// save files round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub unique_name: String,
    pub position: Coord,
    pub health: i64,
    pub experience: i64,
    pub level: i64,
    pub inventory: Vec<String>,
    pub context: Option<String>,
    pub talked_to_npcs: Vec<String>,
    #[serde(rename = "showHealthBar")]
    pub show_health_bar: bool,
}

/// Passive map decoration. Some names (`wall`, `stone`) block movement at
/// runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureState {
    pub name: String,
    pub placement: PlacementState,
}

/// A rare collectible. Behaves like an item without a type subclass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MythicState {
    pub unique_name: String,
    pub can_pickup: bool,
    pub picked_up: bool,
    pub catch_message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placement: Option<PlacementState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub unique_name: String,
    pub item_type: String,
    pub can_pickup: bool,
    pub picked_up: bool,
    pub effect: Option<String>,
    pub damage: i64,
    pub catch_message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placement: Option<PlacementState>,
}

/// Monster behaviour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    #[serde(rename = "monster-static")]
    Static,
    #[serde(rename = "monster-dynamic")]
    Dynamic,
    #[serde(rename = "monster-boss")]
    Boss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterState {
    pub unique_name: String,
    pub monster_type: MonsterKind,
    pub health: i64,
    pub max_health: i64,
    pub experience: i64,
    pub defeated: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placement: Option<PlacementState>,
}

/// NPC behaviour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcKind {
    #[serde(rename = "npc-static")]
    Static,
    #[serde(rename = "npc-dynamic")]
    Dynamic,
    #[serde(rename = "npc-state-machine")]
    StateMachine,
}

/// Attribute an NPC condition inspects on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcConditionKind {
    Item,
    Experience,
    Health,
}

/// What a satisfied NPC condition overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpcThenAction {
    Response,
    Context,
}

/// A conditional override attached to an NPC: when the player satisfies
/// the check, the NPC swaps its response or its LLM context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcConditionState {
    pub condition_type: NpcConditionKind,
    pub operator: Option<String>,
    pub value: Option<Value>,
    pub then_action: NpcThenAction,
    pub action_value: String,
}

/// One exchange in an NPC conversation, as stored in save files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcState {
    pub unique_name: String,
    pub npc_type: NpcKind,
    pub context: Option<String>,
    pub response: Option<String>,
    pub state_machine: String,
    pub emoji: String,
    pub agenda: Option<String>,
    pub conditions: Vec<NpcConditionState>,
    pub catch_message: String,
    pub conversation_history: Vec<ChatMessage>,
    pub has_responded: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub placement: Option<PlacementState>,
}

/// Condition discriminant; mirrors the rule grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Position,
    Has,
    Comparison,
    TalkedTo,
    RespondedTo,
}

/// A serialised rule/quest/end-game condition. Optional fields are only
/// present for the variants that use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionState {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub position: Option<Coord>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "talk")]
    Talk,
    #[serde(rename = "level up")]
    LevelUp,
    #[serde(rename = "command")]
    Command,
}

/// A serialised rule/quest action. All four fields are always emitted;
/// the runtime dispatches on `type` and ignores the rest when null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub command: Option<String>,
    pub target: Option<String>,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestState {
    pub id: String,
    pub conditions: Vec<ConditionState>,
    pub action: ActionState,
    pub status: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleState {
    pub id: String,
    pub conditions: Vec<ConditionState>,
    pub action: ActionState,
    pub triggered: bool,
}

/// Outcome tag of an end-game clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndResult {
    #[serde(rename = "win the game")]
    Win,
    #[serde(rename = "die and lose the game")]
    Lose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndConditionState {
    pub condition: ConditionState,
    pub result: Option<EndResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndGameState {
    #[serde(default)]
    pub conditions: Vec<EndConditionState>,
    #[serde(default)]
    pub win_message: Option<String>,
    #[serde(default)]
    pub lose_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OnGameStartState {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text_lines: Vec<String>,
    /// `(anchor, url)` pairs, serialised as 2-element arrays.
    #[serde(default)]
    pub links: Vec<(String, String)>,
}

/// The complete initial game state embedded in the emitted HTML.
///
/// Field order here is the wire order: serialisation must be byte-stable
/// across runs for identical input, so nothing in this tree may iterate a
/// hash map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub world: WorldState,
    pub user: UserState,
    /// Reserved for runtime terrain overrides; always empty at compile time.
    pub terrain: BTreeMap<String, Value>,
    pub furniture: Vec<FurnitureState>,
    pub mythics: Vec<MythicState>,
    pub items: Vec<ItemState>,
    pub monsters: Vec<MonsterState>,
    pub npcs: Vec<NpcState>,
    /// Top-level `let` bindings, in declaration order.
    #[serde(with = "ordered_map")]
    pub variables: Vec<(String, Value)>,
    pub quests: Vec<QuestState>,
    pub rules: Vec<RuleState>,
    /// Serialises as `{}` when the source had no `end_game:` section.
    #[serde(with = "section")]
    pub end_game: Option<EndGameState>,
    /// Serialises as `{}` when the source had no `on_game_start:` section.
    #[serde(with = "section")]
    pub on_game_start: Option<OnGameStartState>,
}

/// Serialise a `Vec<(K, V)>` as a JSON object, preserving insertion order.
mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<K, V, S>(pairs: &[(K, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct PairsVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for PairsVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Vec<(K, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    pairs.push(entry);
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }
}

/// Serialise `Option<T>` as the value itself, or as `{}` when `None`.
mod section {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Some)
    }
}
