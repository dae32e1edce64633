//! `delve_script` – authoring-focused DSL, parser, and compiler for building
//! Delve dungeon adventures.
//!
//! The crate powers the `delve_script` CLI but is fully usable as a library.
//! Major capabilities:
//! - Lex and parse `.delve` sources describing a 2-D grid world: furniture,
//!   mythics, items, monsters, NPCs, the player, rules, quests, end-game
//!   conditions, and a splash screen.
//! - Validate cross-references, unique names, and placement collisions
//!   before any output is produced.
//! - Compile the program into a single self-contained HTML document with an
//!   embedded runtime and a serialised `delve_data::GameState`.
//!
//! ```
//! use delve_script::compile;
//!
//! let src = r#"
//! init:
//!     world: 20 x 20 grid
//!     user:
//!         unique_name = "hero"
//!         at (2, 3)
//! "#;
//! let html = compile(src).expect("valid DSL");
//! assert!(html.contains("INITIAL_GAME_STATE"));
//! ```
//!
//! The pipeline is strictly linear: each stage consumes its predecessor's
//! output by move and nothing is written until every stage has succeeded.

use thiserror::Error;

mod codegen;
mod lexer;
mod parser;
mod validate;

pub use codegen::generate_html;
pub use lexer::{SyntaxError, Token, TokenKind, TokenValue, tokenize};
pub use parser::parse_program;
pub use validate::{ValidationError, validate};

/// Scalar literal produced by `let` bindings and bare `has` checks.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Numeric literal keeping the source's integer/float distinction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    /// Truncating integer view, matching how counts and coordinates are
    /// read from the token stream.
    pub fn as_i64(self) -> i64 {
        match self {
            Num::Int(n) => n,
            Num::Float(f) => f as i64,
        }
    }
}

/// Comparison operator used in rule and NPC conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

/// A parsed program: top-level `let` bindings plus the five sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub variables: Vec<VariableDecl>,
    pub init: Option<InitSection>,
    pub rules: Option<RulesSection>,
    pub quests: Option<QuestsSection>,
    pub end_game: Option<EndGameSection>,
    pub on_game_start: Option<OnGameStartSection>,
}

/// Top-level `let name = value` binding.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub value: Value,
}

/// Everything declared under `init:`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitSection {
    pub world: Option<WorldDecl>,
    pub furniture: Vec<FurnitureItem>,
    pub mythics: Vec<MythicItem>,
    pub items: Vec<ItemDecl>,
    pub monsters: Vec<MonsterDecl>,
    pub user: Option<UserDecl>,
    pub npcs: Vec<NpcDecl>,
    pub llm_endpoint: Option<String>,
    pub llm_token: Option<String>,
}

/// Grid dimensions; `world: grid` without numbers keeps the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldDecl {
    pub width: i64,
    pub height: i64,
}

impl Default for WorldDecl {
    fn default() -> Self {
        Self { width: 100, height: 100 }
    }
}

/// Where an entity starts. Exactly one placement per placeable entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Covers the whole map.
    All,
    Coordinate(i64, i64),
    /// Inclusive rectangle.
    Range { from: (i64, i64), to: (i64, i64) },
    /// Spawn probability in 0..=100, resolved by the runtime.
    Random(Num),
}

/// Passive decoration (`furniture: wall at (0,0) to (0,9)`).
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureItem {
    pub name: String,
    pub placement: Placement,
}

/// A rare pickup-capable collectible.
#[derive(Debug, Clone, PartialEq)]
pub struct MythicItem {
    pub unique_name: String,
    pub placement: Option<Placement>,
    pub can_pickup: bool,
    pub catch_message: Option<String>,
}

/// An item declaration; `item_type` is the declaring head word, e.g.
/// `item-heal` or `item-weapon`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDecl {
    pub item_type: String,
    pub unique_name: String,
    pub placement: Option<Placement>,
    pub can_pickup: bool,
    pub effect: Option<String>,
    pub damage: Option<i64>,
    pub catch_message: Option<String>,
}

/// Monster behaviour class, from the declaring head word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterType {
    Static,
    Dynamic,
    Boss,
}

impl MonsterType {
    pub fn as_str(self) -> &'static str {
        match self {
            MonsterType::Static => "monster-static",
            MonsterType::Dynamic => "monster-dynamic",
            MonsterType::Boss => "monster-boss",
        }
    }
}

/// `killable_hits` is the legacy health spelling; it only applies when
/// `health` is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterDecl {
    pub unique_name: String,
    pub monster_type: MonsterType,
    pub placement: Option<Placement>,
    pub health: Option<i64>,
    pub killable_hits: Option<i64>,
    pub experience: Option<i64>,
}

/// The player. `unique_name` defaults to `"player"` when omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDecl {
    pub unique_name: String,
    pub context: Option<String>,
    pub position: Option<(i64, i64)>,
}

/// NPC behaviour class, from the declaring head word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcType {
    Static,
    Dynamic,
    StateMachine,
}

impl NpcType {
    pub fn as_str(self) -> &'static str {
        match self {
            NpcType::Static => "npc-static",
            NpcType::Dynamic => "npc-dynamic",
            NpcType::StateMachine => "npc-state-machine",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcDecl {
    pub npc_type: NpcType,
    pub unique_name: String,
    pub placement: Option<Placement>,
    pub context: Option<String>,
    pub response: Option<String>,
    pub state_machine: Option<String>,
    pub emoji: Option<String>,
    pub agenda: Option<String>,
    pub conditions: Vec<NpcCondition>,
    pub catch_message: Option<String>,
}

/// Player attribute an NPC condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcConditionType {
    Item,
    Experience,
    Health,
}

/// What a satisfied NPC condition overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcThen {
    Response,
    Context,
}

/// `if user has experience > 10 then response "..."` attached to an NPC.
/// The operator is `None` for item checks; numeric checks without an
/// explicit operator default to `==` at lowering time.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcCondition {
    pub condition_type: NpcConditionType,
    pub operator: Option<CmpOp>,
    pub value: Value,
    pub then_action: NpcThen,
    pub action_value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesSection {
    pub rules: Vec<Rule>,
}

/// A non-empty conjunction of conditions plus one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub conditions: Vec<Condition>,
    pub action: Action,
}

/// Condition used in rules, quests, and end-game clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `<entity> is at (x, y)`
    Position { entity: String, at: (i64, i64) },
    /// `<entity> has item "name"` or `<entity> has <literal>`
    Has { entity: String, value: Value },
    /// `<entity> has experience|health <op> <number>`
    Comparison { entity: String, operator: CmpOp, value: Num },
    /// `user talked to <npc>`
    TalkedTo { entity: String, npc: String },
    /// `<npc> responded` – true once the NPC has produced a reply.
    RespondedTo { npc: String },
}

/// Rule/quest consequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `talk-static`, `talk-dynamic`, `talk-state-machine`
    Talk(String),
    LevelUp,
    /// Any other bare identifier, passed to the runtime as a command.
    Command(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestsSection {
    pub quests: Vec<Quest>,
}

/// A rule with an optional name; named quests keep their name as the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Quest {
    pub name: Option<String>,
    pub conditions: Vec<Condition>,
    pub action: Action,
}

/// Outcome tag of an end-game clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndResult {
    Win,
    Lose,
}

/// One flattened end-game condition. `and`-joined clauses produce several
/// entries sharing the same result tag; the runtime re-groups them.
#[derive(Debug, Clone, PartialEq)]
pub struct EndCondition {
    pub condition: Condition,
    pub result: Option<EndResult>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndGameSection {
    pub conditions: Vec<EndCondition>,
    pub win_message: Option<String>,
    pub lose_message: Option<String>,
}

/// Splash screen shown before the first frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnGameStartSection {
    pub title: Option<String>,
    pub text_lines: Vec<String>,
    /// `(anchor, url)` pairs.
    pub links: Vec<(String, String)>,
}

/// Top-level failure of a compilation run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Syntax(#[from] SyntaxError),
    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<ValidationError>),
}

/// Run the full pipeline on DSL source and return the finished HTML
/// document.
///
/// # Errors
/// Returns [`CompileError::Syntax`] on the first lexical or syntactic
/// failure, or [`CompileError::Validation`] carrying every semantic
/// diagnostic when validation fails.
pub fn compile(source: &str) -> Result<String, CompileError> {
    let tokens = tokenize(source)?;
    log::debug!("lexed {} tokens", tokens.len());
    let program = parse_program(tokens)?;
    let errors = validate(&program);
    if !errors.is_empty() {
        return Err(CompileError::Validation(errors));
    }
    Ok(generate_html(&program))
}
