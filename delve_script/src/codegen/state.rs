//! Lowering from the AST to the serialised `delve_data::GameState`.
//!
//! This performs structural mapping only; cross-reference validation has
//! already happened. Every field of the wire schema is emitted, defaults
//! included, so the runtime never probes for missing keys.

use std::collections::BTreeMap;

use delve_data::{
    ActionKind, ActionState, ConditionKind, ConditionState, EndConditionState, EndGameState,
    FurnitureState, GameState, ItemState, MonsterKind, MonsterState, MythicState, NpcConditionKind,
    NpcConditionState, NpcKind, NpcState, NpcThenAction, OnGameStartState, PlacementState,
    QuestState, RuleState, UserState, WorldState,
};

use crate::{
    Action, Condition, EndResult, InitSection, MonsterType, NpcCondition, NpcConditionType,
    NpcThen, NpcType, Placement, Program, Value,
};

const DEFAULT_CATCH_MESSAGE: &str = "Not now";
const DEFAULT_NPC_EMOJI: &str = "👤";

pub(super) fn build_state(program: &Program) -> GameState {
    let empty_init = InitSection::default();
    let init = program.init.as_ref().unwrap_or(&empty_init);

    let world = init.world.unwrap_or_default();

    GameState {
        world: WorldState {
            width: world.width,
            height: world.height,
        },
        user: user_to_state(init),
        terrain: BTreeMap::new(),
        furniture: init
            .furniture
            .iter()
            .map(|f| FurnitureState {
                name: f.name.clone(),
                placement: placement_to_state(&f.placement),
            })
            .collect(),
        mythics: init.mythics.iter().map(mythic_to_state).collect(),
        items: init.items.iter().map(item_to_state).collect(),
        monsters: init.monsters.iter().map(monster_to_state).collect(),
        npcs: init.npcs.iter().map(npc_to_state).collect(),
        variables: program
            .variables
            .iter()
            .map(|v| (v.name.clone(), value_to_state(&v.value)))
            .collect(),
        quests: program
            .quests
            .as_ref()
            .map(|section| {
                section
                    .quests
                    .iter()
                    .enumerate()
                    .map(|(i, quest)| QuestState {
                        id: quest.name.clone().unwrap_or_else(|| format!("quest_{i}")),
                        conditions: quest.conditions.iter().map(condition_to_state).collect(),
                        action: action_to_state(&quest.action),
                        status: "active".to_string(),
                        completed: false,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        rules: program
            .rules
            .as_ref()
            .map(|section| {
                section
                    .rules
                    .iter()
                    .enumerate()
                    .map(|(i, rule)| RuleState {
                        id: format!("rule_{i}"),
                        conditions: rule.conditions.iter().map(condition_to_state).collect(),
                        action: action_to_state(&rule.action),
                        triggered: false,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        end_game: program.end_game.as_ref().map(|section| EndGameState {
            conditions: section
                .conditions
                .iter()
                .map(|ec| EndConditionState {
                    condition: condition_to_state(&ec.condition),
                    result: ec.result.map(|r| match r {
                        EndResult::Win => delve_data::EndResult::Win,
                        EndResult::Lose => delve_data::EndResult::Lose,
                    }),
                })
                .collect(),
            win_message: section.win_message.clone(),
            lose_message: section.lose_message.clone(),
        }),
        on_game_start: program.on_game_start.as_ref().map(|section| OnGameStartState {
            title: section.title.clone(),
            text_lines: section.text_lines.clone(),
            links: section.links.clone(),
        }),
    }
}

fn user_to_state(init: &InitSection) -> UserState {
    let (unique_name, context, position) = match &init.user {
        Some(user) => (
            user.unique_name.clone(),
            user.context.clone(),
            user.position.map(|(x, y)| [x, y]).unwrap_or([50, 50]),
        ),
        None => ("player".to_string(), None, [50, 50]),
    };
    UserState {
        unique_name,
        position,
        health: 100,
        experience: 0,
        level: 1,
        inventory: Vec::new(),
        context,
        talked_to_npcs: Vec::new(),
        show_health_bar: false,
    }
}

fn placement_to_state(placement: &Placement) -> PlacementState {
    match placement {
        Placement::All => PlacementState::All,
        Placement::Coordinate(x, y) => PlacementState::Coordinate { coord: [*x, *y] },
        Placement::Range { from, to } => PlacementState::Range {
            coord1: [from.0, from.1],
            coord2: [to.0, to.1],
        },
        Placement::Random(percentage) => PlacementState::Random {
            percentage: num_to_state(*percentage),
        },
    }
}

/// Coordinate placements resolve to a start position; random placements
/// are carried through for the runtime to roll. Other placement kinds are
/// dropped: `all` and ranges make no sense for point entities.
fn split_placement(placement: &Option<Placement>) -> (Option<[i64; 2]>, Option<PlacementState>) {
    match placement {
        Some(Placement::Coordinate(x, y)) => (Some([*x, *y]), None),
        Some(Placement::Random(percentage)) => (
            None,
            Some(PlacementState::Random {
                percentage: num_to_state(*percentage),
            }),
        ),
        _ => (None, None),
    }
}

fn mythic_to_state(mythic: &crate::MythicItem) -> MythicState {
    let (position, placement) = split_placement(&mythic.placement);
    MythicState {
        unique_name: mythic.unique_name.clone(),
        can_pickup: mythic.can_pickup,
        picked_up: false,
        catch_message: mythic
            .catch_message
            .clone()
            .unwrap_or_else(|| DEFAULT_CATCH_MESSAGE.to_string()),
        position,
        placement,
    }
}

fn item_to_state(item: &crate::ItemDecl) -> ItemState {
    let (position, placement) = split_placement(&item.placement);
    ItemState {
        unique_name: item.unique_name.clone(),
        item_type: item.item_type.clone(),
        can_pickup: item.can_pickup,
        picked_up: false,
        effect: item.effect.clone(),
        damage: item.damage.unwrap_or(1),
        catch_message: item
            .catch_message
            .clone()
            .unwrap_or_else(|| DEFAULT_CATCH_MESSAGE.to_string()),
        position,
        placement,
    }
}

fn monster_to_state(monster: &crate::MonsterDecl) -> MonsterState {
    let (position, placement) = split_placement(&monster.placement);
    // `health` beats the legacy `killable N hit` spelling when both appear.
    let health = monster.health.or(monster.killable_hits).unwrap_or(1);
    MonsterState {
        unique_name: monster.unique_name.clone(),
        monster_type: match monster.monster_type {
            MonsterType::Static => MonsterKind::Static,
            MonsterType::Dynamic => MonsterKind::Dynamic,
            MonsterType::Boss => MonsterKind::Boss,
        },
        health,
        max_health: health,
        experience: monster.experience.unwrap_or(0),
        defeated: false,
        position,
        placement,
    }
}

fn npc_to_state(npc: &crate::NpcDecl) -> NpcState {
    let (mut position, placement) = split_placement(&npc.placement);
    if npc.placement.is_none() && npc.npc_type == NpcType::Static {
        // The validator rejects unplaced static NPCs before we get here;
        // keep the runtime safe anyway.
        position = Some([10, 10]);
    }
    NpcState {
        unique_name: npc.unique_name.clone(),
        npc_type: match npc.npc_type {
            NpcType::Static => NpcKind::Static,
            NpcType::Dynamic => NpcKind::Dynamic,
            NpcType::StateMachine => NpcKind::StateMachine,
        },
        context: npc.context.clone(),
        response: npc.response.clone(),
        state_machine: npc.state_machine.clone().unwrap_or_else(|| "idle".to_string()),
        emoji: npc.emoji.clone().unwrap_or_else(|| DEFAULT_NPC_EMOJI.to_string()),
        agenda: npc.agenda.clone(),
        conditions: npc.conditions.iter().map(npc_condition_to_state).collect(),
        catch_message: npc
            .catch_message
            .clone()
            .unwrap_or_else(|| DEFAULT_CATCH_MESSAGE.to_string()),
        conversation_history: Vec::new(),
        has_responded: false,
        position,
        placement,
    }
}

fn npc_condition_to_state(condition: &NpcCondition) -> NpcConditionState {
    NpcConditionState {
        condition_type: match condition.condition_type {
            NpcConditionType::Item => NpcConditionKind::Item,
            NpcConditionType::Experience => NpcConditionKind::Experience,
            NpcConditionType::Health => NpcConditionKind::Health,
        },
        operator: condition.operator.map(|op| op.as_str().to_string()),
        value: Some(value_to_state(&condition.value)),
        then_action: match condition.then_action {
            NpcThen::Response => NpcThenAction::Response,
            NpcThen::Context => NpcThenAction::Context,
        },
        action_value: condition.action_value.clone(),
    }
}

fn condition_to_state(condition: &Condition) -> ConditionState {
    match condition {
        Condition::Position { entity, at } => ConditionState {
            kind: ConditionKind::Position,
            entity: entity.clone(),
            position: Some([at.0, at.1]),
            operator: None,
            value: None,
        },
        Condition::Has { entity, value } => ConditionState {
            kind: ConditionKind::Has,
            entity: entity.clone(),
            position: None,
            operator: None,
            value: Some(value_to_state(value)),
        },
        Condition::Comparison { entity, operator, value } => ConditionState {
            kind: ConditionKind::Comparison,
            entity: entity.clone(),
            position: None,
            operator: Some(operator.as_str().to_string()),
            value: Some(num_value_to_state(*value)),
        },
        Condition::TalkedTo { entity, npc } => ConditionState {
            kind: ConditionKind::TalkedTo,
            entity: entity.clone(),
            position: None,
            operator: None,
            value: Some(delve_data::Value::Str(npc.clone())),
        },
        Condition::RespondedTo { npc } => ConditionState {
            kind: ConditionKind::RespondedTo,
            entity: npc.clone(),
            position: None,
            operator: None,
            value: None,
        },
    }
}

fn action_to_state(action: &Action) -> ActionState {
    match action {
        Action::Talk(variant) => ActionState {
            kind: ActionKind::Talk,
            command: None,
            target: None,
            value: Some(delve_data::Value::Str(variant.clone())),
        },
        Action::LevelUp => ActionState {
            kind: ActionKind::LevelUp,
            command: None,
            target: None,
            value: None,
        },
        Action::Command(command) => ActionState {
            kind: ActionKind::Command,
            command: Some(command.clone()),
            target: None,
            value: None,
        },
    }
}

fn value_to_state(value: &Value) -> delve_data::Value {
    match value {
        Value::Bool(b) => delve_data::Value::Bool(*b),
        Value::Int(n) => delve_data::Value::Int(*n),
        Value::Float(f) => delve_data::Value::Float(*f),
        Value::Str(s) => delve_data::Value::Str(s.clone()),
    }
}

fn num_to_state(num: crate::Num) -> delve_data::Num {
    match num {
        crate::Num::Int(n) => delve_data::Num::Int(n),
        crate::Num::Float(f) => delve_data::Num::Float(f),
    }
}

fn num_value_to_state(num: crate::Num) -> delve_data::Value {
    match num {
        crate::Num::Int(n) => delve_data::Value::Int(n),
        crate::Num::Float(f) => delve_data::Value::Float(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_program;

    fn state_for(src: &str) -> GameState {
        build_state(&parse_program(tokenize(src).unwrap()).unwrap())
    }

    #[test]
    fn user_defaults_apply() {
        let state = state_for("init: user: unique_name=\"hero\" at (2,3)");
        assert_eq!(state.user.unique_name, "hero");
        assert_eq!(state.user.position, [2, 3]);
        assert_eq!(state.user.health, 100);
        assert_eq!(state.user.level, 1);
        assert_eq!(state.user.experience, 0);
        assert!(state.user.inventory.is_empty());
    }

    #[test]
    fn missing_user_falls_back_to_player_at_center() {
        let state = state_for("init: world: grid");
        assert_eq!(state.user.unique_name, "player");
        assert_eq!(state.user.position, [50, 50]);
    }

    #[test]
    fn monster_health_prefers_health_over_killable() {
        let state = state_for(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             monsters:\n\
             monster-boss: unique_name=\"dragon\" killable 3 hit health 20 place at (9,9) gives 50 experience",
        );
        let monster = &state.monsters[0];
        assert_eq!(monster.health, 20);
        assert_eq!(monster.max_health, 20);
        assert_eq!(monster.experience, 50);
        assert_eq!(monster.monster_type, MonsterKind::Boss);
        assert_eq!(monster.position, Some([9, 9]));
    }

    #[test]
    fn killable_hits_alias_health_when_absent() {
        let state = state_for(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             monsters:\n\
             monster-static: unique_name=\"rat\" killable 2 hit place at (1,2)",
        );
        assert_eq!(state.monsters[0].health, 2);
        // No `gives ... experience` clause: reward defaults to zero.
        assert_eq!(state.monsters[0].experience, 0);
    }

    #[test]
    fn random_placement_is_deferred_not_resolved() {
        let state = state_for(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             items:\n\
             item-heal: unique_name=\"potion\" place at random(40%) can be picked up by the user",
        );
        let item = &state.items[0];
        assert_eq!(item.position, None);
        assert_eq!(
            item.placement,
            Some(PlacementState::Random {
                percentage: delve_data::Num::Int(40)
            })
        );
        assert!(item.can_pickup);
        assert_eq!(item.damage, 1);
        assert_eq!(item.catch_message, "Not now");
    }

    #[test]
    fn quest_ids_prefer_names_over_ordinals() {
        let state = state_for(
            "init: user: unique_name=\"p\" at (0,0)\n\
             quests:\n\
             find_key: if user has item \"key\" then talk-static\n\
             if user is at (1,1) then talk-static",
        );
        assert_eq!(state.quests[0].id, "find_key");
        assert_eq!(state.quests[1].id, "quest_1");
        assert_eq!(state.quests[0].status, "active");
    }

    #[test]
    fn rule_ids_are_ordinal() {
        let state = state_for(
            "init: user: unique_name=\"p\" at (0,0)\n\
             rules:\n\
             if user has experience > 10 then level up\n\
             if user has experience > 20 then level up",
        );
        assert_eq!(state.rules[0].id, "rule_0");
        assert_eq!(state.rules[1].id, "rule_1");
        assert!(!state.rules[0].triggered);
        assert_eq!(state.rules[0].action.kind, ActionKind::LevelUp);
    }

    #[test]
    fn npc_defaults_apply() {
        let state = state_for(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             NPC:\n\
             npc-static: unique_name=\"guide\" response \"hi\" place at (4,4)",
        );
        let npc = &state.npcs[0];
        assert_eq!(npc.state_machine, "idle");
        assert_eq!(npc.emoji, "👤");
        assert_eq!(npc.catch_message, "Not now");
        assert!(!npc.has_responded);
        assert_eq!(npc.position, Some([4, 4]));
    }
}
