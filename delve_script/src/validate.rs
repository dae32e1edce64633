//! Semantic validation: uniqueness, placement collisions, and reference
//! resolution. The validator never mutates the AST and batches every
//! diagnostic it finds; an empty list means "compile".

use std::collections::HashSet;
use std::fmt;

use crate::{Condition, Program};

/// A single semantic diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingInit,
    DuplicateName { name: String },
    Collision { x: i64, y: i64, occupants: Vec<String> },
    MissingUserPosition,
    UnplacedStaticNpc { name: String },
    UnknownEntity { name: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingInit => write!(f, "Missing required 'init:' section"),
            ValidationError::DuplicateName { name } => write!(f, "Duplicate unique_name: {name}"),
            ValidationError::Collision { x, y, occupants } => {
                write!(f, "Collision at ({x}, {y}): {}", occupants.join(", "))
            }
            ValidationError::MissingUserPosition => write!(f, "User must have an initial position"),
            ValidationError::UnplacedStaticNpc { name } => {
                write!(f, "npc-static '{name}' must have a placement specified")
            }
            ValidationError::UnknownEntity { name } => {
                write!(f, "Unknown entity referenced in rule: {name}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a parsed program. A missing `init:` section is fatal and
/// short-circuits the remaining checks.
pub fn validate(program: &Program) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(init) = &program.init else {
        errors.push(ValidationError::MissingInit);
        return errors;
    };

    check_uniqueness(program, &mut errors);
    check_collisions(program, &mut errors);

    // Minimal semantic requirements.
    if let Some(user) = &init.user
        && user.position.is_none()
    {
        errors.push(ValidationError::MissingUserPosition);
    }

    for npc in &init.npcs {
        if npc.npc_type == crate::NpcType::Static && npc.placement.is_none() {
            errors.push(ValidationError::UnplacedStaticNpc {
                name: npc.unique_name.clone(),
            });
        }
    }

    check_rule_references(program, &mut errors);

    errors
}

/// Names are compared by exact string equality; entities differing only in
/// case are distinct. Walk order: mythics, items, monsters, NPCs, user.
fn check_uniqueness(program: &Program, errors: &mut Vec<ValidationError>) {
    fn record(seen: &mut HashSet<String>, name: &str, errors: &mut Vec<ValidationError>) {
        if !seen.insert(name.to_string()) {
            errors.push(ValidationError::DuplicateName { name: name.to_string() });
        }
    }

    let init = program.init.as_ref().expect("checked by caller");
    let mut seen = HashSet::new();

    for mythic in &init.mythics {
        record(&mut seen, &mythic.unique_name, errors);
    }
    for item in &init.items {
        record(&mut seen, &item.unique_name, errors);
    }
    for monster in &init.monsters {
        record(&mut seen, &monster.unique_name, errors);
    }
    for npc in &init.npcs {
        record(&mut seen, &npc.unique_name, errors);
    }
    if let Some(user) = &init.user {
        record(&mut seen, &user.unique_name, errors);
    }
}

/// Two non-pickup entities (monsters, NPCs) may not share a coordinate
/// placement. Cells where every extra occupant is an item or mythic are
/// fine, and range/random placements are not checked at all.
fn check_collisions(program: &Program, errors: &mut Vec<ValidationError>) {
    let init = program.init.as_ref().expect("checked by caller");

    // Insertion-ordered so diagnostics come out in discovery order.
    let mut cells: Vec<((i64, i64), Vec<String>)> = Vec::new();
    let mut occupy = |pos: (i64, i64), descriptor: String| {
        if let Some((_, occupants)) = cells.iter_mut().find(|(p, _)| *p == pos) {
            occupants.push(descriptor);
        } else {
            cells.push((pos, vec![descriptor]));
        }
    };

    for mythic in &init.mythics {
        if let Some(crate::Placement::Coordinate(x, y)) = mythic.placement {
            occupy((x, y), format!("mythic:{}", mythic.unique_name));
        }
    }
    for item in &init.items {
        if let Some(crate::Placement::Coordinate(x, y)) = item.placement {
            occupy((x, y), format!("item:{}", item.unique_name));
        }
    }
    for monster in &init.monsters {
        if let Some(crate::Placement::Coordinate(x, y)) = monster.placement {
            occupy((x, y), format!("monster:{}", monster.unique_name));
        }
    }
    for npc in &init.npcs {
        if let Some(crate::Placement::Coordinate(x, y)) = npc.placement {
            occupy((x, y), format!("npc:{}", npc.unique_name));
        }
    }

    for ((x, y), occupants) in cells {
        if occupants.len() < 2 {
            continue;
        }
        let non_pickup = occupants
            .iter()
            .filter(|o| !o.starts_with("item:") && !o.starts_with("mythic:"))
            .count();
        if non_pickup > 1 {
            errors.push(ValidationError::Collision { x, y, occupants });
        }
    }
}

/// Every entity named in a rule condition (other than `user`) must resolve
/// to a declared mythic, item, monster, or NPC.
fn check_rule_references(program: &Program, errors: &mut Vec<ValidationError>) {
    let Some(rules) = &program.rules else { return };
    let init = program.init.as_ref().expect("checked by caller");

    let known: HashSet<&str> = init
        .mythics
        .iter()
        .map(|m| m.unique_name.as_str())
        .chain(init.items.iter().map(|i| i.unique_name.as_str()))
        .chain(init.monsters.iter().map(|m| m.unique_name.as_str()))
        .chain(init.npcs.iter().map(|n| n.unique_name.as_str()))
        .collect();

    for rule in &rules.rules {
        for condition in &rule.conditions {
            let entity = match condition {
                Condition::Position { entity, .. }
                | Condition::Has { entity, .. }
                | Condition::Comparison { entity, .. }
                | Condition::TalkedTo { entity, .. } => entity,
                Condition::RespondedTo { npc } => npc,
            };
            if entity != "user" && !known.contains(entity.as_str()) {
                errors.push(ValidationError::UnknownEntity { name: entity.clone() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_program;

    fn validate_src(src: &str) -> Vec<ValidationError> {
        validate(&parse_program(tokenize(src).unwrap()).unwrap())
    }

    #[test]
    fn empty_program_is_missing_init() {
        let errors = validate_src("");
        assert_eq!(errors, vec![ValidationError::MissingInit]);
        assert_eq!(errors[0].to_string(), "Missing required 'init:' section");
    }

    #[test]
    fn duplicate_names_report_once_per_repeat() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             items:\n\
             item-key: unique_name=\"key\" place at (1,1)\n\
             item-key: unique_name=\"key\" place at (2,2)",
        );
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateName { name: "key".into() }]
        );
        assert_eq!(errors[0].to_string(), "Duplicate unique_name: key");
    }

    #[test]
    fn names_differing_in_case_are_distinct() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             items:\n\
             item-key: unique_name=\"Key\" place at (1,1)\n\
             item-key: unique_name=\"key\" place at (2,2)",
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn monster_and_npc_on_one_cell_collide() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             monsters:\n\
             monster-static: unique_name=\"ogre\" place at (5,5)\n\
             NPC:\n\
             npc-static: unique_name=\"guide\" place at (5,5) response \"hi\"",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Collision at (5, 5): monster:ogre, npc:guide"
        );
    }

    #[test]
    fn items_and_mythics_never_collide() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             mytics:\n\
             mythic-static: unique_name=\"orb\" place at (5,5)\n\
             items:\n\
             item-key: unique_name=\"key\" place at (5,5)\n\
             monsters:\n\
             monster-static: unique_name=\"ogre\" place at (5,5)",
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn ranges_are_not_collision_checked() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,5)\n\
             furniture:\n\
             wall at (0,0) to (0,9)\n\
             monsters:\n\
             monster-static: unique_name=\"ogre\" place at (0,3)",
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn user_needs_a_position() {
        let errors = validate_src("init: user: unique_name=\"p\"");
        assert_eq!(errors, vec![ValidationError::MissingUserPosition]);
    }

    #[test]
    fn static_npcs_need_a_placement() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             NPC:\n\
             npc-static: unique_name=\"guide\" response \"hi\"",
        );
        assert_eq!(
            errors,
            vec![ValidationError::UnplacedStaticNpc { name: "guide".into() }]
        );
        assert_eq!(
            errors[0].to_string(),
            "npc-static 'guide' must have a placement specified"
        );
    }

    #[test]
    fn dynamic_npcs_may_be_unplaced() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             NPC:\n\
             npc-dynamic: unique_name=\"ghost\" context \"a ghost\"",
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }

    #[test]
    fn rule_conditions_must_reference_declared_entities() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             rules:\n\
             if phantom is at (1,1) then talk-static",
        );
        assert_eq!(
            errors,
            vec![ValidationError::UnknownEntity { name: "phantom".into() }]
        );
    }

    #[test]
    fn user_is_always_a_valid_reference() {
        let errors = validate_src(
            "init:\n\
             user: unique_name=\"p\" at (0,0)\n\
             rules:\n\
             if user has experience > 10 then level up",
        );
        assert!(errors.is_empty(), "unexpected: {errors:?}");
    }
}
