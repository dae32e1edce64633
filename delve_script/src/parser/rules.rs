//! Rules and quests: condition grammar, actions, and quest naming.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{Action, CmpOp, Condition, Quest, QuestsSection, Rule, RulesSection};

impl Parser {
    pub(super) fn parse_rules_section(&mut self) -> Result<RulesSection, SyntaxError> {
        self.expect(TokenKind::Rules)?;
        self.expect(TokenKind::Colon)?;

        let mut rules = Vec::new();
        while self.at(TokenKind::If) {
            rules.push(self.parse_rule()?);
        }
        Ok(RulesSection { rules })
    }

    /// `if <cond> (and <cond>)* then <action>`
    fn parse_rule(&mut self) -> Result<Rule, SyntaxError> {
        self.expect(TokenKind::If)?;
        let mut conditions = vec![self.parse_condition()?];
        while self.at(TokenKind::And) {
            self.advance();
            conditions.push(self.parse_condition()?);
        }
        self.expect(TokenKind::Then)?;
        let action = self.parse_action()?;
        Ok(Rule { conditions, action })
    }

    /// Conditions open with an entity name (`user` or any identifier) and
    /// dispatch on the following word.
    pub(super) fn parse_condition(&mut self) -> Result<Condition, SyntaxError> {
        let entity = if self.at(TokenKind::User) {
            self.advance();
            "user".to_string()
        } else {
            self.expect_identifier()?
        };

        // `wizard responded` / `wizard responds` reads the entity itself as
        // the NPC; check before the other condition forms.
        if self.ident_is("responded") || self.ident_is("responds") {
            self.advance();
            return Ok(Condition::RespondedTo { npc: entity });
        }

        match self.current().kind {
            TokenKind::Is => {
                self.advance();
                self.expect(TokenKind::At)?;
                let at = self.parse_coordinate()?;
                Ok(Condition::Position { entity, at })
            }
            TokenKind::Has => {
                self.advance();
                match self.current().kind {
                    TokenKind::Identifier if self.ident_is("item") => {
                        self.advance();
                        let name = self.expect_string()?;
                        Ok(Condition::Has {
                            entity,
                            value: crate::Value::Str(name),
                        })
                    }
                    TokenKind::Experience | TokenKind::Health => {
                        self.advance();
                        let operator = self.parse_cmp_op().unwrap_or(CmpOp::Eq);
                        let value = self.expect_number()?;
                        Ok(Condition::Comparison { entity, operator, value })
                    }
                    _ => {
                        let value = self.parse_value()?;
                        Ok(Condition::Has { entity, value })
                    }
                }
            }
            TokenKind::Identifier if self.ident_is("talked") => {
                self.advance();
                self.expect(TokenKind::To)?;
                let npc = self.expect_identifier()?;
                Ok(Condition::TalkedTo { entity, npc })
            }
            _ => Err(self.error_here("expected a condition")),
        }
    }

    /// `talk-*`, `level up`, or a bare identifier command.
    pub(super) fn parse_action(&mut self) -> Result<Action, SyntaxError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::LevelUp => {
                self.advance();
                Ok(Action::LevelUp)
            }
            TokenKind::Identifier => {
                let name = self.expect_identifier()?;
                if name.starts_with("talk-") {
                    Ok(Action::Talk(name))
                } else {
                    Ok(Action::Command(name))
                }
            }
            _ => Err(self.error_here("expected an action")),
        }
    }

    /// Quests are rules with an optional `name :` prefix, detected by
    /// two-token lookahead.
    pub(super) fn parse_quests_section(&mut self) -> Result<QuestsSection, SyntaxError> {
        self.expect(TokenKind::Quests)?;
        self.expect(TokenKind::Colon)?;

        let mut quests = Vec::new();
        while self.at(TokenKind::If) || self.at(TokenKind::Identifier) {
            let mut name = None;
            if self.at(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Colon {
                name = Some(self.expect_identifier()?);
                self.expect(TokenKind::Colon)?;
            }
            quests.push(self.parse_quest(name)?);
        }
        Ok(QuestsSection { quests })
    }

    fn parse_quest(&mut self, name: Option<String>) -> Result<Quest, SyntaxError> {
        self.expect(TokenKind::If)?;
        let mut conditions = vec![self.parse_condition()?];
        while self.at(TokenKind::And) {
            self.advance();
            conditions.push(self.parse_condition()?);
        }
        self.expect(TokenKind::Then)?;
        let action = self.parse_action()?;
        Ok(Quest { name, conditions, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_program;
    use crate::{Num, Value};

    fn parse(src: &str) -> crate::Program {
        parse_program(tokenize(src).unwrap()).expect("parse ok")
    }

    #[test]
    fn comparison_rule_with_level_up() {
        let program = parse("rules: if user has experience > 10 then level up");
        let rules = program.rules.unwrap().rules;
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].conditions,
            vec![Condition::Comparison {
                entity: "user".into(),
                operator: CmpOp::Gt,
                value: Num::Int(10),
            }]
        );
        assert_eq!(rules[0].action, Action::LevelUp);
    }

    #[test]
    fn operator_defaults_to_equality() {
        let program = parse("rules: if user has health 50 then talk-static");
        let rules = program.rules.unwrap().rules;
        assert_eq!(
            rules[0].conditions,
            vec![Condition::Comparison {
                entity: "user".into(),
                operator: CmpOp::Eq,
                value: Num::Int(50),
            }]
        );
        assert_eq!(rules[0].action, Action::Talk("talk-static".into()));
    }

    #[test]
    fn conjunction_collects_every_condition() {
        let program = parse(
            "rules: if user is at (3,4) and user has item \"key\" and user talked to wizard then open_door",
        );
        let rule = &program.rules.unwrap().rules[0];
        assert_eq!(rule.conditions.len(), 3);
        assert_eq!(
            rule.conditions[0],
            Condition::Position { entity: "user".into(), at: (3, 4) }
        );
        assert_eq!(
            rule.conditions[1],
            Condition::Has { entity: "user".into(), value: Value::Str("key".into()) }
        );
        assert_eq!(
            rule.conditions[2],
            Condition::TalkedTo { entity: "user".into(), npc: "wizard".into() }
        );
        assert_eq!(rule.action, Action::Command("open_door".into()));
    }

    #[test]
    fn responded_reads_the_entity_as_the_npc() {
        let program = parse("rules: if wizard responded then talk-dynamic");
        let rule = &program.rules.unwrap().rules[0];
        assert_eq!(rule.conditions, vec![Condition::RespondedTo { npc: "wizard".into() }]);

        let program = parse("rules: if wizard responds then talk-dynamic");
        let rule = &program.rules.unwrap().rules[0];
        assert_eq!(rule.conditions, vec![Condition::RespondedTo { npc: "wizard".into() }]);
    }

    #[test]
    fn named_quest_keeps_its_name() {
        let program = parse("quests: find_key: if user has item \"key\" then talk-static");
        let quests = program.quests.unwrap().quests;
        assert_eq!(quests.len(), 1);
        assert_eq!(quests[0].name.as_deref(), Some("find_key"));
    }

    #[test]
    fn anonymous_quest_has_no_name() {
        let program = parse("quests: if user has item \"key\" then talk-static");
        let quests = program.quests.unwrap().quests;
        assert_eq!(quests[0].name, None);
    }

    #[test]
    fn mixed_named_and_anonymous_quests() {
        let program = parse(
            "quests:\n\
             first: if user is at (1,1) then talk-static\n\
             if user is at (2,2) then talk-static",
        );
        let quests = program.quests.unwrap().quests;
        assert_eq!(quests.len(), 2);
        assert_eq!(quests[0].name.as_deref(), Some("first"));
        assert_eq!(quests[1].name, None);
    }
}
