//! NPC declarations, including their conditional response overrides.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{CmpOp, NpcCondition, NpcConditionType, NpcDecl, NpcThen, NpcType, Value};

impl Parser {
    /// `NPC:` followed by typed blocks (`npc-static:`, `npc-dynamic:`,
    /// `npc-state-machine:`).
    pub(super) fn parse_npcs(&mut self) -> Result<Vec<NpcDecl>, SyntaxError> {
        self.expect(TokenKind::Npc)?;
        self.expect(TokenKind::Colon)?;

        let mut npcs = Vec::new();
        while self.at(TokenKind::Identifier) {
            let head = self.current().clone();
            let npc_type = match head.value.as_str() {
                Some("npc-static") => NpcType::Static,
                Some("npc-dynamic") => NpcType::Dynamic,
                Some("npc-state-machine") => NpcType::StateMachine,
                other => {
                    return Err(SyntaxError::new(
                        format!(
                            "expected 'npc-static', 'npc-dynamic', or 'npc-state-machine', got '{}'",
                            other.unwrap_or_default()
                        ),
                        head.line,
                        head.column,
                    ));
                }
            };
            self.advance();
            self.expect(TokenKind::Colon)?;

            let mut unique_name = None;
            let mut placement = None;
            let mut context = None;
            let mut response = None;
            let mut state_machine = None;
            let mut emoji = None;
            let mut agenda = None;
            let mut conditions = Vec::new();
            let mut catch_message = None;

            loop {
                match self.current().kind {
                    TokenKind::Comma => self.advance(),
                    TokenKind::Identifier if self.ident_is("unique_name") => {
                        self.advance();
                        self.expect(TokenKind::Equals)?;
                        unique_name = Some(self.expect_string()?);
                    }
                    TokenKind::Place => {
                        self.advance();
                        self.expect(TokenKind::At)?;
                        placement = Some(self.parse_placement()?);
                    }
                    TokenKind::Identifier if self.ident_is("context") => {
                        self.advance();
                        context = Some(self.expect_string()?);
                    }
                    TokenKind::Identifier if self.ident_is("response") => {
                        self.advance();
                        response = Some(self.expect_string()?);
                    }
                    TokenKind::Identifier if self.ident_is("state_machine") => {
                        self.advance();
                        self.expect(TokenKind::Equals)?;
                        state_machine = Some(self.expect_string()?);
                    }
                    TokenKind::Identifier if self.ident_is("emoji") => {
                        self.advance();
                        self.expect(TokenKind::Equals)?;
                        emoji = Some(self.expect_string()?);
                    }
                    TokenKind::Identifier if self.ident_is("agenda") => {
                        self.advance();
                        agenda = Some(self.expect_string()?);
                    }
                    TokenKind::If => conditions.push(self.parse_npc_condition()?),
                    TokenKind::Catch => {
                        self.advance();
                        catch_message = Some(self.expect_string()?);
                    }
                    _ => break,
                }
            }

            if let Some(unique_name) = unique_name {
                npcs.push(NpcDecl {
                    npc_type,
                    unique_name,
                    placement,
                    context,
                    response,
                    state_machine,
                    emoji,
                    agenda,
                    conditions,
                    catch_message,
                });
            }
        }
        Ok(npcs)
    }

    /// `if user has item "key" then response "..."` or
    /// `if user has experience > 10 then context "..."`. A missing
    /// comparison operator defaults to `==`.
    fn parse_npc_condition(&mut self) -> Result<NpcCondition, SyntaxError> {
        self.expect(TokenKind::If)?;
        if self.at(TokenKind::User) {
            self.advance();
        } else {
            self.expect(TokenKind::Identifier)?; // 'user'
        }
        self.expect(TokenKind::Has)?;

        let (condition_type, operator, value) = match self.current().kind {
            TokenKind::Identifier if self.ident_is("item") => {
                self.advance();
                let name = self.expect_string()?;
                (NpcConditionType::Item, None, Value::Str(name))
            }
            TokenKind::Experience | TokenKind::Health => {
                let condition_type = if self.at(TokenKind::Experience) {
                    NpcConditionType::Experience
                } else {
                    NpcConditionType::Health
                };
                self.advance();
                let operator = Some(self.parse_cmp_op().unwrap_or(CmpOp::Eq));
                let value = match self.expect_number()? {
                    crate::Num::Int(n) => Value::Int(n),
                    crate::Num::Float(f) => Value::Float(f),
                };
                (condition_type, operator, value)
            }
            _ => return Err(self.error_here("expected 'item', 'experience', or 'health'")),
        };

        self.expect(TokenKind::Then)?;
        let then_action = match self.current().value.as_str() {
            Some("response") => NpcThen::Response,
            Some("context") => NpcThen::Context,
            _ => return Err(self.error_here("expected 'response' or 'context'")),
        };
        self.expect(TokenKind::Identifier)?;
        let action_value = self.expect_string()?;

        Ok(NpcCondition {
            condition_type,
            operator,
            value,
            then_action,
            action_value,
        })
    }

    /// Consume a comparison operator token if one is present.
    pub(super) fn parse_cmp_op(&mut self) -> Option<CmpOp> {
        let op = match self.current().kind {
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::Ge => CmpOp::Ge,
            TokenKind::Le => CmpOp::Le,
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::Ne => CmpOp::Ne,
            _ => return None,
        };
        self.advance();
        Some(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse_program;
    use crate::Program;

    fn parse(src: &str) -> Program {
        parse_program(tokenize(src).unwrap()).expect("parse ok")
    }

    #[test]
    fn full_npc_declaration_parses() {
        let program = parse(
            "init:\n\
             NPC:\n\
             npc-dynamic:\n\
             unique_name=\"oracle\"\n\
             context \"speaks in riddles\"\n\
             response \"Hmm.\"\n\
             state_machine = \"waiting\"\n\
             emoji = \"🔮\"\n\
             agenda \"hint at the orb\"\n\
             place at (7,7)\n\
             catch \"She ignores you.\"",
        );
        let npc = &program.init.unwrap().npcs[0];
        assert_eq!(npc.npc_type, NpcType::Dynamic);
        assert_eq!(npc.unique_name, "oracle");
        assert_eq!(npc.context.as_deref(), Some("speaks in riddles"));
        assert_eq!(npc.response.as_deref(), Some("Hmm."));
        assert_eq!(npc.state_machine.as_deref(), Some("waiting"));
        assert_eq!(npc.emoji.as_deref(), Some("🔮"));
        assert_eq!(npc.agenda.as_deref(), Some("hint at the orb"));
        assert_eq!(npc.catch_message.as_deref(), Some("She ignores you."));
    }

    #[test]
    fn npc_item_condition_has_no_operator() {
        let program = parse(
            "init:\n\
             NPC:\n\
             npc-static: unique_name=\"guard\" response \"Halt!\" place at (1,1) \
             if user has item \"pass\" then response \"Go ahead.\"",
        );
        let npc = &program.init.unwrap().npcs[0];
        assert_eq!(npc.conditions.len(), 1);
        let condition = &npc.conditions[0];
        assert_eq!(condition.condition_type, NpcConditionType::Item);
        assert_eq!(condition.operator, None);
        assert_eq!(condition.value, Value::Str("pass".into()));
        assert_eq!(condition.then_action, NpcThen::Response);
        assert_eq!(condition.action_value, "Go ahead.");
    }

    #[test]
    fn npc_numeric_condition_defaults_to_equality() {
        let program = parse(
            "init:\n\
             NPC:\n\
             npc-static: unique_name=\"sage\" response \"...\" place at (1,1) \
             if user has experience 10 then context \"The sage nods.\"",
        );
        let condition = &program.init.unwrap().npcs[0].conditions[0];
        assert_eq!(condition.condition_type, NpcConditionType::Experience);
        assert_eq!(condition.operator, Some(CmpOp::Eq));
        assert_eq!(condition.value, Value::Int(10));
        assert_eq!(condition.then_action, NpcThen::Context);
    }

    #[test]
    fn npc_health_condition_takes_any_operator() {
        let program = parse(
            "init:\n\
             NPC:\n\
             npc-static: unique_name=\"healer\" response \"...\" place at (1,1) \
             if user has health <= 20 then response \"You look hurt.\"",
        );
        let condition = &program.init.unwrap().npcs[0].conditions[0];
        assert_eq!(condition.condition_type, NpcConditionType::Health);
        assert_eq!(condition.operator, Some(CmpOp::Le));
        assert_eq!(condition.value, Value::Int(20));
    }

    #[test]
    fn unknown_npc_type_is_rejected() {
        let err = parse_program(
            tokenize("init:\nNPC:\nnpc-wandering: unique_name=\"x\"").unwrap(),
        )
        .unwrap_err();
        assert!(err.message.contains("npc-wandering"));
    }
}
