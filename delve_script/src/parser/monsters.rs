//! Monster declarations.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{MonsterDecl, MonsterType};

impl Parser {
    /// `monsters:` followed by typed blocks; the head word picks the
    /// behaviour class and anything else is rejected outright.
    pub(super) fn parse_monsters(&mut self) -> Result<Vec<MonsterDecl>, SyntaxError> {
        self.expect(TokenKind::Monsters)?;
        self.expect(TokenKind::Colon)?;

        let mut monsters = Vec::new();
        while self.at(TokenKind::Identifier) {
            let head = self.current().clone();
            let monster_type = match head.value.as_str() {
                Some("monster-static") => MonsterType::Static,
                Some("monster-dynamic") => MonsterType::Dynamic,
                Some("monster-boss") => MonsterType::Boss,
                other => {
                    return Err(SyntaxError::new(
                        format!(
                            "expected 'monster-static', 'monster-dynamic', or 'monster-boss', got '{}'",
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
            let mut health = None;
            let mut killable_hits = None;
            let mut experience = None;

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
                    TokenKind::Health => {
                        self.advance();
                        health = Some(self.expect_int()?);
                    }
                    // Legacy spelling: `killable N hit`.
                    TokenKind::Killable => {
                        self.advance();
                        killable_hits = Some(self.expect_int()?);
                        self.expect(TokenKind::Hit)?;
                    }
                    TokenKind::Gives => {
                        self.advance();
                        experience = Some(self.expect_int()?);
                        self.expect(TokenKind::Experience)?;
                    }
                    _ => break,
                }
            }

            if let Some(unique_name) = unique_name {
                monsters.push(MonsterDecl {
                    unique_name,
                    monster_type,
                    placement,
                    health,
                    killable_hits,
                    experience,
                });
            }
        }
        Ok(monsters)
    }
}
