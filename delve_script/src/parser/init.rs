//! `init:` section: world, LLM config, furniture, and the user.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{FurnitureItem, InitSection, UserDecl, WorldDecl};

impl Parser {
    pub(super) fn parse_init_section(&mut self) -> Result<InitSection, SyntaxError> {
        self.expect(TokenKind::Init)?;
        self.expect(TokenKind::Colon)?;

        let mut init = InitSection::default();
        loop {
            match self.current().kind {
                TokenKind::World => init.world = Some(self.parse_world()?),
                TokenKind::Identifier if self.ident_is("llm") => self.parse_llm_config(&mut init)?,
                TokenKind::Furniture => init.furniture.extend(self.parse_furniture()?),
                TokenKind::Mythics => init.mythics.extend(self.parse_mythics()?),
                TokenKind::Items => init.items.extend(self.parse_items()?),
                TokenKind::Monsters => init.monsters.extend(self.parse_monsters()?),
                TokenKind::User => init.user = Some(self.parse_user()?),
                TokenKind::Npc => init.npcs.extend(self.parse_npcs()?),
                _ => break,
            }
        }
        Ok(init)
    }

    /// `world: 20 x 30 grid` or `world: grid` for the 100x100 default.
    fn parse_world(&mut self) -> Result<WorldDecl, SyntaxError> {
        self.expect(TokenKind::World)?;
        self.expect(TokenKind::Colon)?;

        if self.at(TokenKind::Number) {
            let width = self.expect_int()?;
            self.expect(TokenKind::Identifier)?; // 'x'
            let height = self.expect_int()?;
            self.expect(TokenKind::Identifier)?; // 'grid'
            Ok(WorldDecl { width, height })
        } else {
            self.expect(TokenKind::Identifier)?; // 'grid'
            Ok(WorldDecl::default())
        }
    }

    /// `llm:` with `endpoint "<url>"` and `token "<bearer>"` entries.
    /// `llm` is an ordinary identifier, not a keyword.
    fn parse_llm_config(&mut self, init: &mut InitSection) -> Result<(), SyntaxError> {
        self.expect(TokenKind::Identifier)?; // 'llm'
        self.expect(TokenKind::Colon)?;

        while self.at(TokenKind::Identifier) {
            if self.ident_is("endpoint") {
                self.advance();
                init.llm_endpoint = Some(self.expect_string()?);
            } else if self.ident_is("token") {
                self.advance();
                init.llm_token = Some(self.expect_string()?);
            } else {
                break;
            }
        }
        Ok(())
    }

    /// `furniture:` followed by `name at <placement>` entries. The section
    /// ends at the first identifier not followed by `at`.
    fn parse_furniture(&mut self) -> Result<Vec<FurnitureItem>, SyntaxError> {
        self.expect(TokenKind::Furniture)?;
        self.expect(TokenKind::Colon)?;

        let mut furniture = Vec::new();
        while self.at(TokenKind::Identifier) {
            if self.peek(1).kind != TokenKind::At {
                break;
            }
            let name = self.expect_identifier()?;
            self.expect(TokenKind::At)?;
            let placement = self.parse_placement()?;
            furniture.push(FurnitureItem { name, placement });
        }
        Ok(furniture)
    }

    /// `user:` property list. The name defaults to "player" when omitted.
    fn parse_user(&mut self) -> Result<UserDecl, SyntaxError> {
        self.expect(TokenKind::User)?;
        self.expect(TokenKind::Colon)?;

        let mut unique_name = None;
        let mut context = None;
        let mut position = None;

        loop {
            match self.current().kind {
                TokenKind::Comma => self.advance(),
                TokenKind::Identifier if self.ident_is("unique_name") => {
                    self.advance();
                    self.expect(TokenKind::Equals)?;
                    unique_name = Some(self.expect_string()?);
                }
                TokenKind::Identifier if self.ident_is("context") => {
                    self.advance();
                    context = Some(self.expect_string()?);
                }
                TokenKind::At => {
                    self.advance();
                    position = Some(self.parse_coordinate()?);
                }
                _ => break,
            }
        }

        Ok(UserDecl {
            unique_name: unique_name.unwrap_or_else(|| "player".to_string()),
            context,
            position,
        })
    }
}
