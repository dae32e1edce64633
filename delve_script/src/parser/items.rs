//! Mythic and item declarations.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{ItemDecl, MythicItem};

impl Parser {
    /// `mytics:` (the DSL spelling) followed by `mythic-static:` blocks.
    pub(super) fn parse_mythics(&mut self) -> Result<Vec<MythicItem>, SyntaxError> {
        self.expect(TokenKind::Mythics)?;
        self.expect(TokenKind::Colon)?;

        let mut mythics = Vec::new();
        while self.at(TokenKind::Identifier) {
            self.expect(TokenKind::Identifier)?; // 'mythic-static'
            self.expect(TokenKind::Colon)?;

            let mut unique_name = None;
            let mut placement = None;
            let mut can_pickup = false;
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
                    TokenKind::Can => {
                        self.parse_pickup_phrase()?;
                        can_pickup = true;
                    }
                    TokenKind::Catch => {
                        self.advance();
                        catch_message = Some(self.expect_string()?);
                    }
                    _ => break,
                }
            }

            // A block without a unique_name declares nothing.
            if let Some(unique_name) = unique_name {
                mythics.push(MythicItem {
                    unique_name,
                    placement,
                    can_pickup,
                    catch_message,
                });
            }
        }
        Ok(mythics)
    }

    /// `items:` followed by `<item-type>:` blocks, e.g. `item-heal:`.
    pub(super) fn parse_items(&mut self) -> Result<Vec<ItemDecl>, SyntaxError> {
        self.expect(TokenKind::Items)?;
        self.expect(TokenKind::Colon)?;

        let mut items = Vec::new();
        while self.at(TokenKind::Identifier) {
            let item_type = self.expect_identifier()?;
            self.expect(TokenKind::Colon)?;

            let mut unique_name = None;
            let mut placement = None;
            let mut can_pickup = false;
            let mut effect = None;
            let mut damage = None;
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
                    TokenKind::Can => {
                        // Either "can be picked up by the user" or
                        // "can be used to <phrase-or-string>".
                        self.advance();
                        self.expect(TokenKind::Be)?;
                        if self.at(TokenKind::Use) {
                            self.advance();
                            self.expect(TokenKind::To)?;
                            effect = Some(self.parse_effect_phrase()?);
                        } else {
                            self.expect(TokenKind::Picked)?;
                            self.expect(TokenKind::Up)?;
                            self.expect(TokenKind::By)?;
                            self.expect(TokenKind::The)?;
                            self.expect_user_word()?;
                            can_pickup = true;
                        }
                    }
                    TokenKind::Damage => {
                        self.advance();
                        damage = Some(self.expect_int()?);
                    }
                    TokenKind::Catch => {
                        self.advance();
                        catch_message = Some(self.expect_string()?);
                    }
                    _ => break,
                }
            }

            if let Some(unique_name) = unique_name {
                items.push(ItemDecl {
                    item_type,
                    unique_name,
                    placement,
                    can_pickup,
                    effect,
                    damage,
                    catch_message,
                });
            }
        }
        Ok(items)
    }

    /// The tail of "can be picked up by the user", shared by mythics.
    pub(super) fn parse_pickup_phrase(&mut self) -> Result<(), SyntaxError> {
        self.expect(TokenKind::Can)?;
        self.expect(TokenKind::Be)?;
        self.expect(TokenKind::Picked)?;
        self.expect(TokenKind::Up)?;
        self.expect(TokenKind::By)?;
        self.expect(TokenKind::The)?;
        self.expect_user_word()
    }

    /// The word `user` at the end of a pickup phrase; `user` normally lexes
    /// as a keyword but a plain identifier is accepted too.
    fn expect_user_word(&mut self) -> Result<(), SyntaxError> {
        if self.at(TokenKind::User) {
            self.advance();
        } else {
            self.expect(TokenKind::Identifier)?;
        }
        Ok(())
    }

    /// Effect description after "can be used to": a quoted string, or a
    /// bare identifier run joined with spaces. The run stops before any
    /// identifier that opens a new declaration or property.
    fn parse_effect_phrase(&mut self) -> Result<String, SyntaxError> {
        if self.at(TokenKind::Str) {
            return self.expect_string();
        }
        let mut parts = Vec::new();
        while self.at(TokenKind::Identifier)
            && !self.ident_is("unique_name")
            && self.peek(1).kind != TokenKind::Colon
        {
            parts.push(self.current().text());
            self.advance();
        }
        Ok(parts.join(" "))
    }
}
