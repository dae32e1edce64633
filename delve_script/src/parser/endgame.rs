//! `end_game:` clauses and the `on_game_start:` splash section.

use super::Parser;
use crate::lexer::{SyntaxError, TokenKind};
use crate::{EndCondition, EndGameSection, EndResult, OnGameStartSection};

impl Parser {
    /// `if <cond> (and <cond>)* then win the game | die and lose the game`
    /// clauses plus optional `win_the_game:` / `lose_the_game:` messages.
    ///
    /// `and`-joined conditions are flattened into separate entries sharing
    /// the clause's result tag; the runtime re-groups them by result.
    pub(super) fn parse_end_game_section(&mut self) -> Result<EndGameSection, SyntaxError> {
        self.expect(TokenKind::EndGame)?;
        self.expect(TokenKind::Colon)?;

        let mut section = EndGameSection::default();
        loop {
            match self.current().kind {
                TokenKind::If => {
                    self.advance();
                    let mut conditions = vec![self.parse_condition()?];
                    while self.at(TokenKind::And) {
                        self.advance();
                        conditions.push(self.parse_condition()?);
                    }

                    let mut result = None;
                    if self.at(TokenKind::Then) {
                        self.advance();
                        if self.at(TokenKind::Win) {
                            self.advance();
                            self.expect(TokenKind::The)?;
                            self.expect(TokenKind::Identifier)?; // 'game'
                            result = Some(EndResult::Win);
                        } else if self.at(TokenKind::Die) {
                            self.advance();
                            self.expect(TokenKind::And)?;
                            self.expect(TokenKind::Lose)?;
                            self.expect(TokenKind::The)?;
                            self.expect(TokenKind::Identifier)?; // 'game'
                            result = Some(EndResult::Lose);
                        }
                    }

                    for condition in conditions {
                        section.conditions.push(EndCondition { condition, result });
                    }
                }
                TokenKind::Identifier if self.ident_is("win_the_game") => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    self.expect(TokenKind::Show)?;
                    section.win_message = Some(self.expect_string()?);
                }
                TokenKind::Identifier if self.ident_is("lose_the_game") => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    self.expect(TokenKind::Show)?;
                    section.lose_message = Some(self.expect_string()?);
                }
                _ => break,
            }
        }
        Ok(section)
    }

    /// Repeated `display_title:`, `display_text:`, and `display_link:`
    /// entries. A title may be a quoted string or a free-form token run
    /// ending at the next `display_*` word or EOF.
    pub(super) fn parse_on_game_start_section(&mut self) -> Result<OnGameStartSection, SyntaxError> {
        self.expect(TokenKind::OnGameStart)?;
        self.expect(TokenKind::Colon)?;

        let mut section = OnGameStartSection::default();
        loop {
            match self.current().kind {
                TokenKind::Identifier if self.ident_is("display_title") => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    if self.at(TokenKind::Str) {
                        section.title = Some(self.expect_string()?);
                    } else {
                        let mut parts = Vec::new();
                        while !self.at(TokenKind::Eof) && !self.at_display_word() {
                            parts.push(self.current().text());
                            self.advance();
                        }
                        let title = parts.join(" ").trim().to_string();
                        section.title = (!title.is_empty()).then_some(title);
                    }
                }
                TokenKind::Identifier if self.ident_is("display_text") => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    section.text_lines.push(self.expect_string()?);
                }
                TokenKind::Identifier if self.ident_is("display_link") => {
                    self.advance();
                    self.expect(TokenKind::Colon)?;
                    let anchor = self.expect_string()?;
                    self.expect(TokenKind::Comma)?;
                    let url = self.expect_string()?;
                    section.links.push((anchor, url));
                }
                _ => break,
            }
        }
        Ok(section)
    }

    fn at_display_word(&self) -> bool {
        self.current().kind == TokenKind::Identifier
            && self
                .current()
                .value
                .as_str()
                .is_some_and(|s| s.starts_with("display_"))
    }
}
