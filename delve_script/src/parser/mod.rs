//! Recursive-descent parser for the Delve DSL.
//!
//! The grammar is whitespace-insensitive above the lexical level and
//! deliberately English-like: entity declarations use order-free,
//! comma-optional property lists, and several properties are phrases
//! ("can be picked up by the user") rather than `key = value` pairs.
//!
//! A single token of lookahead suffices everywhere except named-quest
//! detection, which peeks one further to spot `name :` ahead of `if`.
//! There is no error recovery: the first unexpected token aborts the parse.

use crate::lexer::{SyntaxError, Token, TokenKind, TokenValue};
use crate::{Num, Placement, Program, Value, VariableDecl};

mod endgame;
mod init;
mod items;
mod monsters;
mod npcs;
mod rules;

/// Parse a full token stream into a [`Program`].
///
/// # Errors
/// Returns [`SyntaxError`] on the first unexpected token.
pub fn parse_program(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    Parser::new(tokens).parse()
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token stream must be Eof-terminated"
        );
        Self { tokens, pos: 0 }
    }

    pub(super) fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens.last().expect("non-empty token stream")
        })
    }

    /// Lookahead without consuming; `peek(0)` is the current token.
    pub(super) fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or_else(|| {
            self.tokens.last().expect("non-empty token stream")
        })
    }

    pub(super) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// True when the current token is an identifier with exactly this text.
    pub(super) fn ident_is(&self, text: &str) -> bool {
        self.current().kind == TokenKind::Identifier && self.current().value.as_str() == Some(text)
    }

    pub(super) fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let tok = self.current();
        SyntaxError::new(message, tok.line, tok.column)
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let tok = self.current();
        if tok.kind != kind {
            return Err(SyntaxError::new(
                format!("expected {kind}, got {}", tok.kind),
                tok.line,
                tok.column,
            ));
        }
        let tok = tok.clone();
        self.advance();
        Ok(tok)
    }

    /// Expect an identifier and return its text.
    pub(super) fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        let tok = self.expect(TokenKind::Identifier)?;
        Ok(tok.value.as_str().unwrap_or_default().to_string())
    }

    /// Expect a string literal and return its decoded value.
    pub(super) fn expect_string(&mut self) -> Result<String, SyntaxError> {
        let tok = self.expect(TokenKind::Str)?;
        Ok(tok.value.as_str().unwrap_or_default().to_string())
    }

    /// Expect a number and return it with the integer/float distinction.
    pub(super) fn expect_number(&mut self) -> Result<Num, SyntaxError> {
        let tok = self.expect(TokenKind::Number)?;
        tok.value
            .as_num()
            .ok_or_else(|| SyntaxError::new("number token without numeric value", tok.line, tok.column))
    }

    /// Expect a number read as an integer; fractional literals truncate.
    pub(super) fn expect_int(&mut self) -> Result<i64, SyntaxError> {
        Ok(self.expect_number()?.as_i64())
    }

    fn parse(mut self) -> Result<Program, SyntaxError> {
        let mut program = Program::default();
        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Let => program.variables.push(self.parse_variable()?),
                TokenKind::Init => program.init = Some(self.parse_init_section()?),
                TokenKind::Rules => program.rules = Some(self.parse_rules_section()?),
                TokenKind::Quests => program.quests = Some(self.parse_quests_section()?),
                TokenKind::EndGame => program.end_game = Some(self.parse_end_game_section()?),
                TokenKind::OnGameStart => {
                    program.on_game_start = Some(self.parse_on_game_start_section()?);
                }
                other => {
                    return Err(self.error_here(format!("unexpected token {other}")));
                }
            }
        }
        Ok(program)
    }

    fn parse_variable(&mut self) -> Result<VariableDecl, SyntaxError> {
        self.expect(TokenKind::Let)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_value()?;
        Ok(VariableDecl { name, value })
    }

    /// A scalar literal: number, string, boolean, or bare identifier.
    pub(super) fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let tok = self.current().clone();
        let value = match (&tok.kind, &tok.value) {
            (TokenKind::Number, TokenValue::Int(n)) => Value::Int(*n),
            (TokenKind::Number, TokenValue::Float(f)) => Value::Float(*f),
            (TokenKind::Str, TokenValue::Str(s)) => Value::Str(s.clone()),
            (TokenKind::Bool, TokenValue::Bool(b)) => Value::Bool(*b),
            (TokenKind::Identifier, TokenValue::Str(s)) => Value::Str(s.clone()),
            _ => return Err(self.error_here(format!("unexpected value {}", tok.kind))),
        };
        self.advance();
        Ok(value)
    }

    /// `all`, `random ( P% )`, `(x, y)`, or `(x, y) to (x2, y2)`.
    pub(super) fn parse_placement(&mut self) -> Result<Placement, SyntaxError> {
        match self.current().kind {
            TokenKind::All => {
                self.advance();
                Ok(Placement::All)
            }
            TokenKind::Random => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let tok = self.expect(TokenKind::Percentage)?;
                let percentage = tok
                    .value
                    .as_num()
                    .ok_or_else(|| SyntaxError::new("percentage without value", tok.line, tok.column))?;
                self.expect(TokenKind::RParen)?;
                Ok(Placement::Random(percentage))
            }
            TokenKind::LParen => {
                let from = self.parse_coordinate()?;
                if self.at(TokenKind::To) {
                    self.advance();
                    let to = self.parse_coordinate()?;
                    Ok(Placement::Range { from, to })
                } else {
                    Ok(Placement::Coordinate(from.0, from.1))
                }
            }
            _ => Err(self.error_here("expected a placement")),
        }
    }

    /// `( x , y )`
    pub(super) fn parse_coordinate(&mut self) -> Result<(i64, i64), SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let x = self.expect_int()?;
        self.expect(TokenKind::Comma)?;
        let y = self.expect_int()?;
        self.expect(TokenKind::RParen)?;
        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(src: &str) -> Program {
        parse_program(tokenize(src).unwrap()).expect("parse ok")
    }

    #[test]
    fn variables_parse_in_order() {
        let program = parse("let speed = 3\nlet hero_name = \"Ada\"\nlet brave = true");
        assert_eq!(program.variables.len(), 3);
        assert_eq!(program.variables[0].name, "speed");
        assert_eq!(program.variables[0].value, Value::Int(3));
        assert_eq!(program.variables[1].value, Value::Str("Ada".into()));
        assert_eq!(program.variables[2].value, Value::Bool(true));
    }

    #[test]
    fn unexpected_top_level_token_fails() {
        let err = parse_program(tokenize("world: grid").unwrap()).unwrap_err();
        assert!(err.message.contains("unexpected token"));
    }

    #[test]
    fn minimal_program_parses() {
        let program = parse("init:\n  world: 3 x 5 grid\n  user: unique_name=\"p\" at (1,1)");
        let init = program.init.expect("init section");
        let world = init.world.expect("world");
        assert_eq!((world.width, world.height), (3, 5));
        let user = init.user.expect("user");
        assert_eq!(user.unique_name, "p");
        assert_eq!(user.position, Some((1, 1)));
    }

    #[test]
    fn world_without_dimensions_defaults() {
        let program = parse("init: world: grid");
        let world = program.init.unwrap().world.unwrap();
        assert_eq!((world.width, world.height), (100, 100));
    }

    #[test]
    fn placement_forms() {
        let program = parse(
            "init:\n\
             furniture:\n\
             grass at all\n\
             wall at (0,0) to (0,9)\n\
             stone at (5,5)",
        );
        let furniture = program.init.unwrap().furniture;
        assert_eq!(furniture.len(), 3);
        assert_eq!(furniture[0].placement, Placement::All);
        assert_eq!(
            furniture[1].placement,
            Placement::Range { from: (0, 0), to: (0, 9) }
        );
        assert_eq!(furniture[2].placement, Placement::Coordinate(5, 5));
    }

    #[test]
    fn fractional_coordinates_truncate() {
        let program = parse("init: user: unique_name=\"p\" at (2.9, 3)");
        assert_eq!(program.init.unwrap().user.unwrap().position, Some((2, 3)));
    }
}
