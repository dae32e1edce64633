//! Hand-written lexer for the Delve DSL.
//!
//! The surface language is English-like, so the keyword vocabulary overlaps
//! heavily with ordinary identifier-shaped words. Disambiguation rules:
//!
//! - Keyword lookup is case-insensitive; identifiers preserve case.
//! - Hyphens are identifier characters: `monster-static` is one token.
//! - `level` followed by exactly ` up` folds into the single `level up`
//!   keyword; the lookahead is non-destructive when the match fails.
//! - A number immediately followed by `%` is reclassified as a percentage
//!   and the `%` is consumed.
//!
//! Newlines are insignificant and consumed silently; `#` starts a line
//! comment. Every token records the 1-based line and column of its first
//! character.

use std::fmt;

use thiserror::Error;

use crate::Num;

/// Lexical or syntactic failure, pointing at the offending source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Token discriminant. Keywords form a closed set; everything the keyword
/// map does not know is an `Identifier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Section and declaration keywords
    Init,
    Rules,
    Quests,
    EndGame,
    OnGameStart,
    World,
    Furniture,
    /// Spelled `mytics` in the DSL; the misspelling is part of the language
    /// surface.
    Mythics,
    Items,
    Monsters,
    User,
    Npc,
    Let,
    // Phrase and clause keywords
    Catch,
    If,
    Then,
    And,
    At,
    Is,
    Has,
    Show,
    Win,
    Lose,
    Die,
    /// The folded multi-word form `level up`, also reachable as bare
    /// `level`.
    LevelUp,
    Move,
    Talk,
    Attack,
    Use,
    Set,
    Touch,
    Place,
    CheckInventory,
    Towards,
    With,
    Can,
    Be,
    Picked,
    Up,
    By,
    The,
    Gives,
    Experience,
    Health,
    Damage,
    Killable,
    Hit,
    Random,
    All,
    To,
    Of,
    // Literals and names
    Identifier,
    Str,
    Number,
    Bool,
    Percentage,
    // Punctuation
    Equals,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    // Comparison operators
    Gt,
    Lt,
    Ge,
    Le,
    EqEq,
    Ne,
    // Terminal
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Init => "'init'",
            TokenKind::Rules => "'rules'",
            TokenKind::Quests => "'quests'",
            TokenKind::EndGame => "'end_game'",
            TokenKind::OnGameStart => "'on_game_start'",
            TokenKind::World => "'world'",
            TokenKind::Furniture => "'furniture'",
            TokenKind::Mythics => "'mytics'",
            TokenKind::Items => "'items'",
            TokenKind::Monsters => "'monsters'",
            TokenKind::User => "'user'",
            TokenKind::Npc => "'NPC'",
            TokenKind::Let => "'let'",
            TokenKind::Catch => "'catch'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::And => "'and'",
            TokenKind::At => "'at'",
            TokenKind::Is => "'is'",
            TokenKind::Has => "'has'",
            TokenKind::Show => "'show'",
            TokenKind::Win => "'win'",
            TokenKind::Lose => "'lose'",
            TokenKind::Die => "'die'",
            TokenKind::LevelUp => "'level up'",
            TokenKind::Move => "'move'",
            TokenKind::Talk => "'talk'",
            TokenKind::Attack => "'attack'",
            TokenKind::Use => "'use'",
            TokenKind::Set => "'set'",
            TokenKind::Touch => "'touch'",
            TokenKind::Place => "'place'",
            TokenKind::CheckInventory => "'check_inventory'",
            TokenKind::Towards => "'towards'",
            TokenKind::With => "'with'",
            TokenKind::Can => "'can'",
            TokenKind::Be => "'be'",
            TokenKind::Picked => "'picked'",
            TokenKind::Up => "'up'",
            TokenKind::By => "'by'",
            TokenKind::The => "'the'",
            TokenKind::Gives => "'gives'",
            TokenKind::Experience => "'experience'",
            TokenKind::Health => "'health'",
            TokenKind::Damage => "'damage'",
            TokenKind::Killable => "'killable'",
            TokenKind::Hit => "'hit'",
            TokenKind::Random => "'random'",
            TokenKind::All => "'all'",
            TokenKind::To => "'to'",
            TokenKind::Of => "'of'",
            TokenKind::Identifier => "identifier",
            TokenKind::Str => "string",
            TokenKind::Number => "number",
            TokenKind::Bool => "boolean",
            TokenKind::Percentage => "percentage",
            TokenKind::Equals => "'='",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::Ge => "'>='",
            TokenKind::Le => "'<='",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Eof => "end of input",
        };
        f.write_str(name)
    }
}

/// Payload carried by a token. Keywords and identifiers keep their original
/// lexeme (case preserved) so free-form text runs can be rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TokenValue {
    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<Num> {
        match self {
            TokenValue::Int(n) => Some(Num::Int(*n)),
            TokenValue::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: u32,
    pub column: u32,
}

impl Token {
    /// Human-readable rendering of the lexeme, used when joining free-form
    /// token runs (unquoted splash titles).
    pub fn text(&self) -> String {
        match &self.value {
            TokenValue::Str(s) => s.clone(),
            TokenValue::Int(n) => n.to_string(),
            TokenValue::Float(f) => f.to_string(),
            TokenValue::Bool(b) => b.to_string(),
            TokenValue::None => String::new(),
        }
    }
}

/// Multi-word keywords: `(prefix identifier, raw suffix)` pairs checked
/// after identifier scanning.
const MULTI_WORD_KEYWORDS: &[(&str, &str, TokenKind)] = &[("level", " up", TokenKind::LevelUp)];

/// Case-insensitive keyword lookup; the caller passes a lowercased lexeme.
fn keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "init" => TokenKind::Init,
        "rules" => TokenKind::Rules,
        "quests" => TokenKind::Quests,
        "end_game" => TokenKind::EndGame,
        "on_game_start" => TokenKind::OnGameStart,
        "world" => TokenKind::World,
        "furniture" => TokenKind::Furniture,
        "mytics" => TokenKind::Mythics,
        "items" => TokenKind::Items,
        "monsters" => TokenKind::Monsters,
        "user" => TokenKind::User,
        "npc" => TokenKind::Npc,
        "let" => TokenKind::Let,
        "catch" => TokenKind::Catch,
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "and" => TokenKind::And,
        "at" => TokenKind::At,
        "is" => TokenKind::Is,
        "has" => TokenKind::Has,
        "show" => TokenKind::Show,
        "win" => TokenKind::Win,
        "lose" => TokenKind::Lose,
        "die" => TokenKind::Die,
        "level" | "level up" => TokenKind::LevelUp,
        "move" => TokenKind::Move,
        "talk" => TokenKind::Talk,
        "attack" => TokenKind::Attack,
        "use" => TokenKind::Use,
        "set" => TokenKind::Set,
        "touch" => TokenKind::Touch,
        "place" => TokenKind::Place,
        "check_inventory" => TokenKind::CheckInventory,
        "towards" => TokenKind::Towards,
        "with" => TokenKind::With,
        "can" => TokenKind::Can,
        "be" => TokenKind::Be,
        "picked" => TokenKind::Picked,
        "up" => TokenKind::Up,
        "by" => TokenKind::By,
        "the" => TokenKind::The,
        "gives" => TokenKind::Gives,
        "experience" => TokenKind::Experience,
        "health" => TokenKind::Health,
        "damage" => TokenKind::Damage,
        "killable" => TokenKind::Killable,
        "hit" => TokenKind::Hit,
        "random" => TokenKind::Random,
        "all" => TokenKind::All,
        "to" => TokenKind::To,
        "of" => TokenKind::Of,
        _ => return None,
    };
    Some(kind)
}

/// Tokenize DSL source into a vector terminated by a single `Eof` token.
///
/// # Errors
/// Returns [`SyntaxError`] on any unrecognised character or a bare `!`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if self.current() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn push(&mut self, kind: TokenKind, value: TokenValue, line: u32, column: u32) {
        self.tokens.push(Token { kind, value, line, column });
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        while self.current().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    /// Read a quoted string. The closing quote must match the opening one;
    /// an unterminated string consumes to EOF and yields what accumulated.
    fn read_string(&mut self) -> String {
        let quote = self.current().expect("opening quote");
        self.advance();
        let mut value = String::new();
        while let Some(c) = self.current() {
            if c == quote {
                break;
            }
            if c == '\\' {
                self.advance();
                match self.current() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some('"') => value.push('"'),
                    Some(other) => value.push(other),
                    None => break,
                }
                self.advance();
            } else {
                value.push(c);
                self.advance();
            }
        }
        if self.current() == Some(quote) {
            self.advance();
        }
        value
    }

    /// Read a digit run with at most one `.`; a second `.` terminates the
    /// number and is left for the main loop.
    fn read_number(&mut self) -> Num {
        let mut text = String::new();
        let mut is_float = false;
        while let Some(c) = self.current() {
            if c == '.' {
                if is_float {
                    break;
                }
                is_float = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }
        if is_float {
            Num::Float(text.parse().unwrap_or(0.0))
        } else {
            Num::Int(text.parse().unwrap_or(0))
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Try to extend `ident` with a multi-word keyword suffix. The source
    /// characters after the identifier must match the suffix exactly;
    /// otherwise nothing is consumed.
    fn fold_multi_word(&mut self, ident: &mut String) -> Option<TokenKind> {
        for (prefix, suffix, kind) in MULTI_WORD_KEYWORDS {
            if !ident.eq_ignore_ascii_case(prefix) {
                continue;
            }
            let end = self.pos + suffix.chars().count();
            if end > self.chars.len() {
                continue;
            }
            if self.chars[self.pos..end].iter().copied().eq(suffix.chars()) {
                for _ in 0..suffix.chars().count() {
                    self.advance();
                }
                ident.push_str(suffix);
                return Some(*kind);
            }
        }
        None
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        while self.pos < self.chars.len() {
            self.skip_whitespace();

            let Some(c) = self.current() else { break };
            let line = self.line;
            let column = self.column;

            match c {
                '#' => {
                    self.skip_comment();
                }
                '\n' => {
                    self.advance();
                }
                '"' | '\'' => {
                    let value = self.read_string();
                    self.push(TokenKind::Str, TokenValue::Str(value), line, column);
                }
                '0'..='9' => {
                    let num = self.read_number();
                    let value = match num {
                        Num::Int(n) => TokenValue::Int(n),
                        Num::Float(f) => TokenValue::Float(f),
                    };
                    if self.current() == Some('%') {
                        self.advance();
                        self.push(TokenKind::Percentage, value, line, column);
                    } else {
                        self.push(TokenKind::Number, value, line, column);
                    }
                }
                '=' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.advance();
                        self.push(TokenKind::EqEq, TokenValue::Str("==".into()), line, column);
                    } else {
                        self.advance();
                        self.push(TokenKind::Equals, TokenValue::Str("=".into()), line, column);
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.advance();
                        self.push(TokenKind::Ge, TokenValue::Str(">=".into()), line, column);
                    } else {
                        self.advance();
                        self.push(TokenKind::Gt, TokenValue::Str(">".into()), line, column);
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.advance();
                        self.push(TokenKind::Le, TokenValue::Str("<=".into()), line, column);
                    } else {
                        self.advance();
                        self.push(TokenKind::Lt, TokenValue::Str("<".into()), line, column);
                    }
                }
                '!' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.advance();
                        self.push(TokenKind::Ne, TokenValue::Str("!=".into()), line, column);
                    } else {
                        return Err(SyntaxError::new("unexpected character '!'", line, column));
                    }
                }
                ',' => {
                    self.advance();
                    self.push(TokenKind::Comma, TokenValue::Str(",".into()), line, column);
                }
                ':' => {
                    self.advance();
                    self.push(TokenKind::Colon, TokenValue::Str(":".into()), line, column);
                }
                ';' => {
                    self.advance();
                    self.push(TokenKind::Semicolon, TokenValue::Str(";".into()), line, column);
                }
                '(' => {
                    self.advance();
                    self.push(TokenKind::LParen, TokenValue::Str("(".into()), line, column);
                }
                ')' => {
                    self.advance();
                    self.push(TokenKind::RParen, TokenValue::Str(")".into()), line, column);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut ident = self.read_identifier();
                    let folded = self.fold_multi_word(&mut ident);
                    let kind = folded.or_else(|| keyword(&ident.to_lowercase()));
                    match kind {
                        Some(kind) => {
                            self.push(kind, TokenValue::Str(ident), line, column);
                        }
                        None if ident.eq_ignore_ascii_case("true") => {
                            self.push(TokenKind::Bool, TokenValue::Bool(true), line, column);
                        }
                        None if ident.eq_ignore_ascii_case("false") => {
                            self.push(TokenKind::Bool, TokenValue::Bool(false), line, column);
                        }
                        None => {
                            self.push(TokenKind::Identifier, TokenValue::Str(ident), line, column);
                        }
                    }
                }
                other => {
                    return Err(SyntaxError::new(
                        format!("unexpected character '{other}'"),
                        line,
                        column,
                    ));
                }
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            value: TokenValue::None,
            line: self.line,
            column: self.column,
        });
        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_with_single_eof() {
        let tokens = tokenize("init: world: grid").unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1);
        assert_eq!(tokenize("").unwrap().len(), 1);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let tokens = tokenize("init:\n  world: grid\n").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // init
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5)); // :
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3)); // world
        assert_eq!((tokens[3].line, tokens[3].column), (2, 8)); // :
        assert_eq!((tokens[4].line, tokens[4].column), (2, 10)); // grid
    }

    #[test]
    fn two_char_operators_lex_as_single_tokens() {
        assert_eq!(
            kinds(">= <= == != > < ="),
            vec![
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Gt,
                TokenKind::Lt,
                TokenKind::Equals,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_bang_is_a_lexical_error() {
        let err = tokenize("health ! 5").unwrap_err();
        assert!(err.message.contains('!'));
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn percentage_tiebreak_consumes_the_sign() {
        let tokens = tokenize("random ( 40% )").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Percentage);
        assert_eq!(tokens[2].value, TokenValue::Int(40));
        assert_eq!(tokens[3].kind, TokenKind::RParen);
    }

    #[test]
    fn numbers_keep_the_integer_float_distinction() {
        let tokens = tokenize("10 2.5").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Int(10));
        assert_eq!(tokens[1].value, TokenValue::Float(2.5));
    }

    #[test]
    fn hyphenated_identifiers_are_single_tokens() {
        let tokens = tokenize("monster-static npc-state-machine").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].value.as_str(), Some("monster-static"));
        assert_eq!(tokens[1].value.as_str(), Some("npc-state-machine"));
    }

    #[test]
    fn level_up_folds_into_one_keyword() {
        let tokens = tokenize("then level up").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::LevelUp);
        assert_eq!(tokens[1].value.as_str(), Some("level up"));
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn level_lookahead_is_non_destructive() {
        // `level` followed by something other than ` up` stays a keyword on
        // its own and the next token is unaffected.
        let tokens = tokenize("level 3").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LevelUp);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].value, TokenValue::Int(3));
    }

    #[test]
    fn keywords_are_case_insensitive_but_identifiers_keep_case() {
        let tokens = tokenize("INIT Wizard").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Init);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value.as_str(), Some("Wizard"));
    }

    #[test]
    fn booleans_lex_case_insensitively() {
        let tokens = tokenize("true FALSE").unwrap();
        assert_eq!(tokens[0].value, TokenValue::Bool(true));
        assert_eq!(tokens[1].value, TokenValue::Bool(false));
    }

    #[test]
    fn string_escapes_decode() {
        // Unknown escapes decode to the escaped character itself.
        let tokens = tokenize(r#""a\nb\tc\\d\"e\qf""#).unwrap();
        assert_eq!(tokens[0].value.as_str(), Some("a\nb\tc\\d\"eqf"));
    }

    #[test]
    fn single_quoted_strings_close_on_single_quote() {
        let tokens = tokenize("'hello \"there\"'").unwrap();
        assert_eq!(tokens[0].value.as_str(), Some("hello \"there\""));
    }

    #[test]
    fn unterminated_string_consumes_to_eof() {
        let tokens = tokenize("\"never closed").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value.as_str(), Some("never closed"));
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let tokens = tokenize("init: # the whole section\nworld:").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Init, TokenKind::Colon, TokenKind::World, TokenKind::Colon, TokenKind::Eof]
        );
    }

    #[test]
    fn mytics_spelling_is_the_keyword() {
        assert_eq!(kinds("mytics:")[0], TokenKind::Mythics);
        // The corrected spelling is just an identifier.
        assert_eq!(kinds("mythics:")[0], TokenKind::Identifier);
    }
}
