//! src/core/lexer.rs
//!
//! Lexical analyzer for Meraki configuration text
//!
//! Converts already comment-stripped source text into a finite token
//! sequence. Recognition is priority ordered: whitespace, newline,
//! operators, delimiters, strings, numbers, identifiers, then free text.
//! `+` and `-` only become operator tokens when they are not glued to
//! word characters, which keeps command arguments like `-a` or `-9`
//! intact as text.
//!
//! The canonical pipeline strips comments before lexing (see
//! `core::comments`), so `#` never reaches the parser; the lexer still
//! consumes `#` to end of line so it stays total over raw input.

use std::fmt;
use thiserror::Error;

/// Maximum allowed identifier length in characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 50;

/// Token classification for Meraki source text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TokenKind {
    /// Modifier aliases and key names: `[a-z][a-z0-9_]*`
    Identifier,
    /// Unsigned integer, e.g. a timeout value
    Number,
    /// Quoted text; the token carries the unquoted content
    String,
    /// Free text run (command words, paths, flags like `-a`)
    Text,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `:`
    Colon,
    /// `~`
    Tilde,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `\n` (statement terminator)
    Newline,
    /// End of the token stream; always the final token
    EndOfInput,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Text => "text",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Colon => "':'",
            TokenKind::Tilde => "'~'",
            TokenKind::Semicolon => "';'",
            TokenKind::Equals => "'='",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Newline => "newline",
            TokenKind::EndOfInput => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// A single token with its source position.
///
/// Lines and columns are 1-based. String tokens store their content
/// without the surrounding quotes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' at line {}, column {}",
            self.kind, self.text, self.line, self.column
        )
    }
}

/// Errors raised during tokenization. Each carries the 1-based source
/// position where tokenization halted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexicalError {
    #[error("Invalid character '{ch}' at line {line}, column {column}")]
    InvalidCharacter { ch: char, line: usize, column: usize },

    #[error("Unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("Identifier too long (max {MAX_IDENTIFIER_LENGTH} chars) at line {line}, column {column}")]
    IdentifierTooLong { line: usize, column: usize },
}

impl LexicalError {
    /// Line where tokenization halted.
    pub fn line(&self) -> usize {
        match self {
            LexicalError::InvalidCharacter { line, .. }
            | LexicalError::UnterminatedString { line, .. }
            | LexicalError::IdentifierTooLong { line, .. } => *line,
        }
    }

    /// Column where tokenization halted.
    pub fn column(&self) -> usize {
        match self {
            LexicalError::InvalidCharacter { column, .. }
            | LexicalError::UnterminatedString { column, .. }
            | LexicalError::IdentifierTooLong { column, .. } => *column,
        }
    }
}

/// Lexical analyzer over one input. A fresh instance is created per
/// `tokenize` call, so identical text always yields identical tokens.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Tokenizes `text` into a finite sequence ending in `EndOfInput`.
    ///
    /// # Errors
    ///
    /// Returns a `LexicalError` on the first invalid character,
    /// unterminated string literal, or oversized identifier.
    pub fn tokenize(text: &str) -> Result<Vec<Token>, LexicalError> {
        let mut lexer = Lexer {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        };
        lexer.run()
    }

    fn run(&mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let (start_line, start_column) = (self.line, self.column);

            match ch {
                ' ' | '\t' => {
                    self.bump();
                }
                '#' => {
                    // Stripped upstream by the comment extractor; consume
                    // to end of line so raw text still lexes.
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '\n' => {
                    self.bump();
                    tokens.push(self.token(TokenKind::Newline, "\n", start_line, start_column));
                }
                '+' | '-' if self.at_operator_position() => {
                    self.bump();
                    let kind = if ch == '+' { TokenKind::Plus } else { TokenKind::Minus };
                    tokens.push(self.token(kind, &ch.to_string(), start_line, start_column));
                }
                ':' | '~' | ';' | '=' | '{' | '}' | '[' | ']' | ',' => {
                    self.bump();
                    let kind = match ch {
                        ':' => TokenKind::Colon,
                        '~' => TokenKind::Tilde,
                        ';' => TokenKind::Semicolon,
                        '=' => TokenKind::Equals,
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        _ => TokenKind::Comma,
                    };
                    tokens.push(self.token(kind, &ch.to_string(), start_line, start_column));
                }
                '"' => {
                    let content = self.scan_string(start_line, start_column)?;
                    tokens.push(self.token(TokenKind::String, &content, start_line, start_column));
                }
                '0'..='9' => {
                    let digits = self.take_while(|c| c.is_ascii_digit());
                    tokens.push(self.token(TokenKind::Number, &digits, start_line, start_column));
                }
                'a'..='z' => {
                    let word =
                        self.take_while(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
                    if word.chars().count() > MAX_IDENTIFIER_LENGTH {
                        return Err(LexicalError::IdentifierTooLong {
                            line: start_line,
                            column: start_column,
                        });
                    }
                    tokens.push(self.token(TokenKind::Identifier, &word, start_line, start_column));
                }
                '+' => {
                    // A '+' glued to word characters matches no rule.
                    return Err(LexicalError::InvalidCharacter {
                        ch,
                        line: start_line,
                        column: start_column,
                    });
                }
                c if c.is_whitespace() => {
                    // Whitespace other than space/tab/newline, e.g. '\r'.
                    return Err(LexicalError::InvalidCharacter {
                        ch: c,
                        line: start_line,
                        column: start_column,
                    });
                }
                _ => {
                    let text = self.take_while(|c| !c.is_whitespace() && !Self::is_special(c));
                    tokens.push(self.token(TokenKind::Text, &text, start_line, start_column));
                }
            }
        }

        tokens.push(Token {
            kind: TokenKind::EndOfInput,
            text: String::new(),
            line: self.line,
            column: self.column,
        });

        Ok(tokens)
    }

    /// Characters that terminate a free text run. `-` is deliberately
    /// absent so command flags like `-a` stay in one token.
    fn is_special(c: char) -> bool {
        matches!(
            c,
            '"' | '#' | '{' | '}' | '[' | ']' | '~' | ';' | ':' | '=' | '+' | ','
        )
    }

    /// Word characters for operator disambiguation. A `+` or `-` next to
    /// one of these is part of free text, not an operator.
    fn is_word(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-'
    }

    fn at_operator_position(&self) -> bool {
        let prev_ok = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.chars.get(i))
            .is_none_or(|c| !Self::is_word(*c));
        let next_ok = self.chars.get(self.pos + 1).is_none_or(|c| !Self::is_word(*c));
        prev_ok && next_ok
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<String, LexicalError> {
        self.bump(); // opening quote
        let mut content = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();
                    return Ok(content);
                }
                Some('\n') | None => {
                    return Err(LexicalError::UnterminatedString { line, column });
                }
                Some(c) => {
                    content.push(c);
                    self.bump();
                }
            }
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, accept: F) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !accept(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn token(&self, kind: TokenKind, text: &str, line: usize, column: usize) -> Token {
        Token {
            kind,
            text: text.to_string(),
            line,
            column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.chars.get(self.pos) {
            if *c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }
}
