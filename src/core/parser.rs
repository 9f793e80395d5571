// Copyright 2025 Meraki contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Recursive-descent parser for Meraki configuration files
//!
//! The parser consumes the token stream with single-token lookahead and
//! builds a `Document`. It handles:
//! - Modifier definitions (`mod1 = lcmd + lalt`)
//! - Direct, compound-modifier, and modifier-only keybindings
//! - Parallel group expansion (`{ c, f } : open -a { Chrome, Finder }`)
//! - Nested leader menus with optional `[Nms]` timeouts
//! - Command chains separated by `;`
//! - Reattachment of extracted comments by line number
//!
//! One failed expectation aborts the whole parse; no partial document is
//! ever returned. The statement loop consumes at least one token per
//! iteration or returns an error, so parsing terminates on any input.

use thiserror::Error;

use crate::core::comments::{self, Comment, CommentKind};
use crate::core::lexer::{Lexer, LexicalError, Token, TokenKind};
use crate::core::types::{
    Action, ActivationFlag, BindingBody, Document, KeyBinding, ModifierDefinition, NestedBlock,
    NestedEntry,
};

/// Timeout applied to leader menus that carry no explicit `[Nms]`.
pub const DEFAULT_NESTED_TIMEOUT_MS: i64 = 500;

/// Errors that abort a parse, with source position context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error(transparent)]
    Lexical(#[from] LexicalError),
}

/// Parses a complete Meraki configuration string.
///
/// Convenience wrapper over [`Parser`]; equivalent to
/// `Parser::new().parse(content)`.
pub fn parse_document(content: &str) -> Result<Document, ParseError> {
    Parser::new().parse(content)
}

/// Where a command chain is being parsed. Inside a nested block a `;`
/// may terminate the entry instead of separating chain segments.
#[derive(Clone, Copy, Eq, PartialEq)]
enum ChainContext {
    Statement,
    Nested,
}

/// Recursive-descent parser over one token stream.
///
/// Holds a cursor plus the pending-comments list during a single `parse`
/// call. Not meant to be shared across concurrent parses; create one per
/// document (`parse` resets all state on entry).
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    pending_comments: Vec<Comment>,
    notes: Vec<String>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current: 0,
            pending_comments: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Runs the full front-end pipeline: comment extraction, lexing, and
    /// parsing with group expansion and comment reattachment.
    ///
    /// # Errors
    ///
    /// Returns the first lexical or syntax error encountered; the
    /// pipeline never yields a partial document.
    pub fn parse(&mut self, content: &str) -> Result<Document, ParseError> {
        let (extracted, clean) = comments::extract(content);
        self.tokens = Lexer::tokenize(&clean)?;
        self.current = 0;
        self.notes = extracted
            .iter()
            .filter(|c| c.kind == CommentKind::Multiline)
            .map(|c| c.text.clone())
            .collect();
        self.pending_comments = extracted;

        let mut doc = Document::default();
        loop {
            while self.check(TokenKind::Newline) {
                self.advance();
            }
            if self.check(TokenKind::EndOfInput) {
                break;
            }
            self.parse_statement(&mut doc)?;
        }

        doc.comments = std::mem::take(&mut self.pending_comments);
        doc.notes = std::mem::take(&mut self.notes);
        Ok(doc)
    }

    /// Dispatches on the statement's leading identifier and the token
    /// after it: `=` (modifier definition), `-` (direct binding), `+`
    /// (compound modifiers), or `~` (modifier-only binding).
    fn parse_statement(&mut self, doc: &mut Document) -> Result<(), ParseError> {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Identifier {
            return Err(Self::syntax(
                format!("Unexpected token: {}", tok.kind),
                &tok,
            ));
        }
        self.advance();
        let name = tok.text;
        let line = tok.line;

        match self.peek().kind {
            TokenKind::Equals => {
                self.advance();
                let mut def = self.parse_modifier_definition(name, line)?;
                def.comments = self.claim_comments(line);
                doc.define_modifier(def);
            }
            TokenKind::Minus => {
                self.advance();
                let bindings = self.parse_keyed_binding(vec![name], line)?;
                self.attach_and_push(doc, bindings, line);
            }
            TokenKind::Plus => {
                self.advance();
                let (modifiers, trailing_group) = self.parse_compound_operands(name)?;
                let bindings = match (self.peek().kind, trailing_group) {
                    (TokenKind::Minus, trailing) => {
                        self.advance();
                        let mut modifiers = modifiers;
                        modifiers.extend(trailing.unwrap_or_default());
                        self.parse_keyed_binding(modifiers, line)?
                    }
                    (TokenKind::Tilde, trailing) => {
                        let mut modifiers = modifiers;
                        modifiers.extend(trailing.unwrap_or_default());
                        vec![self.parse_flag_binding(modifiers, line)?]
                    }
                    // `mod1 + { c, f } : …` — the trailing group is the
                    // target, zipped against a parallel action group.
                    (TokenKind::Colon | TokenKind::LBracket, Some(keys)) => {
                        self.parse_grouped_tail(modifiers, keys, line)?
                    }
                    _ => return Err(self.syntax_here("Expected '-' after modifiers")),
                };
                self.attach_and_push(doc, bindings, line);
            }
            TokenKind::Tilde => {
                let binding = self.parse_flag_binding(vec![name], line)?;
                self.attach_and_push(doc, vec![binding], line);
            }
            _ => {
                return Err(self.syntax_here("Expected '=', '-', '+', or '~' after identifier"));
            }
        }
        Ok(())
    }

    /// `NAME = KEY1 + KEY2`, exactly two plus-joined identifiers.
    fn parse_modifier_definition(
        &mut self,
        name: String,
        line: usize,
    ) -> Result<ModifierDefinition, ParseError> {
        let key1 = self.expect(
            TokenKind::Identifier,
            "Expected first key in modifier definition",
        )?;
        self.expect(TokenKind::Plus, "Expected '+' between keys")?;
        let key2 = self.expect(
            TokenKind::Identifier,
            "Expected second key in modifier definition",
        )?;
        self.expect_statement_end()?;

        Ok(ModifierDefinition {
            name,
            keys: vec![key1.text, key2.text],
            comments: Vec::new(),
            line_number: line,
        })
    }

    /// Collects `+`-separated modifier operands. A bracketed group here
    /// flattens: every member joins the modifier list of this single
    /// binding, it never multiplies bindings. The one exception is a
    /// group in final position with no `-` target after it; that group
    /// is returned separately so the caller can zip it as the target
    /// (`mod1 + { c, f } : …`).
    fn parse_compound_operands(
        &mut self,
        first: String,
    ) -> Result<(Vec<String>, Option<Vec<String>>), ParseError> {
        let mut modifiers = vec![first];
        let mut last_group: Option<Vec<String>> = None;
        loop {
            if let Some(group) = last_group.take() {
                // A further operand follows, so the group was a modifier
                // operand after all: flatten it.
                modifiers.extend(group);
            }
            match self.peek().kind {
                TokenKind::Identifier => modifiers.push(self.advance().text),
                TokenKind::LBrace => last_group = Some(self.parse_identifier_group()?),
                _ => return Err(self.syntax_here("Expected modifier or '{' after '+'")),
            }
            if self.check(TokenKind::Plus) {
                self.advance();
            } else {
                break;
            }
        }
        Ok((modifiers, last_group))
    }

    /// Parses the remainder of a binding after `-`: a key or key group,
    /// optional timeout, `:`, and the body. A key group expands into one
    /// binding per member, zipped index-wise with a parallel action group.
    fn parse_keyed_binding(
        &mut self,
        modifiers: Vec<String>,
        line: usize,
    ) -> Result<Vec<KeyBinding>, ParseError> {
        match self.peek().kind {
            TokenKind::LBrace => {
                let keys = self.parse_identifier_group()?;
                self.parse_grouped_tail(modifiers, keys, line)
            }
            TokenKind::Identifier => {
                let key = self.advance().text;
                let timeout = self.parse_timeout()?;
                self.expect(TokenKind::Colon, "Expected ':' after key")?;
                let body = self.parse_body()?;
                self.expect_statement_end()?;
                Ok(vec![Self::make_binding(
                    modifiers,
                    Some(key),
                    Vec::new(),
                    timeout,
                    body,
                    line,
                )])
            }
            _ => Err(self.syntax_here("Expected key or '{' after '-'")),
        }
    }

    /// Tail of a grouped-target binding: optional timeout, `:`, then a
    /// parallel action group zipped index-wise against `keys`. The zip
    /// produces one binding per member sharing modifiers, timeout, and
    /// comments.
    fn parse_grouped_tail(
        &mut self,
        modifiers: Vec<String>,
        keys: Vec<String>,
        line: usize,
    ) -> Result<Vec<KeyBinding>, ParseError> {
        let timeout = self.parse_timeout()?;
        self.expect(TokenKind::Colon, "Expected ':' after key")?;
        let (prefix, members, group_tok) = self.parse_action_group()?;
        if keys.len() != members.len() {
            return Err(Self::syntax(
                format!(
                    "Mismatched group sizes: {} keys vs {} actions",
                    keys.len(),
                    members.len()
                ),
                &group_tok,
            ));
        }
        self.expect_statement_end()?;

        Ok(keys
            .into_iter()
            .zip(members)
            .map(|(key, member)| {
                let command = if prefix.is_empty() {
                    member
                } else {
                    format!("{} {}", prefix.join(" "), member)
                };
                KeyBinding {
                    modifiers: modifiers.clone(),
                    key: Some(key),
                    flags: Vec::new(),
                    timeout,
                    body: BindingBody::Chain(vec![Action::new(command)]),
                    comments: Vec::new(),
                    line_number: line,
                }
            })
            .collect())
    }

    /// Modifier-only binding: one or more `~flag` tokens, optional
    /// timeout, `:`, body. No key token.
    fn parse_flag_binding(
        &mut self,
        modifiers: Vec<String>,
        line: usize,
    ) -> Result<KeyBinding, ParseError> {
        let mut flags = Vec::new();
        while self.check(TokenKind::Tilde) {
            self.advance();
            let tok = self.expect(TokenKind::Identifier, "Expected activation flag after '~'")?;
            let flag = ActivationFlag::from_name(&tok.text).ok_or_else(|| {
                Self::syntax(format!("Unknown activation flag '{}'", tok.text), &tok)
            })?;
            flags.push(flag);
        }
        let timeout = self.parse_timeout()?;
        self.expect(TokenKind::Colon, "Expected ':' after activation flags")?;
        let body = self.parse_body()?;
        self.expect_statement_end()?;
        Ok(Self::make_binding(modifiers, None, flags, timeout, body, line))
    }

    /// `{` IDENT (`,` IDENT)* `}` — non-empty, no trailing comma.
    fn parse_identifier_group(&mut self) -> Result<Vec<String>, ParseError> {
        let open = self.expect(TokenKind::LBrace, "Expected '{'")?;
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Identifier => items.push(self.advance().text),
                TokenKind::RBrace if items.is_empty() => {
                    return Err(self.syntax_here("Empty group"));
                }
                TokenKind::Colon | TokenKind::Newline | TokenKind::EndOfInput => {
                    return Err(Self::syntax("Unterminated group", &open));
                }
                _ => return Err(self.syntax_here("Expected identifier in group")),
            }
            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(items);
                }
                TokenKind::Colon | TokenKind::Newline | TokenKind::EndOfInput => {
                    return Err(Self::syntax("Unterminated group", &open));
                }
                _ => return Err(self.syntax_here("Expected ',' between group items")),
            }
        }
    }

    /// Body of a grouped-target binding: optional command prefix words
    /// followed by a `{ … }` action group whose members are word runs.
    ///
    /// Returns the prefix words, the group members, and the opening
    /// brace token (for mismatch error positions).
    fn parse_action_group(&mut self) -> Result<(Vec<String>, Vec<String>, Token), ParseError> {
        let mut prefix = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Text
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::Number => prefix.push(self.advance().text),
                TokenKind::LBrace => break,
                TokenKind::Newline | TokenKind::EndOfInput => {
                    return Err(self.syntax_here("Expected action group to match key group"));
                }
                _ => {
                    let tok = self.peek().clone();
                    return Err(Self::syntax(
                        format!("Unexpected token in command: {}", tok.kind),
                        &tok,
                    ));
                }
            }
        }
        let open = self.advance(); // '{'

        let mut members = Vec::new();
        loop {
            let mut words = Vec::new();
            while matches!(
                self.peek().kind,
                TokenKind::Text | TokenKind::String | TokenKind::Identifier | TokenKind::Number
            ) {
                words.push(self.advance().text);
            }
            if words.is_empty() {
                return Err(self.syntax_here("Expected command in action group"));
            }
            members.push(words.join(" "));
            match self.peek().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Newline | TokenKind::EndOfInput => {
                    return Err(Self::syntax("Unterminated group", &open));
                }
                _ => return Err(self.syntax_here("Expected ',' or '}' in action group")),
            }
        }
        Ok((prefix, members, open))
    }

    /// Optional `[ NUMBER ms ]`. Bare numbers without the `ms` unit are
    /// rejected.
    fn parse_timeout(&mut self) -> Result<Option<i64>, ParseError> {
        if !self.check(TokenKind::LBracket) {
            return Ok(None);
        }
        self.advance();
        let number = self.expect(TokenKind::Number, "Expected timeout value")?;
        let value: i64 = number
            .text
            .parse()
            .map_err(|_| Self::syntax("Invalid timeout value", &number))?;
        let unit = self.peek().clone();
        if unit.kind == TokenKind::Identifier && unit.text == "ms" {
            self.advance();
        } else {
            return Err(Self::syntax("Expected 'ms' after timeout value", &unit));
        }
        self.expect(TokenKind::RBracket, "Expected ']' after timeout")?;
        Ok(Some(value))
    }

    /// A nested block (`{ … }`) or a command chain.
    fn parse_body(&mut self) -> Result<BindingBody, ParseError> {
        if self.check(TokenKind::LBrace) {
            let open = self.advance();
            Ok(BindingBody::Nested(self.parse_nested_block(&open)?))
        } else {
            Ok(BindingBody::Chain(self.parse_chain(ChainContext::Statement)?))
        }
    }

    /// Command chain: word-run segments joined by `;`. Segments join
    /// their tokens with single spaces. Inside a nested block, a `;`
    /// followed by `}`, end of line, or `key :` terminates the entry
    /// instead of continuing the chain.
    fn parse_chain(&mut self, ctx: ChainContext) -> Result<Vec<Action>, ParseError> {
        let mut actions = Vec::new();
        loop {
            let mut words = Vec::new();
            loop {
                match self.peek().kind {
                    TokenKind::Text
                    | TokenKind::String
                    | TokenKind::Identifier
                    | TokenKind::Number => words.push(self.advance().text),
                    TokenKind::LBrace => {
                        return Err(self.syntax_here("Action group requires a matching key group"));
                    }
                    _ => break,
                }
            }
            if words.is_empty() {
                if actions.is_empty() {
                    return Err(self.syntax_here("Expected command after ':'"));
                }
                break; // trailing semicolon
            }
            actions.push(Action::new(words.join(" ")));

            if !self.check(TokenKind::Semicolon) {
                break;
            }
            self.advance(); // ';'
            match ctx {
                ChainContext::Nested => match self.peek().kind {
                    TokenKind::RBrace | TokenKind::Newline | TokenKind::EndOfInput => break,
                    TokenKind::Identifier if self.peek_next().kind == TokenKind::Colon => break,
                    _ => {}
                },
                ChainContext::Statement => {
                    if matches!(self.peek().kind, TokenKind::Newline | TokenKind::EndOfInput) {
                        break;
                    }
                }
            }
        }
        Ok(actions)
    }

    /// Entries of a nested block, in source order. Duplicate keys are
    /// preserved here and reported by the validator. Recursion depth is
    /// unbounded in the parser; excessive depth is a validator warning.
    fn parse_nested_block(&mut self, open: &Token) -> Result<NestedBlock, ParseError> {
        let mut entries = Vec::new();
        loop {
            while self.check(TokenKind::Newline) {
                self.advance();
            }
            if self.check(TokenKind::RBrace) {
                self.advance();
                break;
            }
            if self.check(TokenKind::EndOfInput) {
                return Err(Self::syntax("Unterminated nested block", open));
            }

            let key = self.expect(TokenKind::Identifier, "Expected key in nested block")?;
            self.expect(TokenKind::Colon, "Expected ':' after key in nested binding")?;
            let body = if self.check(TokenKind::LBrace) {
                let inner = self.advance();
                BindingBody::Nested(self.parse_nested_block(&inner)?)
            } else {
                BindingBody::Chain(self.parse_chain(ChainContext::Nested)?)
            };
            if self.check(TokenKind::Semicolon) {
                self.advance();
            }
            entries.push(NestedEntry {
                key: key.text,
                line_number: key.line,
                body,
            });
        }
        Ok(NestedBlock { entries })
    }

    /// Applies the nested-menu timeout default of
    /// [`DEFAULT_NESTED_TIMEOUT_MS`]; chain bodies keep their explicit
    /// timeout or none.
    fn make_binding(
        modifiers: Vec<String>,
        key: Option<String>,
        flags: Vec<ActivationFlag>,
        timeout: Option<i64>,
        body: BindingBody,
        line: usize,
    ) -> KeyBinding {
        let timeout = match (&body, timeout) {
            (BindingBody::Nested(_), None) => Some(DEFAULT_NESTED_TIMEOUT_MS),
            (_, explicit) => explicit,
        };
        KeyBinding {
            modifiers,
            key,
            flags,
            timeout,
            body,
            comments: Vec::new(),
            line_number: line,
        }
    }

    /// Moves every pending comment claimed by the statement at `line`
    /// onto the produced bindings, then appends them to the document.
    fn attach_and_push(&mut self, doc: &mut Document, mut bindings: Vec<KeyBinding>, line: usize) {
        let claimed = self.claim_comments(line);
        for binding in &mut bindings {
            binding.comments = claimed.clone();
        }
        doc.keybindings.extend(bindings);
    }

    /// Removes and returns pending comments whose `line_number` or
    /// `associated_code_line` matches `line`, in encounter order.
    fn claim_comments(&mut self, line: usize) -> Vec<Comment> {
        let mut claimed = Vec::new();
        self.pending_comments.retain(|comment| {
            if comment.line_number == line || comment.associated_code_line == Some(line) {
                claimed.push(comment.clone());
                false
            } else {
                true
            }
        });
        claimed
    }

    /// Statement terminator: newline (consumed) or end of input.
    fn expect_statement_end(&mut self) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::EndOfInput => Ok(()),
            _ => Err(self.syntax_here("Expected end of line")),
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.syntax_here(message))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn peek(&self) -> &Token {
        // Tokenize always appends EndOfInput, so the stream is non-empty
        // and the cursor clamps to the final token.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> &Token {
        &self.tokens[(self.current + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    fn syntax(message: impl Into<String>, token: &Token) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn syntax_here(&self, message: &str) -> ParseError {
        Self::syntax(message, self.peek())
    }
}
