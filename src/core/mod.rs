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

//! src/core/mod.rs
//!
//! Front-end pipeline for the Meraki configuration language
//!
//! This module contains the whole text-to-document pipeline:
//! - Comment and note extraction (line-number preserving)
//! - Lexical analysis with position tracking
//! - Recursive-descent parsing with group expansion and nested menus
//! - Multi-pass semantic validation
//!
//! The pipeline is synchronous, performs no I/O, and is isolated from
//! the CLI so every stage can be unit tested on plain strings.

pub mod comments;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod validator;

pub use comments::{Comment, CommentKind};
pub use lexer::{LexicalError, Token, TokenKind};
pub use parser::{parse_document, ParseError, Parser};
pub use types::*;
pub use validator::{validate, Finding, ValidationResult, Validator, ValidatorConfig};

#[cfg(test)]
mod tests;
