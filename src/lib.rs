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

//! Meraki Configuration Tools
//!
//! A parser, validator, and formatter for the Meraki keybinding
//! configuration language: modifier aliases, key→command bindings,
//! nested leader menus with timeouts, command chains, parallel group
//! expansion, and inline/multiline annotations.
//!
//! # Pipeline
//!
//! Raw text flows through four stages, each pure and synchronous:
//!
//! 1. **Comment extraction** strips `#` comments and `@END … END` notes
//!    while preserving line numbers (`core::comments`)
//! 2. **Lexing** turns the cleaned text into positioned tokens
//!    (`core::lexer`)
//! 3. **Parsing** builds a [`Document`], expanding groups and recursing
//!    into nested menus (`core::parser`)
//! 4. **Validation** accumulates semantic errors and warnings without
//!    ever failing (`core::validator`)
//!
//! Lexical and parse errors abort the pipeline with no partial result;
//! validation always returns a complete report.
//!
//! # Examples
//!
//! ## Parsing and validating
//!
//! ```
//! use meraki::core::{parse_document, validate};
//!
//! let source = "\
//! mod1 = lcmd + lalt
//! mod1 - m : open -a Mail.app
//! ";
//! let doc = parse_document(source)?;
//! let report = validate(&doc);
//! assert!(report.is_valid);
//! # Ok::<(), meraki::core::ParseError>(())
//! ```
//!
//! ## Formatting
//!
//! ```
//! use meraki::core::parse_document;
//! use meraki::format::Formatter;
//!
//! let doc = parse_document("mod1 = lcmd + lalt")?;
//! assert_eq!(Formatter::new().format(&doc), "mod1 = lcmd + lalt\n");
//! # Ok::<(), meraki::core::ParseError>(())
//! ```

pub mod core;
pub mod format;

// Re-export commonly used types for convenience
pub use crate::core::{
    parse_document, validate, Document, KeyBinding, ModifierDefinition, ParseError,
    ValidationResult,
};
