//! Core module tests
//!
//! Contains test suites for the front-end pipeline:
//! - Comment and note extraction tests
//! - Lexer tests
//! - Parser tests (grammar, group expansion, nesting, reattachment)
//! - Validator tests
//! - Document model tests

#[cfg(test)]
mod parser_tests;
