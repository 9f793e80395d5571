//! src/core/types.rs
//!
//! Document model for parsed Meraki configurations
//!
//! This module defines the entities produced by the parser:
//! - `ModifierDefinition`: a named alias for a pair of physical keys
//! - `ActivationFlag`: key-down / key-up / key-repeat trigger marks
//! - `Action` and `BindingBody`: a command chain or a nested leader menu
//! - `KeyBinding`: one fully expanded binding
//! - `Document`: the complete parse result
//!
//! Everything here is built once during a parse call and read-only
//! afterwards; the validator never mutates a document. All types
//! serialize for machine-readable reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::comments::Comment;

/// Trigger condition for a modifier-only binding.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ActivationFlag {
    /// Fire when the modifier is pressed
    Down,
    /// Fire when the modifier is released
    Up,
    /// Fire repeatedly while the modifier is held
    Repeat,
}

impl ActivationFlag {
    /// Parses the flag name used in source text (`~down`, `~up`, `~repeat`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "down" => Some(ActivationFlag::Down),
            "up" => Some(ActivationFlag::Up),
            "repeat" => Some(ActivationFlag::Repeat),
            _ => None,
        }
    }
}

impl fmt::Display for ActivationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFlag::Down => write!(f, "down"),
            ActivationFlag::Up => write!(f, "up"),
            ActivationFlag::Repeat => write!(f, "repeat"),
        }
    }
}

/// A single shell-like command string.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Action {
    pub command: String,
}

impl Action {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// What a binding does when triggered: run commands in sequence, or open
/// a nested leader menu.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BindingBody {
    /// One or more commands run in order
    Chain(Vec<Action>),
    /// A sub-menu of further key bindings
    Nested(NestedBlock),
}

/// One entry of a nested block: a key mapped to a chain or a deeper block.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NestedEntry {
    pub key: String,
    pub line_number: usize,
    pub body: BindingBody,
}

/// An ordered sequence of nested entries.
///
/// Kept as a list rather than a map so duplicate keys remain observable;
/// the validator reports them before any lookup structure is built.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NestedBlock {
    pub entries: Vec<NestedEntry>,
}

impl NestedBlock {
    /// Depth of this block counting itself: a block with no nested
    /// children has depth 1.
    pub fn depth(&self) -> usize {
        let child_depth = self
            .entries
            .iter()
            .filter_map(|entry| match &entry.body {
                BindingBody::Nested(block) => Some(block.depth()),
                BindingBody::Chain(_) => None,
            })
            .max()
            .unwrap_or(0);
        child_depth + 1
    }
}

/// A modifier alias: `mod1 = lcmd + lalt`.
///
/// Invariant: `keys` holds exactly two entries. The parser enforces this;
/// the validator re-checks it for documents built programmatically.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ModifierDefinition {
    pub name: String,
    pub keys: Vec<String>,
    pub comments: Vec<Comment>,
    pub line_number: usize,
}

impl fmt::Display for ModifierDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.keys.join(" + "))
    }
}

/// A fully expanded keybinding.
///
/// Invariant: `key` is `None` only for modifier-only bindings, which must
/// carry at least one activation flag.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyBinding {
    /// Modifier tokens in source order; the first names a defined alias
    pub modifiers: Vec<String>,
    /// Bound key, absent for modifier-only triggers
    pub key: Option<String>,
    /// Activation flags for modifier-only triggers
    pub flags: Vec<ActivationFlag>,
    /// Leader-menu timeout in milliseconds. Signed so the validator's
    /// range pass stays meaningful for hand-built documents.
    pub timeout: Option<i64>,
    pub body: BindingBody,
    pub comments: Vec<Comment>,
    pub line_number: usize,
}

impl KeyBinding {
    /// The trigger half of the binding, e.g. `mod1 + shift - k` or
    /// `mod1 ~down`.
    pub fn trigger(&self) -> String {
        let mut out = self.modifiers.join(" + ");
        if let Some(key) = &self.key {
            out.push_str(" - ");
            out.push_str(key);
        } else {
            for flag in &self.flags {
                out.push_str(" ~");
                out.push_str(&flag.to_string());
            }
        }
        out
    }

    /// Short human-readable summary of the body.
    pub fn body_summary(&self) -> String {
        match &self.body {
            BindingBody::Chain(actions) => actions
                .iter()
                .map(|a| a.command.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            BindingBody::Nested(block) => {
                format!("menu with {} entries", block.entries.len())
            }
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.trigger(), self.body_summary())
    }
}

/// A complete parsed configuration.
///
/// Modifier definitions keep their insertion order; redefining an alias
/// replaces the earlier entry in place. A document never contains
/// unexpanded group syntax.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Document {
    pub modifiers: Vec<ModifierDefinition>,
    pub keybindings: Vec<KeyBinding>,
    /// Comments never claimed by a statement, in encounter order
    pub comments: Vec<Comment>,
    /// Multiline note texts, verbatim
    pub notes: Vec<String>,
}

impl Document {
    /// Looks up a modifier alias by name.
    pub fn modifier(&self, name: &str) -> Option<&ModifierDefinition> {
        self.modifiers.iter().find(|def| def.name == name)
    }

    /// Adds a modifier definition, replacing any earlier one of the same
    /// name in place.
    pub fn define_modifier(&mut self, def: ModifierDefinition) {
        match self.modifiers.iter_mut().find(|d| d.name == def.name) {
            Some(existing) => *existing = def,
            None => self.modifiers.push(def),
        }
    }
}
