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

//! Multi-pass semantic validation over a parsed document.
//!
//! The validator is pure and stateless: it never mutates its input and
//! never fails on data-shape issues, it only accumulates findings.
//! Passes run in a fixed order because later passes depend on earlier
//! outcomes (unused-modifier analysis is skipped when undefined
//! modifiers were found, since the usage table would be unreliable).
//!
//! Errors mark a document unusable for a hotkey daemon; warnings are
//! advisory. Callers decide policy.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::types::{ActivationFlag, BindingBody, Document, NestedBlock};

/// Tunable ceilings for advisory checks.
///
/// The defaults were chosen from observed configurations rather than any
/// hard platform limit, so both are configurable.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct ValidatorConfig {
    /// Timeouts above this raise a warning (milliseconds)
    pub max_timeout_ms: i64,
    /// Nested menus deeper than this raise a warning
    pub max_nesting_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_timeout_ms: 5000,
            max_nesting_depth: 3,
        }
    }
}

/// A single validation finding with its source line.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Finding {
    pub message: String,
    pub line_number: usize,
}

/// Complete outcome of validating one document.
///
/// `is_valid` is true exactly when `errors` is empty; warnings never
/// block.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

/// Validates a document with the default configuration.
pub fn validate(doc: &Document) -> ValidationResult {
    Validator::new().validate(doc)
}

/// Semantic checker over completed documents.
pub struct Validator {
    config: ValidatorConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Runs all validation passes and returns the accumulated findings.
    ///
    /// Pass order:
    /// 1. structural invariants
    /// 2. undefined modifier aliases
    /// 3. unused modifier aliases (skipped if pass 2 found errors)
    /// 4. duplicate keybindings
    /// 5. timeout range
    /// 6. nested-menu depth
    /// 7. duplicate keys within nested blocks
    /// 8. activation-flag combinations
    pub fn validate(&self, doc: &Document) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.check_structure(doc, &mut errors);

        let modifiers_resolved = self.check_undefined_modifiers(doc, &mut errors);
        if modifiers_resolved {
            self.check_unused_modifiers(doc, &mut warnings);
        }

        self.check_duplicate_bindings(doc, &mut errors);
        self.check_timeouts(doc, &mut errors, &mut warnings);
        self.check_nesting_depth(doc, &mut warnings);
        self.check_duplicate_nested_keys(doc, &mut errors);
        self.check_activation_flags(doc, &mut errors);

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Pass 1: shape invariants the parser guarantees but hand-built
    /// documents might violate.
    fn check_structure(&self, doc: &Document, errors: &mut Vec<Finding>) {
        for def in &doc.modifiers {
            if def.keys.len() != 2 {
                errors.push(Finding {
                    message: format!(
                        "Modifier '{}' must combine exactly two keys (found {})",
                        def.name,
                        def.keys.len()
                    ),
                    line_number: def.line_number,
                });
            }
        }

        for binding in &doc.keybindings {
            if binding.modifiers.is_empty() {
                errors.push(Finding {
                    message: "Keybinding has no modifiers".to_string(),
                    line_number: binding.line_number,
                });
            }
            if binding.key.is_none() && binding.flags.is_empty() {
                errors.push(Finding {
                    message: "Keybinding has neither a key nor activation flags".to_string(),
                    line_number: binding.line_number,
                });
            }
            if let BindingBody::Chain(actions) = &binding.body {
                if actions.is_empty() {
                    errors.push(Finding {
                        message: "Keybinding has an empty command chain".to_string(),
                        line_number: binding.line_number,
                    });
                }
            }
        }
    }

    /// Pass 2: the first modifier token of every binding must name a
    /// defined alias. Subsequent tokens are raw key names and are not
    /// checked. Returns true when no undefined aliases were found.
    fn check_undefined_modifiers(&self, doc: &Document, errors: &mut Vec<Finding>) -> bool {
        let before = errors.len();
        for binding in &doc.keybindings {
            if let Some(first) = binding.modifiers.first() {
                if doc.modifier(first).is_none() {
                    errors.push(Finding {
                        message: format!("Undefined modifier '{}'", first),
                        line_number: binding.line_number,
                    });
                }
            }
        }
        errors.len() == before
    }

    /// Pass 3: aliases that no binding uses as its leading modifier.
    fn check_unused_modifiers(&self, doc: &Document, warnings: &mut Vec<Finding>) {
        let used: HashSet<&str> = doc
            .keybindings
            .iter()
            .filter_map(|b| b.modifiers.first())
            .map(String::as_str)
            .collect();

        for def in &doc.modifiers {
            if !used.contains(def.name.as_str()) {
                warnings.push(Finding {
                    message: format!("Modifier '{}' is defined but never used", def.name),
                    line_number: def.line_number,
                });
            }
        }
    }

    /// Pass 4: the (modifier list, key) pair must be unique across the
    /// document. Later occurrences cite the first definition's line.
    fn check_duplicate_bindings(&self, doc: &Document, errors: &mut Vec<Finding>) {
        let mut seen: HashMap<(String, Option<&str>), usize> = HashMap::new();
        for binding in &doc.keybindings {
            let combo = (binding.modifiers.join(" "), binding.key.as_deref());
            match seen.get(&combo) {
                Some(first_line) => {
                    errors.push(Finding {
                        message: format!(
                            "Duplicate keybinding '{}' (first defined at line {})",
                            binding.trigger(),
                            first_line
                        ),
                        line_number: binding.line_number,
                    });
                }
                None => {
                    seen.insert(combo, binding.line_number);
                }
            }
        }
    }

    /// Pass 5: negative timeouts are errors; timeouts above the
    /// configured ceiling are warnings.
    fn check_timeouts(
        &self,
        doc: &Document,
        errors: &mut Vec<Finding>,
        warnings: &mut Vec<Finding>,
    ) {
        for binding in &doc.keybindings {
            let Some(timeout) = binding.timeout else {
                continue;
            };
            if timeout < 0 {
                errors.push(Finding {
                    message: format!("Timeout cannot be negative (found {}ms)", timeout),
                    line_number: binding.line_number,
                });
            } else if timeout > self.config.max_timeout_ms {
                warnings.push(Finding {
                    message: format!(
                        "Timeout {}ms exceeds recommended maximum of {}ms",
                        timeout, self.config.max_timeout_ms
                    ),
                    line_number: binding.line_number,
                });
            }
        }
    }

    /// Pass 6: leader menus nested beyond the configured depth.
    fn check_nesting_depth(&self, doc: &Document, warnings: &mut Vec<Finding>) {
        for binding in &doc.keybindings {
            if let BindingBody::Nested(block) = &binding.body {
                let depth = block.depth();
                if depth > self.config.max_nesting_depth {
                    warnings.push(Finding {
                        message: format!(
                            "Nested bindings are {} levels deep (recommended maximum is {})",
                            depth, self.config.max_nesting_depth
                        ),
                        line_number: binding.line_number,
                    });
                }
            }
        }
    }

    /// Pass 7: repeated keys within one nested block. The ordered entry
    /// list makes these observable before any lookup map is built.
    fn check_duplicate_nested_keys(&self, doc: &Document, errors: &mut Vec<Finding>) {
        fn walk(block: &NestedBlock, errors: &mut Vec<Finding>) {
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for entry in &block.entries {
                match seen.get(entry.key.as_str()) {
                    Some(first_line) => {
                        errors.push(Finding {
                            message: format!(
                                "Duplicate key '{}' in nested block (first defined at line {})",
                                entry.key, first_line
                            ),
                            line_number: entry.line_number,
                        });
                    }
                    None => {
                        seen.insert(&entry.key, entry.line_number);
                    }
                }
                if let BindingBody::Nested(inner) = &entry.body {
                    walk(inner, errors);
                }
            }
        }

        for binding in &doc.keybindings {
            if let BindingBody::Nested(block) = &binding.body {
                walk(block, errors);
            }
        }
    }

    /// Pass 8: the flag set must be exactly `down`, `up`, or
    /// `down repeat`. Anything else (notably `up down` or `up repeat`)
    /// is an error.
    fn check_activation_flags(&self, doc: &Document, errors: &mut Vec<Finding>) {
        for binding in &doc.keybindings {
            if binding.flags.is_empty() {
                continue;
            }
            let flags: HashSet<ActivationFlag> = binding.flags.iter().copied().collect();
            let down = flags.contains(&ActivationFlag::Down);
            let up = flags.contains(&ActivationFlag::Up);
            let repeat = flags.contains(&ActivationFlag::Repeat);

            let allowed = (down && !up && !repeat)
                || (up && !down && !repeat)
                || (down && repeat && !up);
            if !allowed {
                let listed = binding
                    .flags
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                errors.push(Finding {
                    message: format!(
                        "Invalid activation flag combination [{}]: expected 'down', 'up', or 'down repeat'",
                        listed
                    ),
                    line_number: binding.line_number,
                });
            }
        }
    }
}
