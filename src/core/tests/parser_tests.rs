use crate::core::comments::CommentKind;
use crate::core::parser::{parse_document, ParseError, DEFAULT_NESTED_TIMEOUT_MS};
use crate::core::types::{BindingBody, Document, KeyBinding};

fn parse_ok(input: &str) -> Document {
    match parse_document(input) {
        Ok(doc) => doc,
        Err(e) => panic!("parse failed for {:?}: {}", input, e),
    }
}

fn syntax_message(input: &str) -> String {
    match parse_document(input) {
        Err(ParseError::Syntax { message, .. }) => message,
        Err(other) => panic!("expected syntax error for {:?}, got {}", input, other),
        Ok(_) => panic!("expected parse failure for {:?}", input),
    }
}

fn chain_commands(binding: &KeyBinding) -> Vec<&str> {
    match &binding.body {
        BindingBody::Chain(actions) => actions.iter().map(|a| a.command.as_str()).collect(),
        BindingBody::Nested(_) => panic!("expected a chain body"),
    }
}

#[test]
fn test_modifier_definition() {
    let doc = parse_ok("mod1 = lcmd + lalt");
    assert_eq!(doc.modifiers.len(), 1);
    let def = &doc.modifiers[0];
    assert_eq!(def.name, "mod1");
    assert_eq!(def.keys, vec!["lcmd", "lalt"]);
    assert_eq!(def.line_number, 1);
}

#[test]
fn test_modifier_redefinition_replaces_in_place() {
    let doc = parse_ok("mod1 = lcmd + lalt\nmod2 = lshift + lctrl\nmod1 = rcmd + ralt");
    assert_eq!(doc.modifiers.len(), 2);
    // Order is insertion order; mod1 keeps its slot with the new keys.
    assert_eq!(doc.modifiers[0].name, "mod1");
    assert_eq!(doc.modifiers[0].keys, vec!["rcmd", "ralt"]);
    assert_eq!(doc.modifiers[0].line_number, 3);
    assert_eq!(doc.modifiers[1].name, "mod2");
}

#[test]
fn test_modifier_definition_requires_two_keys() {
    assert_eq!(
        syntax_message("mod1 = lcmd"),
        "Expected '+' between keys"
    );
    assert_eq!(
        syntax_message("mod1 = lcmd + lalt + rcmd"),
        "Expected end of line"
    );
    assert_eq!(
        syntax_message("mod1 ="),
        "Expected first key in modifier definition"
    );
}

#[test]
fn test_simple_binding() {
    let doc = parse_ok("mod1 - m : open -a Mail.app");
    assert_eq!(doc.keybindings.len(), 1);
    let binding = &doc.keybindings[0];
    assert_eq!(binding.modifiers, vec!["mod1"]);
    assert_eq!(binding.key.as_deref(), Some("m"));
    assert!(binding.flags.is_empty());
    assert_eq!(binding.timeout, None);
    assert_eq!(chain_commands(binding), vec!["open -a Mail.app"]);
}

#[test]
fn test_quoted_argument_joins_unquoted() {
    let doc = parse_ok("mod1 - c : open -a \"Google Chrome\"");
    assert_eq!(
        chain_commands(&doc.keybindings[0]),
        vec!["open -a Google Chrome"]
    );
}

#[test]
fn test_compound_modifiers() {
    let doc = parse_ok("mod1 + shift - s : screenshot");
    let binding = &doc.keybindings[0];
    assert_eq!(binding.modifiers, vec!["mod1", "shift"]);
    assert_eq!(binding.key.as_deref(), Some("s"));
}

#[test]
fn test_modifier_group_flattens_into_one_binding() {
    // A group in modifier position joins the modifier list; it never
    // multiplies bindings.
    let doc = parse_ok("mod1 + { shift, ctrl } - x : do thing");
    assert_eq!(doc.keybindings.len(), 1);
    assert_eq!(doc.keybindings[0].modifiers, vec!["mod1", "shift", "ctrl"]);
}

#[test]
fn test_key_group_expands_zipped_with_action_group() {
    let doc = parse_ok("mod1 + { c, f, m } : open -a { \"Chrome\", \"Finder\", \"Mail\" }");
    assert_eq!(doc.keybindings.len(), 3);

    let triples: Vec<(Option<&str>, Vec<&str>)> = doc
        .keybindings
        .iter()
        .map(|b| (b.key.as_deref(), chain_commands(b)))
        .collect();
    assert_eq!(
        triples,
        vec![
            (Some("c"), vec!["open -a Chrome"]),
            (Some("f"), vec!["open -a Finder"]),
            (Some("m"), vec!["open -a Mail"]),
        ]
    );
    for binding in &doc.keybindings {
        assert_eq!(binding.modifiers, vec!["mod1"]);
        assert_eq!(binding.line_number, 1);
    }
}

#[test]
fn test_key_group_after_minus_expands_too() {
    let doc = parse_ok("mod1 - { h, l } : focus { left, right }");
    assert_eq!(doc.keybindings.len(), 2);
    assert_eq!(chain_commands(&doc.keybindings[0]), vec!["focus left"]);
    assert_eq!(chain_commands(&doc.keybindings[1]), vec!["focus right"]);
}

#[test]
fn test_mismatched_group_sizes() {
    assert_eq!(
        syntax_message("mod1 + { c, f } : open -a { Chrome }"),
        "Mismatched group sizes: 2 keys vs 1 actions"
    );
}

#[test]
fn test_key_group_requires_action_group() {
    assert_eq!(
        syntax_message("mod1 - { c, f } : open -a Chrome"),
        "Expected action group to match key group"
    );
}

#[test]
fn test_action_group_requires_key_group() {
    assert_eq!(
        syntax_message("mod1 - x : open -a { Chrome }"),
        "Action group requires a matching key group"
    );
}

#[test]
fn test_empty_and_unterminated_groups() {
    assert_eq!(syntax_message("mod1 - { } : cmd"), "Empty group");
    assert_eq!(syntax_message("mod1 + { c, f : cmd"), "Unterminated group");
    assert_eq!(
        syntax_message("mod1 - { c f } : cmd"),
        "Expected ',' between group items"
    );
}

#[test]
fn test_command_chain() {
    let doc = parse_ok("mod1 - r : refresh panel; notify done");
    assert_eq!(
        chain_commands(&doc.keybindings[0]),
        vec!["refresh panel", "notify done"]
    );
}

#[test]
fn test_trailing_semicolon_allowed() {
    let doc = parse_ok("mod1 - r : refresh panel;");
    assert_eq!(chain_commands(&doc.keybindings[0]), vec!["refresh panel"]);
}

#[test]
fn test_empty_body_rejected() {
    assert_eq!(syntax_message("mod1 - r :"), "Expected command after ':'");
}

#[test]
fn test_modifier_only_binding_with_flags() {
    let doc = parse_ok("mod1 ~down : show overlay");
    let binding = &doc.keybindings[0];
    assert_eq!(binding.modifiers, vec!["mod1"]);
    assert_eq!(binding.key, None);
    assert_eq!(binding.flags.len(), 1);
    assert_eq!(binding.trigger(), "mod1 ~down");

    let doc = parse_ok("mod1 ~down ~repeat : move mouse");
    assert_eq!(doc.keybindings[0].flags.len(), 2);
    assert_eq!(doc.keybindings[0].trigger(), "mod1 ~down ~repeat");
}

#[test]
fn test_unknown_activation_flag() {
    assert_eq!(
        syntax_message("mod1 ~sideways : cmd"),
        "Unknown activation flag 'sideways'"
    );
}

#[test]
fn test_nested_block() {
    let doc = parse_ok(
        "mod1 - o : {\n    c : open -a Chrome;\n    t : open -a Terminal;\n}",
    );
    let binding = &doc.keybindings[0];
    assert_eq!(binding.timeout, Some(DEFAULT_NESTED_TIMEOUT_MS));

    let BindingBody::Nested(block) = &binding.body else {
        panic!("expected a nested body");
    };
    assert_eq!(block.entries.len(), 2);
    assert_eq!(block.entries[0].key, "c");
    assert_eq!(block.entries[0].line_number, 2);
    assert_eq!(block.entries[1].key, "t");
    assert_eq!(block.entries[1].line_number, 3);
}

#[test]
fn test_nested_block_explicit_timeout() {
    let doc = parse_ok("mod1 - o [750ms] : {\n    c : open -a Chrome;\n}");
    assert_eq!(doc.keybindings[0].timeout, Some(750));
}

#[test]
fn test_chain_binding_has_no_default_timeout() {
    let doc = parse_ok("mod1 - m : open -a Mail");
    assert_eq!(doc.keybindings[0].timeout, None);
}

#[test]
fn test_timeout_requires_ms_unit() {
    assert_eq!(
        syntax_message("mod1 - o [500] : cmd"),
        "Expected 'ms' after timeout value"
    );
}

#[test]
fn test_nested_entry_chain_vs_new_entry() {
    // `cmd1; cmd2` continues the chain; `b : …` after `;` starts a new
    // entry.
    let doc = parse_ok("mod1 - o : { a : one run; two run; b : three run }");
    let BindingBody::Nested(block) = &doc.keybindings[0].body else {
        panic!("expected a nested body");
    };
    assert_eq!(block.entries.len(), 2);
    assert_eq!(block.entries[0].key, "a");
    match &block.entries[0].body {
        BindingBody::Chain(actions) => {
            let cmds: Vec<&str> = actions.iter().map(|a| a.command.as_str()).collect();
            assert_eq!(cmds, vec!["one run", "two run"]);
        }
        BindingBody::Nested(_) => panic!("expected a chain"),
    }
    assert_eq!(block.entries[1].key, "b");
}

#[test]
fn test_deeply_nested_blocks() {
    let doc = parse_ok("mod1 - o : { a : { b : { c : cmd; } } }");
    let BindingBody::Nested(outer) = &doc.keybindings[0].body else {
        panic!("expected a nested body");
    };
    assert_eq!(outer.depth(), 3);
}

#[test]
fn test_duplicate_nested_keys_parse_cleanly() {
    // The parser keeps both entries; flagging the duplicate is the
    // validator's job.
    let doc = parse_ok("mod1 - o : { a : one; a : two; }");
    let BindingBody::Nested(block) = &doc.keybindings[0].body else {
        panic!("expected a nested body");
    };
    assert_eq!(block.entries.len(), 2);
}

#[test]
fn test_unterminated_nested_block() {
    let err = parse_document("mod1 - o : {\n    a : cmd;\n").unwrap_err();
    let ParseError::Syntax { message, line, .. } = err else {
        panic!("expected a syntax error");
    };
    assert_eq!(message, "Unterminated nested block");
    assert_eq!(line, 1);
}

#[test]
fn test_statement_dispatch_errors() {
    assert_eq!(
        syntax_message("mod1 : action"),
        "Expected '=', '-', '+', or '~' after identifier"
    );
    assert_eq!(syntax_message("mod1 - : action"), "Expected key or '{' after '-'");
    assert_eq!(syntax_message("mod1 - m"), "Expected ':' after key");
    assert_eq!(syntax_message("- x : cmd"), "Unexpected token: '-'");
    assert_eq!(
        syntax_message("mod1 + - x : cmd"),
        "Expected modifier or '{' after '+'"
    );
}

#[test]
fn test_error_position_reported() {
    let err = parse_document("mod1 = lcmd + lalt\nmod1 - m\n").unwrap_err();
    let ParseError::Syntax { line, .. } = err else {
        panic!("expected a syntax error");
    };
    assert_eq!(line, 2);
}

#[test]
fn test_lexical_error_propagates() {
    let err = parse_document("mod1 = lcmd+lalt").unwrap_err();
    assert!(matches!(err, ParseError::Lexical(_)));
}

#[test]
fn test_fail_fast_stops_at_first_error() {
    // Both statements are bad; only the first is reported.
    let err = parse_document("mod1 = lcmd\nmod2 = x\n").unwrap_err();
    let ParseError::Syntax { line, .. } = err else {
        panic!("expected a syntax error");
    };
    assert_eq!(line, 1);
}

#[test]
fn test_comments_do_not_shift_line_numbers() {
    let doc = parse_ok("# header\n\nmod1 = lcmd + lalt\nmod1 - m : open -a Mail");
    assert_eq!(doc.modifiers[0].line_number, 3);
    assert_eq!(doc.keybindings[0].line_number, 4);
}

#[test]
fn test_inline_comment_reattaches_to_statement() {
    let doc = parse_ok("mod1 = lcmd + lalt  # main modifier\nmod1 - m : open -a Mail  # mail");
    assert_eq!(doc.modifiers[0].comments.len(), 1);
    assert_eq!(doc.modifiers[0].comments[0].text, "main modifier");
    assert_eq!(doc.keybindings[0].comments.len(), 1);
    assert_eq!(doc.keybindings[0].comments[0].text, "mail");
    assert!(doc.comments.is_empty());
}

#[test]
fn test_standalone_comments_stay_on_document() {
    let doc = parse_ok("# section header\nmod1 = lcmd + lalt");
    assert!(doc.modifiers[0].comments.is_empty());
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments[0].kind, CommentKind::Line);
}

#[test]
fn test_grouped_bindings_share_claimed_comment() {
    let doc = parse_ok("mod1 - { h, l } : focus { left, right }  # focus moves");
    assert_eq!(doc.keybindings.len(), 2);
    for binding in &doc.keybindings {
        assert_eq!(binding.comments.len(), 1);
        assert_eq!(binding.comments[0].text, "focus moves");
    }
}

#[test]
fn test_multiline_note_collected() {
    let doc = parse_ok("@END\nremember to map mod3\nEND\nmod1 = lcmd + lalt");
    assert_eq!(doc.notes, vec!["remember to map mod3"]);
    assert_eq!(doc.comments.len(), 1);
    assert_eq!(doc.comments[0].kind, CommentKind::Multiline);
}

#[test]
fn test_blank_lines_and_eof_without_newline() {
    let doc = parse_ok("\n\nmod1 = lcmd + lalt\n\n\nmod1 - m : open -a Mail");
    assert_eq!(doc.modifiers.len(), 1);
    assert_eq!(doc.keybindings.len(), 1);
    assert_eq!(doc.keybindings[0].line_number, 6);
}
