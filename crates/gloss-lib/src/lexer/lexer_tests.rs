use std::sync::Arc;

use gloss_table::{GrammarTable, LexModeId, SymbolId};

use super::*;
use crate::test_utils::*;

fn terminal(table: &GrammarTable, name: &str) -> SymbolId {
    table
        .symbol_for_name(name, true)
        .or_else(|| table.symbol_for_name(name, false))
        .filter(|&s| table.is_terminal(s))
        .unwrap_or_else(|| panic!("no terminal named {name}"))
}

fn whitespace(table: &GrammarTable) -> SymbolId {
    table
        .extras()
        .iter()
        .copied()
        .find(|&e| table.symbol_name(e) != "comment")
        .unwrap()
}

fn lex_with(
    table: &Arc<GrammarTable>,
    text: &str,
    position: usize,
    valid: &[SymbolId],
    immediate_ok: bool,
) -> Token {
    let state = ScannerState::default();
    let request = LexRequest {
        valid,
        mode: LexModeId(0),
        immediate_ok,
        scanner_state: &state,
    };
    Lexer::new(table, text).lex(position, &request)
}

fn lex_initial(table: &Arc<GrammarTable>, text: &str, position: usize) -> Token {
    let mode = table.lex_mode(table.initial_state());
    let valid = table.lex_mode_terminals(mode).to_vec();
    lex_with(table, text, position, &valid, true)
}

#[test]
fn longest_match_records_examined_bytes() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "12 + 3", 0);

    assert_eq!(table.symbol_name(token.symbol), "NUMBER");
    assert_eq!(token.byte_range(), 0..2);
    // The space that ended the number was looked at.
    assert!(token.lookahead_end >= 3);
    assert!(!token.is_extra);
    assert!(!token.is_error);
}

#[test]
fn extras_are_flagged() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, " 1", 0);

    assert!(token.is_extra);
    assert_eq!(token.byte_range(), 0..1);
}

#[test]
fn end_of_input() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "1", 1);

    assert!(token.is_end());
    assert!(token.is_empty());
    assert_eq!(token.lookahead_end, 2);
}

#[test]
fn terminal_outside_valid_set_lexes_in_error_mode() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "+1", 0);

    assert_eq!(table.symbol_name(token.symbol), "+");
    assert_eq!(token.lex_mode, LexModeId::ERROR);
    assert!(!token.is_error);
}

#[test]
fn unmatchable_run_becomes_error_token() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "@@ 1", 0);

    assert!(token.is_error);
    assert_eq!(token.symbol, SymbolId::ERROR);
    assert_eq!(token.byte_range(), 0..2);
}

#[test]
fn error_token_ends_on_char_boundary() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "é1", 0);

    assert!(token.is_error);
    assert_eq!(token.byte_range(), 0..2);
}

#[test]
fn error_token_runs_to_end_of_input() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "1 ??", 2);

    assert!(token.is_error);
    assert_eq!(token.byte_range(), 2..4);
    assert_eq!(token.lookahead_end, 5);
}

#[test]
fn immediate_token_needs_immediate_position() {
    let table = compile_ok(&gloss_grammar());
    let escape = terminal(&table, "escape_sequence");

    let token = lex_with(&table, r"\n", 0, &[escape], true);
    assert_eq!(token.symbol, escape);
    assert_eq!(token.len(), 2);

    let token = lex_with(&table, r"\n", 0, &[escape], false);
    assert_ne!(token.symbol, escape);
}

#[test]
fn error_mode_skips_immediate_tokens() {
    let table = compile_ok(&gloss_grammar());
    let content = terminal(&table, "string_content");
    let semicolon = terminal(&table, ";");

    // Nothing valid matches, so every terminal is tried. `string_content`
    // would swallow the whole line.
    let token = lex_with(&table, "1;", 0, &[semicolon], true);
    assert_eq!(token.lex_mode, LexModeId::ERROR);
    assert_ne!(token.symbol, content);
    assert_eq!(table.symbol_name(token.symbol), "number");
    assert_eq!(token.byte_range(), 0..1);
    assert!(!token.immediate_ok);
}

#[test]
fn lexical_precedence_beats_length() {
    let table = compile_ok(&gloss_grammar());
    let content = terminal(&table, "string_content");
    let space = whitespace(&table);

    let token = lex_with(&table, " ab\"", 0, &[space, content], true);
    assert_eq!(token.symbol, content);
    assert_eq!(token.byte_range(), 0..3);
}

#[test]
fn string_wins_length_tie_against_pattern() {
    let table = compile_ok(&gloss_grammar());
    let keyword = terminal(&table, "let");
    let identifier = terminal(&table, "identifier");

    let token = lex_with(&table, "let x", 0, &[identifier, keyword], true);
    assert_eq!(token.symbol, keyword);

    let token = lex_with(&table, "letter", 0, &[identifier, keyword], true);
    assert_eq!(token.symbol, identifier);
    assert_eq!(token.len(), 6);
}

#[test]
fn reserved_word_is_relabelled() {
    let table = compile_ok(&gloss_grammar());
    let keyword = terminal(&table, "let");
    let identifier = terminal(&table, "identifier");

    let token = lex_with(&table, "let", 0, &[identifier], true);
    assert_eq!(token.symbol, keyword);

    let token = lex_with(&table, "lets", 0, &[identifier], true);
    assert_eq!(token.symbol, identifier);
}

#[test]
fn comment_beats_division() {
    let table = compile_ok(&gloss_grammar());
    let slash = terminal(&table, "/");
    let comment = terminal(&table, "comment");

    let token = lex_with(&table, "// note\nx", 0, &[slash, comment], true);
    assert_eq!(token.symbol, comment);
    assert_eq!(token.byte_range(), 0..7);
    assert!(token.is_extra);
}

#[test]
fn external_scanner_runs_first_and_saves_state() {
    let table = compile_ok(&raw_grammar());
    let raw = terminal(&table, "raw");
    let mut scanner = PercentScanner::default();
    let state = ScannerState::default();
    let valid = [raw];
    let request = LexRequest {
        valid: &valid,
        mode: LexModeId(0),
        immediate_ok: true,
        scanner_state: &state,
    };

    let token = Lexer::new(&table, "%ab% x")
        .with_scanner(&mut scanner)
        .lex(0, &request);

    assert_eq!(token.symbol, raw);
    assert_eq!(token.byte_range(), 0..4);
    assert_eq!(token.lookahead_end, 5);
    assert!(token.scanner_before.is_empty());
    assert_eq!(token.scanner_after.as_bytes(), &[1]);
}

#[test]
fn declined_external_falls_back_to_table() {
    let table = compile_ok(&raw_grammar());
    let raw = terminal(&table, "raw");
    let word = terminal(&table, "word");
    let mut scanner = PercentScanner::default();
    let state = ScannerState::new(vec![3]);
    let valid = [raw, word];
    let request = LexRequest {
        valid: &valid,
        mode: LexModeId(0),
        immediate_ok: true,
        scanner_state: &state,
    };

    let token = Lexer::new(&table, "abc %")
        .with_scanner(&mut scanner)
        .lex(0, &request);

    assert_eq!(token.symbol, word);
    assert_eq!(token.scanner_after.as_bytes(), &[3]);
    assert_eq!(scanner.seen, 3);
}

#[test]
fn unterminated_external_is_an_error() {
    let table = compile_ok(&raw_grammar());
    let raw = terminal(&table, "raw");
    let mut scanner = PercentScanner::default();
    let state = ScannerState::default();
    let valid = [raw];
    let request = LexRequest {
        valid: &valid,
        mode: LexModeId(0),
        immediate_ok: true,
        scanner_state: &state,
    };

    let token = Lexer::new(&table, "%ab")
        .with_scanner(&mut scanner)
        .lex(0, &request);

    assert!(token.is_error);
    assert_eq!(token.byte_range(), 0..1);
}

#[test]
fn points_track_lines() {
    let table = compile_ok(&calc_grammar());
    let token = lex_initial(&table, "1\n 23", 3);

    assert_eq!(token.start_point, crate::tree::Point::new(1, 1));
}
