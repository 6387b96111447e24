//! Context-aware lexing over a compiled table.
//!
//! The parser asks for one token at a time together with the set of
//! terminals its live stack versions can accept. The lexer tries the
//! external scanner first, then the table's DFAs, then every terminal, and
//! finally produces an error token. It never fails.

mod scanner;

#[cfg(test)]
mod lexer_tests;

use std::ops::Range;

use gloss_table::{GrammarTable, LexModeId, SymbolId};

use crate::tree::{LineIndex, Point};

pub use scanner::{ExternalScanner, ExternalToken, ScannerState};

/// A lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub symbol: SymbolId,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_point: Point,
    pub is_extra: bool,
    pub is_error: bool,
    /// Mode the token was lexed in. `LexModeId::ERROR` for error-mode tokens.
    pub lex_mode: LexModeId,
    /// Whether immediate tokens were allowed at this position.
    pub immediate_ok: bool,
    /// One past the last byte the lexer examined.
    pub lookahead_end: usize,
    pub scanner_before: ScannerState,
    pub scanner_after: ScannerState,
}

impl Token {
    #[inline]
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    pub fn is_end(&self) -> bool {
        self.symbol == SymbolId::END
    }
}

/// What the parser can accept at a position.
#[derive(Clone, Copy, Debug)]
pub struct LexRequest<'a> {
    pub valid: &'a [SymbolId],
    pub mode: LexModeId,
    pub immediate_ok: bool,
    pub scanner_state: &'a ScannerState,
}

/// Everything needed to resume lexing at a token boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexSnapshot {
    pub position: usize,
    pub mode: LexModeId,
    pub immediate_ok: bool,
    pub scanner_state: ScannerState,
}

impl LexSnapshot {
    pub fn start() -> Self {
        Self {
            position: 0,
            mode: LexModeId(0),
            immediate_ok: true,
            scanner_state: ScannerState::default(),
        }
    }

    pub fn request<'a>(&'a self, valid: &'a [SymbolId]) -> LexRequest<'a> {
        LexRequest {
            valid,
            mode: self.mode,
            immediate_ok: self.immediate_ok,
            scanner_state: &self.scanner_state,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    terminal: SymbolId,
    rule: u16,
    precedence: i32,
    len: usize,
    is_string: bool,
}

impl Candidate {
    /// Precedence, then length, then strings over patterns, then definition order.
    fn beats(&self, other: &Candidate) -> bool {
        (self.precedence, self.len, self.is_string, std::cmp::Reverse(self.rule))
            > (
                other.precedence,
                other.len,
                other.is_string,
                std::cmp::Reverse(other.rule),
            )
    }
}

pub struct Lexer<'a> {
    table: &'a GrammarTable,
    text: &'a str,
    lines: LineIndex,
    scanner: Option<&'a mut dyn ExternalScanner>,
}

impl<'a> Lexer<'a> {
    pub fn new(table: &'a GrammarTable, text: &'a str) -> Self {
        Self {
            table,
            text,
            lines: LineIndex::new(text),
            scanner: None,
        }
    }

    pub fn with_scanner(mut self, scanner: &'a mut dyn ExternalScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn point(&self, offset: usize) -> Point {
        self.lines.point(offset)
    }

    /// Lex one token at `position`.
    ///
    /// End of input yields a zero-width `END` token. When no valid terminal
    /// matches, every terminal except immediate tokens is tried; when nothing
    /// matches at all, the unmatchable run becomes an error token.
    pub fn lex(&mut self, position: usize, request: &LexRequest<'_>) -> Token {
        let len = self.text.len();
        if position >= len {
            return Token {
                symbol: SymbolId::END,
                start_byte: len,
                end_byte: len,
                start_point: self.point(len),
                is_extra: false,
                is_error: false,
                lex_mode: request.mode,
                immediate_ok: request.immediate_ok,
                lookahead_end: len + 1,
                scanner_before: request.scanner_state.clone(),
                scanner_after: request.scanner_state.clone(),
            };
        }

        let mut examined = position;
        if let Some(token) = self.lex_terminals(position, request, request.valid, &mut examined) {
            return token;
        }

        let error_mode = LexRequest {
            mode: LexModeId::ERROR,
            immediate_ok: false,
            ..*request
        };
        let all = self.table.all_terminals();
        if let Some(token) = self.lex_terminals(position, &error_mode, all, &mut examined) {
            return token;
        }

        self.error_token(position, request, examined)
    }

    fn lex_terminals(
        &mut self,
        position: usize,
        request: &LexRequest<'_>,
        valid: &[SymbolId],
        examined: &mut usize,
    ) -> Option<Token> {
        if let Some(token) = self.scan_external(position, request, valid) {
            return Some(token);
        }

        let bytes = self.text.as_bytes();
        let rules = self.table.lex_rules();
        let mut best: Option<Candidate> = None;
        for &terminal in valid {
            for &index in self.table.lex_rules_for(terminal) {
                let rule = &rules[index as usize];
                if rule.immediate && !request.immediate_ok {
                    continue;
                }
                let found = self.table.match_rule(index, bytes, position);
                *examined = (*examined).max(found.examined_end);
                let Some(len) = found.len.filter(|&len| len > 0) else {
                    continue;
                };
                if !self.text.is_char_boundary(position + len) {
                    continue;
                }
                let candidate = Candidate {
                    terminal,
                    rule: index,
                    precedence: rule.precedence,
                    len,
                    is_string: rule.is_string,
                };
                if best.is_none_or(|b| candidate.beats(&b)) {
                    best = Some(candidate);
                }
            }
        }

        let best = best?;
        let end = position + best.len;
        let symbol = self
            .table
            .reserved_keyword(best.terminal, &self.text[position..end])
            .unwrap_or(best.terminal);
        Some(Token {
            symbol,
            start_byte: position,
            end_byte: end,
            start_point: self.point(position),
            is_extra: self.table.symbol(symbol).extra,
            is_error: false,
            lex_mode: request.mode,
            immediate_ok: request.immediate_ok,
            lookahead_end: *examined,
            scanner_before: request.scanner_state.clone(),
            scanner_after: request.scanner_state.clone(),
        })
    }

    fn scan_external(
        &mut self,
        position: usize,
        request: &LexRequest<'_>,
        valid: &[SymbolId],
    ) -> Option<Token> {
        let scanner = self.scanner.as_deref_mut()?;
        let externals = self.table.externals();
        let flags: Vec<bool> = externals.iter().map(|e| valid.contains(e)).collect();
        if !flags.iter().any(|&f| f) {
            return None;
        }

        scanner.deserialize(request.scanner_state.as_bytes());
        let saved = scanner.serialize();
        let len = self.text.len();
        let accepted = scanner.scan(self.text.as_bytes(), position, &flags).filter(|t| {
            t.len > 0
                && flags.get(t.index).copied().unwrap_or(false)
                && position + t.len <= len
                && self.text.is_char_boundary(position + t.len)
        });
        let Some(found) = accepted else {
            scanner.deserialize(&saved);
            return None;
        };

        let end = position + found.len;
        let symbol = externals[found.index];
        Some(Token {
            symbol,
            start_byte: position,
            end_byte: end,
            start_point: self.lines.point(position),
            is_extra: self.table.symbol(symbol).extra,
            is_error: false,
            lex_mode: request.mode,
            immediate_ok: request.immediate_ok,
            lookahead_end: (end + 1).min(len + 1),
            scanner_before: request.scanner_state.clone(),
            scanner_after: ScannerState::new(scanner.serialize()),
        })
    }

    /// Error token from `position` up to the next position where any
    /// terminal matches.
    fn error_token(&mut self, position: usize, request: &LexRequest<'_>, examined: usize) -> Token {
        let bytes = self.text.as_bytes();
        let rules = self.table.lex_rules();
        let mut examined = examined;
        let mut end = position;

        for (offset, ch) in self.text[position..].char_indices() {
            end = position + offset + ch.len_utf8();
            if end >= bytes.len() {
                break;
            }
            let mut matched = false;
            for index in 0..rules.len() as u16 {
                let found = self.table.match_rule(index, bytes, end);
                examined = examined.max(found.examined_end);
                if found.len.is_some_and(|len| len > 0) {
                    matched = true;
                    break;
                }
            }
            if matched {
                break;
            }
        }

        Token {
            symbol: SymbolId::ERROR,
            start_byte: position,
            end_byte: end,
            start_point: self.point(position),
            is_extra: false,
            is_error: true,
            lex_mode: LexModeId::ERROR,
            immediate_ok: request.immediate_ok,
            lookahead_end: examined.max(end + 1).min(bytes.len() + 1),
            scanner_before: request.scanner_state.clone(),
            scanner_after: request.scanner_state.clone(),
        }
    }
}
