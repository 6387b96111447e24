//! Lexical rules: regex translation, DFA construction, and anchored matching.
//!
//! Each lexical rule compiles to an anchored, all-match sparse DFA. The lexer
//! steps it byte by byte to find the longest match and to record how far the
//! automaton looked before it died.

use regex_automata::dfa::{Automaton, StartKind, dense, sparse};
use regex_automata::{Anchored, Input, MatchKind};
use serde::{Deserialize, Serialize};

use gloss_core::Rule;

use crate::GrammarError;
use crate::symbol::SymbolId;

/// One way to lex a terminal. A terminal may have several rules when its
/// alternatives carry different lexical precedences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexRule {
    pub terminal: SymbolId,
    pub precedence: i32,
    /// Literal string token. Wins length ties against patterns.
    pub is_string: bool,
    /// Must not follow an extra.
    pub immediate: bool,
    pub pattern: String,
    pub(crate) dfa: Vec<u8>,
}

/// Result of running one lexical rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexMatch {
    /// Length of the longest match, if any.
    pub len: Option<usize>,
    /// One past the last byte the automaton examined. `bytes.len() + 1` when it
    /// looked at end of input.
    pub examined_end: usize,
}

/// A lexical unit split into its precedence-ranked regexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexicalAlternative {
    pub precedence: i32,
    pub regex: String,
    pub is_string: bool,
}

/// Precedence resolver handed in by the preparation pass.
pub(crate) trait PrecedenceLookup {
    fn resolve(&self, value: &gloss_core::Precedence, rule: &str) -> Result<i32, GrammarError>;
}

/// Split a token body into lexical alternatives.
///
/// A top-level `PREC` sets the precedence. A `CHOICE` whose alternatives carry
/// their own precedences yields one alternative per member.
pub(crate) fn alternatives(
    rule: &Rule,
    rule_name: &str,
    precs: &dyn PrecedenceLookup,
) -> Result<Vec<LexicalAlternative>, GrammarError> {
    split(rule, 0, rule_name, precs)
}

fn split(
    rule: &Rule,
    precedence: i32,
    rule_name: &str,
    precs: &dyn PrecedenceLookup,
) -> Result<Vec<LexicalAlternative>, GrammarError> {
    match rule {
        Rule::Prec { value, content }
        | Rule::PrecLeft { value, content }
        | Rule::PrecRight { value, content } => {
            let p = precs.resolve(value, rule_name)?;
            split(content, p, rule_name, precs)
        }
        Rule::Token(content) | Rule::ImmediateToken(content) => {
            split(content, precedence, rule_name, precs)
        }
        Rule::Reserved { content, .. } => split(content, precedence, rule_name, precs),
        Rule::Choice(members) if members.iter().any(has_top_precedence) => {
            let mut out = Vec::new();
            for member in members {
                out.extend(split(member, precedence, rule_name, precs)?);
            }
            Ok(out)
        }
        _ => Ok(vec![LexicalAlternative {
            precedence,
            regex: to_regex(rule, rule_name)?,
            is_string: matches!(rule, Rule::String(_)),
        }]),
    }
}

fn has_top_precedence(rule: &Rule) -> bool {
    matches!(
        rule,
        Rule::Prec { .. } | Rule::PrecLeft { .. } | Rule::PrecRight { .. }
    )
}

/// Translate a token body into `regex-syntax` source.
pub(crate) fn to_regex(rule: &Rule, rule_name: &str) -> Result<String, GrammarError> {
    let mut out = String::new();
    write_regex(rule, rule_name, &mut out)?;
    Ok(out)
}

fn write_regex(rule: &Rule, rule_name: &str, out: &mut String) -> Result<(), GrammarError> {
    match rule {
        Rule::Blank => out.push_str("(?:)"),
        Rule::String(value) => out.push_str(&regex_syntax::escape(value)),
        Rule::Pattern { value, flags } => {
            let flags: String = flags
                .as_deref()
                .unwrap_or("")
                .chars()
                .filter(|c| matches!(c, 'i' | 's' | 'm'))
                .collect();
            if flags.is_empty() {
                out.push_str("(?:");
            } else {
                out.push_str("(?");
                out.push_str(&flags);
                out.push(':');
            }
            out.push_str(value);
            out.push(')');
        }
        Rule::Symbol(name) => {
            return Err(GrammarError::SymbolInToken {
                name: name.clone(),
                rule: rule_name.to_owned(),
            });
        }
        Rule::Seq(members) => {
            out.push_str("(?:");
            for member in members {
                write_regex(member, rule_name, out)?;
            }
            out.push(')');
        }
        Rule::Choice(members) => {
            out.push_str("(?:");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_regex(member, rule_name, out)?;
            }
            out.push(')');
        }
        Rule::Repeat(content) => {
            out.push_str("(?:");
            write_regex(content, rule_name, out)?;
            out.push_str(")*");
        }
        Rule::Repeat1(content) => {
            out.push_str("(?:");
            write_regex(content, rule_name, out)?;
            out.push_str(")+");
        }
        Rule::Field { content, .. }
        | Rule::Alias { content, .. }
        | Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. }
        | Rule::Reserved { content, .. } => write_regex(content, rule_name, out)?,
    }
    Ok(())
}

/// Compile a regex into serialized sparse DFA bytes.
///
/// Fails with `EmptyToken` when the regex accepts the empty string.
pub(crate) fn compile_dfa(regex: &str, token_name: &str) -> Result<Vec<u8>, GrammarError> {
    let regex_error = |message: String| GrammarError::Regex {
        pattern: regex.to_owned(),
        message,
    };

    let dense = dense::DFA::builder()
        .configure(
            dense::DFA::config()
                .start_kind(StartKind::Anchored)
                .match_kind(MatchKind::All)
                .minimize(false),
        )
        .build(regex)
        .map_err(|e| regex_error(e.to_string()))?;

    let sparse = dense.to_sparse().map_err(|e| regex_error(e.to_string()))?;

    if matches_empty(&sparse) {
        return Err(GrammarError::EmptyToken {
            name: token_name.to_owned(),
        });
    }

    Ok(sparse.to_bytes_little_endian())
}

fn matches_empty<A: Automaton>(dfa: &A) -> bool {
    let input = Input::new("").anchored(Anchored::Yes);
    let Ok(start) = dfa.start_state_forward(&input) else {
        return false;
    };
    dfa.is_match_state(dfa.next_eoi_state(start))
}

pub(crate) fn load_dfa(bytes: &[u8]) -> Result<sparse::DFA<Vec<u8>>, String> {
    sparse::DFA::from_bytes(bytes)
        .map(|(dfa, _)| dfa.to_owned())
        .map_err(|e| e.to_string())
}

/// Step `dfa` from `pos` and report the longest match plus the examined extent.
pub(crate) fn longest_match<A: Automaton>(dfa: &A, bytes: &[u8], pos: usize) -> LexMatch {
    let rest = &bytes[pos.min(bytes.len())..];
    let input = Input::new(rest).anchored(Anchored::Yes);
    let Ok(mut state) = dfa.start_state_forward(&input) else {
        return LexMatch {
            len: None,
            examined_end: pos,
        };
    };

    let mut len = None;
    let mut examined_end = pos;

    for (i, &byte) in rest.iter().enumerate() {
        state = dfa.next_state(state, byte);
        examined_end = pos + i + 1;
        // Matches are reported one byte late.
        if dfa.is_match_state(state) {
            len = Some(i);
        }
        if dfa.is_dead_state(state) || dfa.is_quit_state(state) {
            return LexMatch { len, examined_end };
        }
    }

    state = dfa.next_eoi_state(state);
    if dfa.is_match_state(state) {
        len = Some(rest.len());
    }
    LexMatch {
        len,
        examined_end: bytes.len() + 1,
    }
}
