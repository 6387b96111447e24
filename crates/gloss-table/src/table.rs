//! The compiled, immutable parse table.

use std::collections::HashMap;

use regex_automata::dfa::sparse;
use serde::{Deserialize, Serialize};

use crate::lex::{self, LexMatch, LexRule};
use crate::symbol::{
    FieldId, LexModeId, ProductionId, StateId, SymbolId, SymbolInfo,
};
use crate::TableFormatError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseAction {
    Shift { state: StateId },
    /// Shift an extra without changing state.
    ShiftExtra,
    Reduce { production: ProductionId },
    Accept,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Associativity {
    Left,
    Right,
}

/// Rename applied to a child in its production position.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub named: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductionStep {
    pub symbol: SymbolId,
    pub precedence: Option<i32>,
    pub associativity: Option<Associativity>,
    pub field: Option<FieldId>,
    pub alias: Option<Alias>,
}

impl ProductionStep {
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            precedence: None,
            associativity: None,
            field: None,
            alias: None,
        }
    }
}

/// A flattened rule alternative.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    pub steps: Vec<ProductionStep>,
    pub dynamic_precedence: i32,
}

impl Production {
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn field(&self, step: usize) -> Option<FieldId> {
        self.steps.get(step).and_then(|s| s.field)
    }

    pub fn alias(&self, step: usize) -> Option<&Alias> {
        self.steps.get(step).and_then(|s| s.alias.as_ref())
    }

    /// Precedence used when this production is reduced.
    pub fn precedence(&self) -> Option<i32> {
        self.steps.last().and_then(|s| s.precedence)
    }

    pub fn associativity(&self) -> Option<Associativity> {
        self.steps.last().and_then(|s| s.associativity)
    }
}

/// A conflict that was declared in the grammar and kept for runtime forking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub state: StateId,
    pub lookahead: SymbolId,
    pub rules: Vec<String>,
    pub actions: Vec<ParseAction>,
}

/// Serialized portion of the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TableData {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    pub terminal_count: u16,
    pub start_symbol: SymbolId,
    pub productions: Vec<Production>,
    pub fields: Vec<String>,
    pub state_count: u16,
    /// `state * terminal_count + terminal`
    pub actions: Vec<Vec<ParseAction>>,
    /// `state * nonterminal_count + (symbol - terminal_count)`
    pub gotos: Vec<Option<StateId>>,
    pub state_lex_modes: Vec<LexModeId>,
    pub lex_modes: Vec<Vec<SymbolId>>,
    pub lex_rules: Vec<LexRule>,
    pub extras: Vec<SymbolId>,
    pub externals: Vec<SymbolId>,
    pub reserved_words: Vec<(String, SymbolId)>,
    pub keyword_sources: Vec<SymbolId>,
    pub conflicts: Vec<ConflictInfo>,
}

/// Read-only map from (state, symbol) to actions, plus everything the lexer
/// needs. Shared between parses via `Arc`.
pub struct GrammarTable {
    pub(crate) data: TableData,
    dfas: Vec<sparse::DFA<Vec<u8>>>,
    terminal_rules: Vec<Vec<u16>>,
    all_terminals: Vec<SymbolId>,
    reserved: HashMap<String, SymbolId>,
    error_symbol: SymbolInfo,
}

impl std::fmt::Debug for GrammarTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarTable")
            .field("name", &self.data.name)
            .field("symbols", &self.data.symbols.len())
            .field("states", &self.data.state_count)
            .field("productions", &self.data.productions.len())
            .field("lex_rules", &self.data.lex_rules.len())
            .finish()
    }
}

impl PartialEq for GrammarTable {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

const NO_ACTIONS: &[ParseAction] = &[];

impl GrammarTable {
    pub(crate) fn from_data(data: TableData) -> Result<Self, TableFormatError> {
        let dfas = data
            .lex_rules
            .iter()
            .map(|rule| {
                lex::load_dfa(&rule.dfa).map_err(|message| TableFormatError::Dfa {
                    terminal: rule.terminal.0,
                    message,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut terminal_rules = vec![Vec::new(); data.terminal_count as usize];
        for (i, rule) in data.lex_rules.iter().enumerate() {
            if let Some(slot) = terminal_rules.get_mut(rule.terminal.index()) {
                slot.push(i as u16);
            }
        }

        let all_terminals = (1..data.terminal_count).map(SymbolId).collect();
        let reserved = data.reserved_words.iter().cloned().collect();

        Ok(Self {
            data,
            dfas,
            terminal_rules,
            all_terminals,
            reserved,
            error_symbol: SymbolInfo::error(),
        })
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    #[inline]
    pub fn initial_state(&self) -> StateId {
        StateId(0)
    }

    pub fn start_symbol(&self) -> SymbolId {
        self.data.start_symbol
    }

    /// Actions for `terminal` in `state`. Empty means a syntax error.
    pub fn actions(&self, state: StateId, terminal: SymbolId) -> &[ParseAction] {
        let t = self.data.terminal_count as usize;
        if terminal.index() >= t || state.index() >= self.data.state_count as usize {
            return NO_ACTIONS;
        }
        &self.data.actions[state.index() * t + terminal.index()]
    }

    pub fn goto(&self, state: StateId, nonterminal: SymbolId) -> Option<StateId> {
        let t = self.data.terminal_count as usize;
        let nt = self.nonterminal_count();
        let column = nonterminal.index().checked_sub(t)?;
        if column >= nt || state.index() >= self.data.state_count as usize {
            return None;
        }
        self.data.gotos[state.index() * nt + column]
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolInfo {
        self.data
            .symbols
            .get(id.index())
            .unwrap_or(&self.error_symbol)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        &self.symbol(id).name
    }

    /// First symbol with this name and namedness.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SymbolId> {
        if named && name == "ERROR" {
            return Some(SymbolId::ERROR);
        }
        self.data
            .symbols
            .iter()
            .position(|s| s.name == name && s.named == named)
            .map(|i| SymbolId(i as u16))
    }

    #[inline]
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id.index() < self.data.terminal_count as usize
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.data.productions[id.index()]
    }

    pub fn production_count(&self) -> usize {
        self.data.productions.len()
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        &self.data.fields[id.index()]
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.data
            .fields
            .iter()
            .position(|f| f == name)
            .map(|i| FieldId(i as u16))
    }

    pub fn field_count(&self) -> usize {
        self.data.fields.len()
    }

    pub fn lex_mode(&self, state: StateId) -> LexModeId {
        self.data.state_lex_modes[state.index()]
    }

    /// Terminals valid in `mode`. The error mode yields every terminal.
    pub fn lex_mode_terminals(&self, mode: LexModeId) -> &[SymbolId] {
        self.data
            .lex_modes
            .get(mode.index())
            .map(Vec::as_slice)
            .unwrap_or(&self.all_terminals)
    }

    pub fn lex_mode_count(&self) -> usize {
        self.data.lex_modes.len()
    }

    #[inline]
    pub fn terminal_count(&self) -> usize {
        self.data.terminal_count as usize
    }

    #[inline]
    pub fn nonterminal_count(&self) -> usize {
        self.data.symbols.len() - self.data.terminal_count as usize
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.data.state_count as usize
    }

    #[inline]
    pub fn symbol_count(&self) -> usize {
        self.data.symbols.len()
    }

    pub fn extras(&self) -> &[SymbolId] {
        &self.data.extras
    }

    pub fn externals(&self) -> &[SymbolId] {
        &self.data.externals
    }

    pub fn external_index(&self, terminal: SymbolId) -> Option<usize> {
        self.data.externals.iter().position(|&s| s == terminal)
    }

    pub fn lex_rules(&self) -> &[LexRule] {
        &self.data.lex_rules
    }

    /// Indices into [`lex_rules`](Self::lex_rules) that produce `terminal`.
    pub fn lex_rules_for(&self, terminal: SymbolId) -> &[u16] {
        self.terminal_rules
            .get(terminal.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Longest match of lexical rule `rule` anchored at `pos`.
    pub fn match_rule(&self, rule: u16, bytes: &[u8], pos: usize) -> LexMatch {
        lex::longest_match(&self.dfas[rule as usize], bytes, pos)
    }

    /// The keyword terminal `text` is re-labelled to when lexed as `terminal`.
    pub fn reserved_keyword(&self, terminal: SymbolId, text: &str) -> Option<SymbolId> {
        if !self.data.keyword_sources.contains(&terminal) {
            return None;
        }
        self.reserved.get(text).copied()
    }

    /// Declared conflicts that survived into the table as multiple actions.
    pub fn conflicts(&self) -> &[ConflictInfo] {
        &self.data.conflicts
    }

    /// Every terminal except `END`.
    pub fn all_terminals(&self) -> &[SymbolId] {
        &self.all_terminals
    }
}
