//! Token extraction.
//!
//! Decides which grammar fragments become terminals, assigns terminal ids in
//! grammar order, and compiles their lexical rules.

use std::collections::{HashMap, HashSet};

use gloss_core::{Grammar, Rule};

use super::precedence::PrecedenceTable;
use crate::GrammarError;
use crate::lex::{self, LexRule};
use crate::symbol::{SymbolId, SymbolInfo, SymbolKind};

/// Terminals of a grammar and how to lex them.
#[derive(Debug)]
pub(crate) struct Lexicon {
    /// Index is the terminal id. Entry 0 is `END`.
    pub symbols: Vec<SymbolInfo>,
    pub lex_rules: Vec<LexRule>,
    units: HashMap<Rule, SymbolId>,
    /// Rules turned into terminals, plus named externals.
    pub named: HashMap<String, SymbolId>,
    pub extras: Vec<SymbolId>,
    pub externals: Vec<SymbolId>,
    pub reserved_words: Vec<(String, SymbolId)>,
    pub keyword_sources: Vec<SymbolId>,
}

impl Lexicon {
    /// Terminal for an anonymous lexical fragment.
    pub fn unit(&self, rule: &Rule) -> Option<SymbolId> {
        self.units.get(rule).copied()
    }

    pub fn terminal_count(&self) -> usize {
        self.symbols.len()
    }
}

pub(super) fn extract(grammar: &Grammar, precs: &PrecedenceTable) -> Result<Lexicon, GrammarError> {
    let external_names = external_names(grammar);
    let token_rules = token_rules(grammar, &external_names);

    let mut builder = LexiconBuilder {
        precs,
        lexicon: Lexicon {
            symbols: vec![SymbolInfo::end()],
            lex_rules: Vec::new(),
            units: HashMap::new(),
            named: HashMap::new(),
            extras: Vec::new(),
            externals: Vec::new(),
            reserved_words: Vec::new(),
            keyword_sources: Vec::new(),
        },
        token_counters: HashMap::new(),
    };

    builder.add_externals(grammar)?;

    for (i, (name, body)) in grammar.rules.iter().enumerate() {
        if external_names.contains(name.as_str()) {
            continue;
        }
        if token_rules.contains(&i) {
            builder.add_named(name, body)?;
            continue;
        }
        let mut units = Vec::new();
        collect_units(body, &mut units);
        for unit in units {
            builder.add_unit(unit, name)?;
        }
    }

    builder.add_extras(grammar)?;
    builder.add_reserved(grammar)?;

    Ok(builder.lexicon)
}

fn external_names(grammar: &Grammar) -> HashSet<&str> {
    grammar
        .externals
        .iter()
        .filter_map(|e| match e {
            Rule::Symbol(name) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

/// Rules whose whole body is a single token used nowhere else.
///
/// The start rule always stays a nonterminal. A body shared with another rule
/// or with an anonymous occurrence keeps both as nonterminals over one
/// anonymous terminal.
fn token_rules(grammar: &Grammar, external_names: &HashSet<&str>) -> HashSet<usize> {
    let mut candidates: HashSet<usize> = grammar
        .rules
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, (name, body))| !external_names.contains(name.as_str()) && body.is_lexical())
        .map(|(i, _)| i)
        .collect();

    loop {
        let mut counts: HashMap<&Rule, usize> = HashMap::new();
        for (i, (name, body)) in grammar.rules.iter().enumerate() {
            if external_names.contains(name.as_str()) {
                continue;
            }
            if candidates.contains(&i) {
                *counts.entry(body).or_default() += 1;
                continue;
            }
            let mut units = Vec::new();
            collect_units(body, &mut units);
            for unit in units {
                *counts.entry(unit).or_default() += 1;
            }
        }
        for extra in grammar.extras.iter().filter(|e| e.is_lexical()) {
            *counts.entry(extra).or_default() += 1;
        }

        let shared: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| counts.get(&grammar.rules[i].1).copied().unwrap_or(0) > 1)
            .collect();
        if shared.is_empty() {
            return candidates;
        }
        for i in shared {
            candidates.remove(&i);
        }
    }
}

/// Lexical fragments of a nonterminal body, in document order.
pub(super) fn collect_units<'a>(rule: &'a Rule, out: &mut Vec<&'a Rule>) {
    match rule {
        Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
            out.push(rule)
        }
        Rule::Seq(members) | Rule::Choice(members) => {
            for member in members {
                collect_units(member, out);
            }
        }
        _ => {
            if let Some(content) = rule.content() {
                collect_units(content, out);
            }
        }
    }
}

fn literal_text(rule: &Rule) -> Option<&str> {
    match rule {
        Rule::String(value) => Some(value),
        Rule::Token(content) | Rule::ImmediateToken(content) => literal_text(content),
        _ => None,
    }
}

fn is_immediate(rule: &Rule) -> bool {
    match rule {
        Rule::ImmediateToken(_) => true,
        Rule::Token(content)
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::Reserved { content, .. } => is_immediate(content),
        _ => false,
    }
}

struct LexiconBuilder<'g> {
    precs: &'g PrecedenceTable,
    lexicon: Lexicon,
    token_counters: HashMap<String, usize>,
}

impl LexiconBuilder<'_> {
    fn push_terminal(&mut self, info: SymbolInfo) -> Result<SymbolId, GrammarError> {
        let id = self.lexicon.symbols.len();
        if id >= u16::MAX as usize - 1 {
            return Err(GrammarError::TooManySymbols(id + 1));
        }
        self.lexicon.symbols.push(info);
        Ok(SymbolId(id as u16))
    }

    fn add_lex_rules(
        &mut self,
        terminal: SymbolId,
        body: &Rule,
        rule_name: &str,
    ) -> Result<(), GrammarError> {
        let immediate = is_immediate(body);
        for alt in lex::alternatives(body, rule_name, self.precs)? {
            let token_name = &self.lexicon.symbols[terminal.index()].name;
            let dfa = lex::compile_dfa(&alt.regex, token_name)?;
            self.lexicon.lex_rules.push(LexRule {
                terminal,
                precedence: alt.precedence,
                is_string: alt.is_string,
                immediate,
                pattern: alt.regex,
                dfa,
            });
        }
        Ok(())
    }

    fn add_externals(&mut self, grammar: &Grammar) -> Result<(), GrammarError> {
        for external in &grammar.externals {
            let id = match external {
                Rule::Symbol(name) => {
                    let id = self.push_terminal(SymbolInfo {
                        name: name.clone(),
                        kind: SymbolKind::Terminal,
                        visible: !name.starts_with('_'),
                        named: true,
                        extra: false,
                        external: true,
                        recovery: true,
                    })?;
                    self.lexicon.named.insert(name.clone(), id);
                    id
                }
                Rule::String(value) => {
                    let id = self.push_terminal(SymbolInfo {
                        name: value.clone(),
                        kind: SymbolKind::Terminal,
                        visible: true,
                        named: false,
                        extra: false,
                        external: true,
                        recovery: true,
                    })?;
                    self.lexicon.units.insert(external.clone(), id);
                    id
                }
                other => {
                    return Err(GrammarError::UnsupportedExternal {
                        found: other.kind().to_owned(),
                    });
                }
            };
            self.lexicon.externals.push(id);
        }
        Ok(())
    }

    fn add_named(&mut self, name: &str, body: &Rule) -> Result<SymbolId, GrammarError> {
        let id = self.push_terminal(SymbolInfo {
            name: name.to_owned(),
            kind: SymbolKind::Terminal,
            visible: !name.starts_with('_'),
            named: true,
            extra: false,
            external: false,
            recovery: true,
        })?;
        self.lexicon.named.insert(name.to_owned(), id);
        self.add_lex_rules(id, body, name)?;
        Ok(id)
    }

    fn add_unit(&mut self, unit: &Rule, rule_name: &str) -> Result<SymbolId, GrammarError> {
        if let Some(id) = self.lexicon.unit(unit) {
            return Ok(id);
        }

        let info = match literal_text(unit) {
            Some(text) => SymbolInfo {
                name: text.to_owned(),
                kind: SymbolKind::Terminal,
                visible: true,
                named: false,
                extra: false,
                external: false,
                recovery: true,
            },
            None => {
                let counter = self.token_counters.entry(rule_name.to_owned()).or_default();
                *counter += 1;
                SymbolInfo {
                    name: format!("{rule_name}_token{counter}"),
                    kind: SymbolKind::Terminal,
                    visible: false,
                    named: false,
                    extra: false,
                    external: false,
                    recovery: true,
                }
            }
        };

        let id = self.push_terminal(info)?;
        self.lexicon.units.insert(unit.clone(), id);
        self.add_lex_rules(id, unit, rule_name)?;
        Ok(id)
    }

    fn add_extras(&mut self, grammar: &Grammar) -> Result<(), GrammarError> {
        for extra in &grammar.extras {
            let id = match extra {
                Rule::Symbol(name) => self.lexicon.named.get(name).copied().ok_or_else(|| {
                    GrammarError::UnsupportedExtra { name: name.clone() }
                })?,
                rule => self.add_unit(rule, "extra")?,
            };
            let info = &mut self.lexicon.symbols[id.index()];
            info.extra = true;
            info.recovery = false;
            if !self.lexicon.extras.contains(&id) {
                self.lexicon.extras.push(id);
            }
        }
        Ok(())
    }

    /// The first reserved set applies everywhere.
    fn add_reserved(&mut self, grammar: &Grammar) -> Result<(), GrammarError> {
        let Some((_, words)) = grammar.reserved.first() else {
            return Ok(());
        };

        for word in words {
            if let Some(text) = literal_text(word) {
                let id = self.add_unit(word, "reserved")?;
                self.lexicon.reserved_words.push((text.to_owned(), id));
            }
        }

        self.lexicon.keyword_sources = match &grammar.word {
            Some(word) => self.lexicon.named.get(word).copied().into_iter().collect(),
            None => {
                let lexicon = &self.lexicon;
                let mut sources: Vec<SymbolId> = lexicon
                    .named
                    .values()
                    .copied()
                    .filter(|id| {
                        let info = &lexicon.symbols[id.index()];
                        !info.external
                            && lexicon
                                .lex_rules
                                .iter()
                                .any(|r| r.terminal == *id && !r.is_string)
                    })
                    .collect();
                sources.sort();
                sources
            }
        };
        Ok(())
    }
}
