//! Rule flattening: nested rule trees become lists of productions.

use std::collections::HashMap;

use gloss_core::{Grammar, Interner, Rule};

use super::extract::Lexicon;
use super::precedence::PrecedenceTable;
use crate::GrammarError;
use crate::lex::PrecedenceLookup;
use crate::symbol::{FieldId, SymbolId, SymbolInfo, SymbolKind};
use crate::table::{Alias, Associativity, Production, ProductionStep};

#[derive(Debug)]
pub(crate) struct Flattened {
    /// Nonterminals in id order: grammar rules first, then auxiliaries.
    pub symbols: Vec<SymbolInfo>,
    pub productions: Vec<Production>,
    pub fields: Vec<String>,
    /// Auxiliary nonterminal to the grammar rule it was generated from.
    pub origins: HashMap<SymbolId, SymbolId>,
    pub start: SymbolId,
    pub conflicts: Vec<Vec<SymbolId>>,
}

/// Annotations inherited by every step of a subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
struct StepMeta {
    precedence: Option<i32>,
    associativity: Option<Associativity>,
    field: Option<FieldId>,
    alias: Option<Alias>,
}

impl StepMeta {
    fn step(&self, symbol: SymbolId) -> ProductionStep {
        ProductionStep {
            symbol,
            precedence: self.precedence,
            associativity: self.associativity,
            field: self.field,
            alias: self.alias.clone(),
        }
    }

    fn precedence_only(&self) -> StepMeta {
        StepMeta {
            precedence: self.precedence,
            associativity: self.associativity,
            field: None,
            alias: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Alt {
    steps: Vec<ProductionStep>,
    dynamic_precedence: i32,
}

impl Alt {
    fn single(step: ProductionStep) -> Self {
        Self {
            steps: vec![step],
            dynamic_precedence: 0,
        }
    }

    fn concat(&self, other: &Alt) -> Alt {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Alt {
            steps,
            dynamic_precedence: stronger(self.dynamic_precedence, other.dynamic_precedence),
        }
    }
}

fn stronger(a: i32, b: i32) -> i32 {
    if b.abs() > a.abs() { b } else { a }
}

pub(super) fn flatten(
    grammar: &Grammar,
    lexicon: &Lexicon,
    precs: &PrecedenceTable,
) -> Result<Flattened, GrammarError> {
    let terminal_count = lexicon.terminal_count();
    let mut rule_ids = HashMap::new();
    let mut symbols = Vec::new();

    for (name, _) in &grammar.rules {
        if lexicon.named.contains_key(name) || rule_ids.contains_key(name.as_str()) {
            continue;
        }
        let id = terminal_count + symbols.len();
        if id >= u16::MAX as usize - 1 {
            return Err(GrammarError::TooManySymbols(id + 1));
        }
        rule_ids.insert(name.as_str(), SymbolId(id as u16));
        symbols.push(SymbolInfo {
            name: name.clone(),
            kind: SymbolKind::NonTerminal,
            visible: !is_hidden(grammar, name),
            named: true,
            extra: false,
            external: false,
            recovery: false,
        });
    }

    let named_count = symbols.len();
    let mut flattener = Flattener {
        lexicon,
        precs,
        rule_ids,
        terminal_count,
        named_count,
        symbols,
        productions: Vec::new(),
        fields: Interner::new(),
        repeats: HashMap::new(),
        origins: HashMap::new(),
        current_rule: String::new(),
        current_id: SymbolId::END,
        aux_counter: 0,
    };

    for (name, body) in &grammar.rules {
        let Some(&lhs) = flattener.rule_ids.get(name.as_str()) else {
            continue;
        };
        flattener.current_rule = name.clone();
        flattener.current_id = lhs;
        flattener.aux_counter = 0;

        let meta = StepMeta {
            precedence: precs.rule_level(name),
            ..StepMeta::default()
        };
        let alts = flattener.flatten(body, &meta)?;
        flattener.push_productions(lhs, alts);
    }

    let start = flattener
        .rule_ids
        .get(grammar.rules[0].0.as_str())
        .copied()
        .ok_or(GrammarError::NoRules)?;

    let conflicts = grammar
        .conflicts
        .iter()
        .map(|names| {
            names
                .iter()
                .filter_map(|n| flattener.rule_ids.get(n.as_str()).copied())
                .collect()
        })
        .collect();

    Ok(Flattened {
        symbols: flattener.symbols,
        productions: flattener.productions,
        fields: flattener.fields.into_strings(),
        origins: flattener.origins,
        start,
        conflicts,
    })
}

fn is_hidden(grammar: &Grammar, name: &str) -> bool {
    name.starts_with('_')
        || grammar.inline.iter().any(|n| n == name)
        || grammar.supertypes.iter().any(|n| n == name)
}

/// A rule that maps to exactly one step.
fn is_single_step(rule: &Rule) -> bool {
    matches!(
        rule,
        Rule::Symbol(_)
            | Rule::String(_)
            | Rule::Pattern { .. }
            | Rule::Token(_)
            | Rule::ImmediateToken(_)
    )
}

struct Flattener<'g> {
    lexicon: &'g Lexicon,
    precs: &'g PrecedenceTable,
    rule_ids: HashMap<&'g str, SymbolId>,
    terminal_count: usize,
    named_count: usize,
    symbols: Vec<SymbolInfo>,
    productions: Vec<Production>,
    fields: Interner,
    repeats: HashMap<(Rule, StepMeta), SymbolId>,
    origins: HashMap<SymbolId, SymbolId>,
    current_rule: String,
    current_id: SymbolId,
    aux_counter: usize,
}

impl Flattener<'_> {
    fn flatten(&mut self, rule: &Rule, meta: &StepMeta) -> Result<Vec<Alt>, GrammarError> {
        match rule {
            Rule::Blank => Ok(vec![Alt::default()]),
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                let symbol = self.lexicon.unit(rule).ok_or_else(|| {
                    GrammarError::UndefinedSymbol {
                        name: format!("{rule:?}"),
                        rule: self.current_rule.clone(),
                    }
                })?;
                Ok(vec![Alt::single(meta.step(symbol))])
            }
            Rule::Symbol(name) => {
                let symbol = self.resolve(name)?;
                Ok(vec![Alt::single(meta.step(symbol))])
            }
            Rule::Seq(members) => {
                let mut acc = vec![Alt::default()];
                for member in members {
                    let alts = self.flatten(member, meta)?;
                    let mut next = Vec::with_capacity(acc.len() * alts.len());
                    for prefix in &acc {
                        for suffix in &alts {
                            next.push(prefix.concat(suffix));
                        }
                    }
                    acc = next;
                }
                Ok(acc)
            }
            Rule::Choice(members) => {
                let mut out = Vec::new();
                for member in members {
                    out.extend(self.flatten(member, meta)?);
                }
                Ok(out)
            }
            Rule::Repeat(content) => {
                let aux = self.repeat_aux(content, meta)?;
                let step = meta.precedence_only().step(aux);
                Ok(vec![Alt::single(step), Alt::default()])
            }
            Rule::Repeat1(content) => {
                let aux = self.repeat_aux(content, meta)?;
                Ok(vec![Alt::single(meta.precedence_only().step(aux))])
            }
            Rule::Field { name, content } => {
                let field = self.fields.intern(name);
                let meta = StepMeta {
                    field: Some(FieldId(field.as_u32() as u16)),
                    ..meta.clone()
                };
                self.flatten(content, &meta)
            }
            Rule::Alias {
                content,
                value,
                named,
            } => {
                let alias = Alias {
                    name: value.clone(),
                    named: *named,
                };
                let with_alias = StepMeta {
                    alias: Some(alias),
                    ..meta.clone()
                };
                if is_single_step(content) {
                    return self.flatten(content, &with_alias);
                }
                let aux = self.new_aux("alias")?;
                let alts = self.flatten(content, &meta.precedence_only())?;
                self.push_productions(aux, alts);
                Ok(vec![Alt::single(with_alias.step(aux))])
            }
            Rule::Prec { value, content } => self.with_precedence(value, None, content, meta),
            Rule::PrecLeft { value, content } => {
                self.with_precedence(value, Some(Associativity::Left), content, meta)
            }
            Rule::PrecRight { value, content } => {
                self.with_precedence(value, Some(Associativity::Right), content, meta)
            }
            Rule::PrecDynamic { value, content } => {
                let mut alts = self.flatten(content, meta)?;
                for alt in &mut alts {
                    alt.dynamic_precedence = stronger(*value, alt.dynamic_precedence);
                }
                Ok(alts)
            }
            Rule::Reserved { content, .. } => self.flatten(content, meta),
        }
    }

    fn with_precedence(
        &mut self,
        value: &gloss_core::Precedence,
        associativity: Option<Associativity>,
        content: &Rule,
        meta: &StepMeta,
    ) -> Result<Vec<Alt>, GrammarError> {
        let precedence = self.precs.resolve(value, &self.current_rule)?;
        let meta = StepMeta {
            precedence: Some(precedence),
            associativity,
            ..meta.clone()
        };
        self.flatten(content, &meta)
    }

    fn resolve(&self, name: &str) -> Result<SymbolId, GrammarError> {
        self.lexicon
            .named
            .get(name)
            .or_else(|| self.rule_ids.get(name))
            .copied()
            .ok_or_else(|| GrammarError::UndefinedSymbol {
                name: name.to_owned(),
                rule: self.current_rule.clone(),
            })
    }

    fn new_aux(&mut self, kind: &str) -> Result<SymbolId, GrammarError> {
        let id = self.terminal_count + self.symbols.len();
        if id >= u16::MAX as usize - 1 {
            return Err(GrammarError::TooManySymbols(id + 1));
        }
        debug_assert!(self.symbols.len() >= self.named_count);
        self.aux_counter += 1;
        self.symbols.push(SymbolInfo {
            name: format!("{}_{kind}{}", self.current_rule, self.aux_counter),
            kind: SymbolKind::Auxiliary,
            visible: false,
            named: false,
            extra: false,
            external: false,
            recovery: false,
        });
        let id = SymbolId(id as u16);
        self.origins.insert(id, self.current_id);
        Ok(id)
    }

    /// `aux -> aux x | x`, shared between identical repetitions.
    fn repeat_aux(&mut self, content: &Rule, meta: &StepMeta) -> Result<SymbolId, GrammarError> {
        let key = (content.clone(), meta.clone());
        if let Some(&aux) = self.repeats.get(&key) {
            return Ok(aux);
        }

        let aux = self.new_aux("repeat")?;
        self.repeats.insert(key, aux);

        let items: Vec<Alt> = self
            .flatten(content, meta)?
            .into_iter()
            .filter(|alt| !alt.steps.is_empty())
            .collect();

        let recursive = meta.precedence_only().step(aux);
        let mut alts = Vec::with_capacity(items.len() * 2);
        for item in &items {
            alts.push(Alt::single(recursive.clone()).concat(item));
        }
        alts.extend(items);
        self.push_productions(aux, alts);
        Ok(aux)
    }

    fn push_productions(&mut self, lhs: SymbolId, alts: Vec<Alt>) {
        for alt in alts {
            let production = Production {
                lhs,
                steps: alt.steps,
                dynamic_precedence: alt.dynamic_precedence,
            };
            if !self.productions.contains(&production) {
                self.productions.push(production);
            }
        }
    }
}
