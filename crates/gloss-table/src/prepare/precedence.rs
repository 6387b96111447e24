//! Named precedence resolution.
//!
//! Each ordering in `precedences` is listed highest first. A name takes the
//! rank it has in the first ordering that mentions it, so `[call, member]`
//! gives `call = 2` and `member = 1`.

use std::collections::HashMap;

use gloss_core::{Grammar, Precedence, PrecedenceEntry};

use crate::GrammarError;
use crate::lex::PrecedenceLookup;

#[derive(Debug, Default)]
pub(crate) struct PrecedenceTable {
    levels: HashMap<String, i32>,
    rule_levels: HashMap<String, i32>,
}

impl PrecedenceTable {
    pub fn new(grammar: &Grammar) -> Self {
        let mut table = Self::default();
        for ordering in &grammar.precedences {
            let len = ordering.len() as i32;
            for (i, entry) in ordering.iter().enumerate() {
                let rank = len - i as i32;
                match entry {
                    PrecedenceEntry::Name(name) => {
                        table.levels.entry(name.clone()).or_insert(rank);
                    }
                    PrecedenceEntry::Symbol(name) => {
                        table.rule_levels.entry(name.clone()).or_insert(rank);
                    }
                }
            }
        }
        table
    }

    /// Default step precedence for a rule listed as a symbol in an ordering.
    pub fn rule_level(&self, rule: &str) -> Option<i32> {
        self.rule_levels.get(rule).copied()
    }
}

impl PrecedenceLookup for PrecedenceTable {
    fn resolve(&self, value: &Precedence, rule: &str) -> Result<i32, GrammarError> {
        match value {
            Precedence::Integer(n) => Ok(*n),
            Precedence::Name(name) => self
                .levels
                .get(name)
                .or_else(|| self.rule_levels.get(name))
                .copied()
                .ok_or_else(|| GrammarError::UnknownPrecedence {
                    name: name.clone(),
                    rule: rule.to_owned(),
                }),
        }
    }
}
