//! FIRST sets and nullability.

use crate::bitset::TerminalSet;
use crate::prepare::PreparedGrammar;
use crate::table::ProductionStep;

pub(crate) struct FirstSets {
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
    terminal_count: usize,
}

impl FirstSets {
    pub fn compute(grammar: &PreparedGrammar) -> Self {
        let terminal_count = grammar.terminal_count;
        let mut first: Vec<TerminalSet> = (0..grammar.symbols.len())
            .map(|_| TerminalSet::new(terminal_count))
            .collect();
        for (t, set) in first.iter_mut().enumerate().take(terminal_count) {
            set.insert(t);
        }
        let mut nullable = vec![false; grammar.symbols.len()];

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let lhs = production.lhs.index();
                let mut all_nullable = true;
                for step in &production.steps {
                    let sym = step.symbol.index();
                    if sym != lhs {
                        let src = first[sym].clone();
                        changed |= first[lhs].union_with(&src);
                    }
                    if !nullable[sym] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !nullable[lhs] {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }

        Self {
            first,
            nullable,
            terminal_count,
        }
    }

    /// FIRST of `steps` followed by `follow`.
    pub fn sequence(&self, steps: &[ProductionStep], follow: &TerminalSet) -> TerminalSet {
        let mut out = TerminalSet::new(self.terminal_count);
        for step in steps {
            out.union_with(&self.first[step.symbol.index()]);
            if !self.nullable[step.symbol.index()] {
                return out;
            }
        }
        out.union_with(follow);
        out
    }
}
