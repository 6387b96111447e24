//! Canonical LR(1) item sets merged by core.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::{Item, LrGrammar};
use crate::GrammarError;
use crate::bitset::TerminalSet;
use crate::symbol::SymbolId;

pub(crate) struct LrState {
    /// Closure of the kernel, kernel items first.
    pub items: Vec<(Item, TerminalSet)>,
    pub transitions: BTreeMap<SymbolId, usize>,
}

pub(crate) struct Automaton {
    pub states: Vec<LrState>,
}

type Kernel = Vec<(Item, TerminalSet)>;

pub(crate) fn build_automaton(grammar: &LrGrammar) -> Result<Automaton, GrammarError> {
    let mut end = TerminalSet::new(grammar.terminal_count());
    end.insert(SymbolId::END.index());
    let start = Item {
        production: grammar.augmented_id(),
        dot: 0,
    };

    let mut kernels: Vec<Kernel> = vec![vec![(start, end)]];
    let mut transitions: Vec<BTreeMap<SymbolId, usize>> = vec![BTreeMap::new()];
    let mut index: HashMap<Vec<Item>, usize> = HashMap::new();
    index.insert(vec![start], 0);

    let mut queue = VecDeque::from([0usize]);
    let mut queued = vec![true];

    while let Some(state) = queue.pop_front() {
        queued[state] = false;
        let closure = closure(grammar, &kernels[state]);

        let mut successors: BTreeMap<SymbolId, Kernel> = BTreeMap::new();
        for (item, lookahead) in &closure {
            if let Some(symbol) = grammar.next_symbol(*item) {
                successors
                    .entry(symbol)
                    .or_default()
                    .push((item.advance(), lookahead.clone()));
            }
        }

        for (symbol, mut kernel) in successors {
            kernel.sort_by_key(|(item, _)| *item);
            let core: Vec<Item> = kernel.iter().map(|(item, _)| *item).collect();

            let target = match index.get(&core) {
                Some(&target) => {
                    if merge_lookaheads(&mut kernels[target], &kernel) && !queued[target] {
                        queued[target] = true;
                        queue.push_back(target);
                    }
                    target
                }
                None => {
                    let target = kernels.len();
                    if target >= u16::MAX as usize - 1 {
                        return Err(GrammarError::TooManyStates(target + 1));
                    }
                    kernels.push(kernel);
                    transitions.push(BTreeMap::new());
                    queued.push(true);
                    queue.push_back(target);
                    index.insert(core, target);
                    target
                }
            };
            transitions[state].insert(symbol, target);
        }
    }

    let states = kernels
        .iter()
        .zip(transitions)
        .map(|(kernel, transitions)| LrState {
            items: closure(grammar, kernel),
            transitions,
        })
        .collect();

    Ok(Automaton { states })
}

fn merge_lookaheads(existing: &mut Kernel, incoming: &Kernel) -> bool {
    let mut changed = false;
    for ((_, a), (_, b)) in existing.iter_mut().zip(incoming) {
        changed |= a.union_with(b);
    }
    changed
}

fn closure(grammar: &LrGrammar, kernel: &Kernel) -> Vec<(Item, TerminalSet)> {
    let mut items: Vec<(Item, TerminalSet)> = kernel.clone();
    let mut positions: HashMap<Item, usize> = items
        .iter()
        .enumerate()
        .map(|(i, (item, _))| (*item, i))
        .collect();
    let mut work: VecDeque<usize> = (0..items.len()).collect();

    while let Some(i) = work.pop_front() {
        let (item, lookahead) = items[i].clone();
        let Some(next) = grammar.next_symbol(item) else {
            continue;
        };
        if grammar.is_terminal(next) {
            continue;
        }

        let rest = &grammar.production(item.production).steps[item.dot as usize + 1..];
        let follow = grammar.first.sequence(rest, &lookahead);

        for &production in grammar.productions_of(next) {
            let predicted = Item { production, dot: 0 };
            match positions.get(&predicted) {
                Some(&j) => {
                    if items[j].1.union_with(&follow) && !work.contains(&j) {
                        work.push_back(j);
                    }
                }
                None => {
                    positions.insert(predicted, items.len());
                    work.push_back(items.len());
                    items.push((predicted, follow.clone()));
                }
            }
        }
    }

    items
}
