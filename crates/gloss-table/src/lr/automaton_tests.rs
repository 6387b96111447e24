use super::{Item, LrGrammar, build_automaton};
use crate::SymbolId;
use crate::prepare::prepare;
use crate::test_utils::calc_grammar;

#[test]
fn calc_states() {
    let prepared = prepare(&calc_grammar()).unwrap();
    let grammar = LrGrammar::new(&prepared);
    let automaton = build_automaton(&grammar).unwrap();

    assert_eq!(automaton.states.len(), 5);

    let initial: Vec<(u16, usize)> = automaton.states[0]
        .transitions
        .iter()
        .map(|(s, &t)| (s.0, t))
        .collect();
    // NUMBER, expr
    assert_eq!(initial, [(2, 1), (4, 2)]);

    // Both `expr` and `NUMBER` after '+' lead back to shared cores.
    let after_plus = &automaton.states[3].transitions;
    assert_eq!(after_plus.get(&SymbolId(2)), Some(&1));
    assert_eq!(after_plus.get(&SymbolId(4)), Some(&4));
    assert_eq!(automaton.states[4].transitions.get(&SymbolId(1)), Some(&3));
}

#[test]
fn lookaheads_merge_across_shared_cores() {
    let prepared = prepare(&calc_grammar()).unwrap();
    let grammar = LrGrammar::new(&prepared);
    let automaton = build_automaton(&grammar).unwrap();

    let reduce_number = Item {
        production: 0,
        dot: 1,
    };
    let (_, lookahead) = automaton.states[1]
        .items
        .iter()
        .find(|(item, _)| *item == reduce_number)
        .unwrap();
    let terminals: Vec<usize> = lookahead.iter().collect();
    // END and '+'
    assert_eq!(terminals, [0, 1]);
}

#[test]
fn describe_items() {
    let prepared = prepare(&calc_grammar()).unwrap();
    let grammar = LrGrammar::new(&prepared);

    let item = Item {
        production: 1,
        dot: 1,
    };
    assert_eq!(grammar.describe_item(item), "expr -> expr • '+' expr");

    let start = Item {
        production: grammar.augmented_id(),
        dot: 0,
    };
    assert_eq!(grammar.describe_item(start), "<start> -> • expr");
}
