use std::cmp::Reverse;

use gloss_table::{LexModeId, StateId, SymbolId};

use super::stack::{StackArena, StackVersion};
use crate::lexer::{ScannerState, Token};
use crate::tree::{Length, Point, Subtree};

fn leaf(symbol: u16, len: usize, extra: bool) -> Subtree {
    let token = Token {
        symbol: SymbolId(symbol),
        start_byte: 0,
        end_byte: len,
        start_point: Point::default(),
        is_extra: extra,
        is_error: false,
        lex_mode: LexModeId(0),
        immediate_ok: true,
        lookahead_end: len + 1,
        scanner_before: ScannerState::default(),
        scanner_after: ScannerState::default(),
    };
    let text = "x".repeat(len);
    Subtree::leaf(&token, Length::of(&text), StateId(0))
}

fn version(head: u32, error_cost: u32, dynamic_precedence: i32, id: u32) -> StackVersion {
    StackVersion {
        head,
        error_cost,
        dynamic_precedence,
        id,
    }
}

#[test]
fn push_tracks_end_offsets() {
    let mut arena = StackArena::new(StateId(0));
    let a = arena.push(0, StateId(1), leaf(1, 2, false));
    let b = arena.push(a, StateId(2), leaf(2, 3, false));

    assert_eq!(arena.end(0), 0);
    assert_eq!(arena.end(a), 2);
    assert_eq!(arena.end(b), 5);
    assert_eq!(arena.state(b), StateId(2));
    assert_eq!(arena.len(), 3);
}

#[test]
fn pop_separates_trailing_extras() {
    let mut arena = StackArena::new(StateId(0));
    let a = arena.push(0, StateId(1), leaf(1, 1, false));
    let ws = arena.push(a, StateId(1), leaf(9, 1, true));
    let b = arena.push(ws, StateId(2), leaf(2, 1, false));
    let trailing = arena.push(b, StateId(2), leaf(9, 1, true));

    let popped = arena.pop(trailing, 2).unwrap();
    assert_eq!(popped.base, 0);
    let symbols: Vec<u16> = popped.children.iter().map(|c| c.symbol().0).collect();
    assert_eq!(symbols, vec![1, 9, 2]);
    assert_eq!(popped.trailing.len(), 1);
    assert!(popped.trailing[0].is_extra());
}

#[test]
fn empty_pop_moves_below_extras() {
    let mut arena = StackArena::new(StateId(0));
    let a = arena.push(0, StateId(1), leaf(1, 1, false));
    let ws = arena.push(a, StateId(1), leaf(9, 1, true));

    let popped = arena.pop(ws, 0).unwrap();
    assert_eq!(popped.base, a);
    assert!(popped.children.is_empty());
    assert_eq!(popped.trailing.len(), 1);
}

#[test]
fn pop_below_bottom_fails() {
    let mut arena = StackArena::new(StateId(0));
    let a = arena.push(0, StateId(1), leaf(1, 1, false));
    assert!(arena.pop(a, 2).is_none());
}

#[test]
fn forks_share_entries() {
    let mut arena = StackArena::new(StateId(0));
    let shared = arena.push(0, StateId(1), leaf(1, 1, false));
    let left = arena.push(shared, StateId(2), leaf(2, 1, false));
    let right = arena.push(shared, StateId(3), leaf(3, 1, false));

    assert_eq!(
        arena.states(left),
        vec![StateId(0), StateId(1), StateId(2)]
    );
    assert_eq!(
        arena.states(right),
        vec![StateId(0), StateId(1), StateId(3)]
    );
    assert_eq!(arena.subtrees(left)[0].symbol(), SymbolId(1));
    assert!(arena.subtrees(left)[0].ptr_eq(&arena.subtrees(right)[0]));
}

#[test]
fn states_skip_extras() {
    let mut arena = StackArena::new(StateId(0));
    let a = arena.push(0, StateId(4), leaf(1, 1, false));
    let ws = arena.push(a, StateId(4), leaf(9, 1, true));

    assert_eq!(arena.states(ws), vec![StateId(0), StateId(4)]);
    assert_eq!(arena.subtrees(ws).len(), 2);
}

#[test]
fn same_states_compares_sequences() {
    let mut arena = StackArena::new(StateId(0));
    let a1 = arena.push(0, StateId(1), leaf(1, 1, false));
    let a2 = arena.push(a1, StateId(2), leaf(2, 1, false));
    let b1 = arena.push(0, StateId(1), leaf(5, 3, false));
    let b2 = arena.push(b1, StateId(2), leaf(6, 1, false));
    let c = arena.push(b1, StateId(7), leaf(6, 1, false));

    assert!(arena.same_states(a2, b2));
    assert!(!arena.same_states(a2, c));
    assert!(!arena.same_states(a1, a2));
    assert!(arena.same_states(a2, a2));
}

#[test]
fn preference_orders_cost_then_precedence_then_age() {
    let cheap = version(0, 0, 0, 5);
    let costly = version(0, 3, 10, 1);
    assert!(cheap.preference_key() < costly.preference_key());

    let strong = version(0, 0, 2, 7);
    let weak = version(0, 0, 1, 2);
    assert!(strong.preference_key() < weak.preference_key());

    let old = version(0, 0, 0, 1);
    let young = version(0, 0, 0, 2);
    assert!(old.preference_key() < young.preference_key());
    assert_eq!(old.preference_key(), (0, Reverse(0), 1));
}

#[test]
fn fork_keeps_everything_but_id() {
    let original = version(4, 2, -1, 0);
    let forked = original.fork(9);

    assert_eq!(forked.head, 4);
    assert_eq!(forked.error_cost, 2);
    assert_eq!(forked.dynamic_precedence, -1);
    assert_eq!(forked.id, 9);
}
