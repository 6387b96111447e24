//! Error recovery.
//!
//! When every version fails on a lookahead, the preferred one is repaired by
//! skipping tokens, unwinding the stack, or both. The cheapest repair after
//! which the next kept token can be processed wins. The discarded material
//! becomes an `ERROR` node pushed as an extra, so the surrounding structure
//! survives.

use std::collections::BTreeSet;
use std::ops::Range;

use gloss_table::{LexModeId, ParseAction, StateId, SymbolId};

use super::driver::{Driver, Lookahead};
use super::stack::StackVersion;
use crate::diagnostics::{DiagnosticKind, text_range};
use crate::lexer::LexSnapshot;
use crate::trace::Tracer;
use crate::tree::{NodeSpec, Subtree};

const SKIP_COST: u32 = 3;
const UNWIND_COST: u32 = 2;
/// Label pointing at parsed input a repair popped off the stack.
const UNWOUND_LABEL: &str = "discarded while recovering";
/// Nested reductions followed when checking a repair.
const MAX_SIMULATION_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Repair {
    cost: u32,
    skip: usize,
    unwind: usize,
}

impl<T: Tracer> Driver<'_, T> {
    /// Repair the preferred dead version so parsing can go on.
    ///
    /// Returns the final tree when the only option left is to give up at end
    /// of input.
    pub(super) fn recover(
        &mut self,
        dead: Vec<StackVersion>,
        lookahead: Lookahead,
    ) -> Option<Subtree> {
        let version = dead
            .into_iter()
            .min_by_key(StackVersion::preference_key)
            .unwrap_or(StackVersion {
                head: 0,
                error_cost: 0,
                dynamic_precedence: 0,
                id: 0,
            });

        if self.last_recovery == Some(lookahead.start) {
            return self.give_up_token(version, lookahead);
        }
        self.last_recovery = Some(lookahead.start);

        let states = self.arena.states(version.head);
        let ahead = self.lex_ahead(lookahead.clone(), &states);
        let non_extra: Vec<usize> = ahead
            .iter()
            .enumerate()
            .filter(|(_, la)| !la.subtree.is_extra())
            .map(|(i, _)| i)
            .collect();

        let mut repairs = Vec::new();
        for skip in 0..non_extra.len().min(self.options.max_skip + 1) {
            for unwind in 0..states.len() {
                if skip == 0 && unwind == 0 {
                    continue;
                }
                let cost = SKIP_COST * skip as u32 + UNWIND_COST * unwind as u32;
                if cost <= self.options.max_recovery_cost {
                    repairs.push(Repair { cost, skip, unwind });
                }
            }
        }
        repairs.sort();

        let chosen = repairs.into_iter().find(|r| {
            let kept = &ahead[non_extra[r.skip]];
            self.can_process(&states[..states.len() - r.unwind], kept.symbol())
        });
        match chosen {
            Some(repair) => {
                self.apply(version, repair, &ahead, &non_extra);
                None
            }
            None => self.give_up_token(version, lookahead),
        }
    }

    /// The failed lookahead followed by error-mode tokens, up to one more
    /// non-extra token than may be skipped, or end of input.
    ///
    /// Tokens are lexed as terminals some state on the stack accepts, never
    /// as immediate tokens.
    fn lex_ahead(&mut self, lookahead: Lookahead, states: &[StateId]) -> Vec<Lookahead> {
        let table = self.table;
        let valid: Vec<SymbolId> = states
            .iter()
            .flat_map(|&state| table.lex_mode_terminals(table.lex_mode(state)).iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let limit = self.options.max_skip + 1;
        let mut count = usize::from(!lookahead.subtree.is_extra());
        let mut ahead = vec![lookahead];

        while let Some(last) = ahead.last()
            && !last.is_end()
            && count < limit
        {
            let snapshot = LexSnapshot {
                position: last.end(),
                mode: LexModeId::ERROR,
                immediate_ok: false,
                scanner_state: last.subtree.scanner_after().clone(),
            };
            let next = self.lex(&snapshot, &valid);
            count += usize::from(!next.subtree.is_extra());
            ahead.push(next);
        }
        ahead
    }

    /// Whether `symbol` would be shifted or accepted from `states`, following
    /// reductions.
    fn can_process(&self, states: &[StateId], symbol: SymbolId) -> bool {
        self.simulate(states.to_vec(), symbol, 0)
    }

    fn simulate(&self, states: Vec<StateId>, symbol: SymbolId, depth: usize) -> bool {
        if depth > MAX_SIMULATION_DEPTH {
            return false;
        }
        let Some(&top) = states.last() else {
            return false;
        };

        for &action in self.table.actions(top, symbol) {
            let production = match action {
                ParseAction::Shift { .. } | ParseAction::ShiftExtra | ParseAction::Accept => {
                    return true;
                }
                ParseAction::Reduce { production } => self.table.production(production),
            };
            if production.len() >= states.len() {
                continue;
            }
            let mut next = states[..states.len() - production.len()].to_vec();
            let Some(goto) = next.last().and_then(|&s| self.table.goto(s, production.lhs)) else {
                continue;
            };
            next.push(goto);
            if self.simulate(next, symbol, depth + 1) {
                return true;
            }
        }
        false
    }

    fn apply(
        &mut self,
        mut version: StackVersion,
        repair: Repair,
        ahead: &[Lookahead],
        non_extra: &[usize],
    ) {
        let Repair { cost, skip, unwind } = repair;
        let kept_index = non_extra[skip];
        let kept = ahead[kept_index].clone();
        let expected = self.expected(self.arena.state(version.head));

        let Some(popped) = self.arena.pop(version.head, unwind) else {
            return;
        };
        let base_state = self.arena.state(popped.base);
        let start = self.arena.end(popped.base);

        let mut children = popped.children;
        let unwound_end = start + children.iter().map(Subtree::len).sum::<usize>();
        let unwound = (unwound_end > start).then_some(start..unwound_end);
        let mut above = Vec::new();
        let skipped = if skip > 0 {
            let last_skipped = non_extra[skip - 1];
            children.extend(popped.trailing);
            children.extend(ahead[..=last_skipped].iter().map(|la| la.subtree.clone()));
            above.extend(ahead[last_skipped + 1..kept_index].iter().map(|la| la.subtree.clone()));
            &ahead[..=last_skipped]
        } else {
            above.extend(popped.trailing);
            above.extend(ahead[..kept_index].iter().map(|la| la.subtree.clone()));
            &ahead[..0]
        };

        let mut head = popped.base;
        if !children.is_empty() {
            let error = Subtree::node(NodeSpec {
                symbol: SymbolId::ERROR,
                production: None,
                children,
                parse_state: base_state,
                lookahead_end: kept.start,
                start,
                extra: true,
                fragile: true,
                error_cost: cost,
                dynamic_precedence: 0,
                entry: self.snapshot.clone(),
                follow_mode: LexModeId::ERROR,
            });
            head = self.arena.push(head, base_state, error);
        }
        for extra in above {
            head = self.arena.push(head, base_state, extra.for_push(base_state, true, false));
        }
        version.head = head;
        version.error_cost += cost;
        self.versions = vec![version];

        self.report_skipped(skipped, unwound.clone());
        if skip == 0 {
            let mut report = self
                .diagnostics
                .report(DiagnosticKind::MissingInput, text_range(kept.start..kept.start))
                .message(expected);
            if let Some(range) = unwound {
                report = report.related_to(UNWOUND_LABEL, text_range(range));
            }
            report.emit();
        }

        self.tracer.trace_recover(version.id, skip, unwind, cost);
        self.snapshot.position = kept.start;
        self.snapshot.scanner_state = kept.subtree.scanner_before().clone();
        self.pending = Some(kept);
    }

    fn report_skipped(&mut self, skipped: &[Lookahead], unwound: Option<Range<usize>>) {
        let mut unexpected: Option<(usize, usize)> = None;
        for la in skipped {
            if la.subtree.is_error() {
                self.diagnostics
                    .report(DiagnosticKind::UnrecognizedInput, text_range(la.start..la.end()))
                    .message(&self.text[la.start..la.end()])
                    .emit();
            } else if !la.subtree.is_extra() {
                let start = unexpected.map_or(la.start, |(s, _)| s);
                unexpected = Some((start, la.end()));
            }
        }
        if let Some((start, end)) = unexpected {
            let mut report = self
                .diagnostics
                .report(DiagnosticKind::UnexpectedToken, text_range(start..end))
                .message(&self.text[start..end]);
            if let Some(range) = unwound {
                report = report.related_to(UNWOUND_LABEL, text_range(range));
            }
            report.emit();
        }
    }

    /// No repair fits: wrap the lookahead alone in an `ERROR` node, or at end
    /// of input wrap the whole stack and finish.
    fn give_up_token(&mut self, mut version: StackVersion, lookahead: Lookahead) -> Option<Subtree> {
        let state = self.arena.state(version.head);
        self.tracer.trace_recover(version.id, 1, 0, SKIP_COST);

        if lookahead.is_end() {
            let len = self.text.len();
            let expected = self.expected(state);
            self.diagnostics
                .report(DiagnosticKind::MissingInput, text_range(len..len))
                .message(expected)
                .emit();
            let children = self.arena.subtrees(version.head);
            return Some(self.wrap(SymbolId::ERROR, children, SKIP_COST));
        }

        let range = lookahead.start..lookahead.end();
        let kind = if lookahead.subtree.is_error() {
            DiagnosticKind::UnrecognizedInput
        } else {
            DiagnosticKind::UnexpectedToken
        };
        self.diagnostics
            .report(kind, text_range(range.clone()))
            .message(&self.text[range.clone()])
            .emit();

        let error = Subtree::node(NodeSpec {
            symbol: SymbolId::ERROR,
            production: None,
            children: vec![lookahead.subtree.clone()],
            parse_state: state,
            lookahead_end: lookahead.lookahead_end(),
            start: lookahead.start,
            extra: true,
            fragile: true,
            error_cost: SKIP_COST,
            dynamic_precedence: 0,
            entry: self.snapshot.clone(),
            follow_mode: LexModeId::ERROR,
        });
        version.head = self.arena.push(version.head, state, error);
        version.error_cost += SKIP_COST;
        self.versions = vec![version];

        self.snapshot.position = range.end;
        self.snapshot.scanner_state = lookahead.subtree.scanner_after().clone();
        self.snapshot.immediate_ok = false;
        None
    }

    /// Visible terminals `state` has actions for, for "expected ..." messages.
    pub(super) fn expected(&self, state: StateId) -> String {
        let table = self.table;
        let mut names = Vec::new();
        if !table.actions(state, SymbolId::END).is_empty() {
            names.push("end of input".to_owned());
        }
        for &terminal in table.all_terminals() {
            let info = table.symbol(terminal);
            if info.extra || !info.visible || table.actions(state, terminal).is_empty() {
                continue;
            }
            if info.named {
                names.push(info.name.clone());
            } else {
                names.push(format!("`{}`", info.name));
            }
        }
        if names.is_empty() {
            return "nothing".to_owned();
        }
        names.join(", ")
    }
}
