//! The GLR main loop.
//!
//! Every step takes one lookahead shared by all live versions: a token kept
//! by recovery, a leaf of the previous tree, or a freshly lexed token. Each
//! version then runs its actions. Reductions re-enter the work list, shifts
//! end the version's step, and a cell with several actions forks the version.
//!
//! When the lookahead is a reused leaf, the shift may push an enclosing old
//! node instead. That is checked after the leaf's reductions ran, since only
//! then is the state the old node was pushed from on top of the stack.

use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;

use gloss_table::{GrammarTable, LexModeId, ParseAction, ProductionId, StateId, SymbolId};

use super::reuse::ReuseCursor;
use super::stack::{StackArena, StackVersion};
use super::{CancellationFlag, ParseOptions};
use crate::diagnostics::{DiagnosticKind, Diagnostics, text_range};
use crate::edit::merge_ranges;
use crate::lexer::{ExternalScanner, LexSnapshot, Lexer, ScannerState, Token};
use crate::trace::Tracer;
use crate::tree::{Length, NodeSpec, ParseStatus, ROOT_STATE, Subtree};

/// Actions one step may run per allowed version before the surplus is dropped.
const STEP_ACTIONS_PER_VERSION: usize = 1024;

pub(crate) struct Outcome {
    pub root: Subtree,
    pub diagnostics: Diagnostics,
    pub status: ParseStatus,
    pub changed_ranges: Vec<Range<usize>>,
}

#[derive(Clone, Debug)]
pub(super) struct Lookahead {
    pub subtree: Subtree,
    pub start: usize,
}

impl Lookahead {
    #[inline]
    pub fn symbol(&self) -> SymbolId {
        self.subtree.symbol()
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.subtree.len()
    }

    pub fn lookahead_end(&self) -> usize {
        self.start + self.subtree.lookahead_bytes()
    }

    pub fn is_end(&self) -> bool {
        self.symbol() == SymbolId::END
    }
}

enum Step {
    Continue,
    /// An old node was pushed in place of the lookahead leaf.
    Reused(Subtree),
    Accept(StackVersion),
    Failed(Vec<StackVersion>),
    OutOfFuel,
}

pub(crate) struct Driver<'a, T: Tracer> {
    pub(super) table: &'a GrammarTable,
    pub(super) options: &'a ParseOptions,
    cancellation: Option<&'a CancellationFlag>,
    pub(super) text: &'a str,
    pub(super) lexer: Lexer<'a>,
    pub(super) arena: StackArena,
    pub(super) versions: Vec<StackVersion>,
    next_id: u32,
    /// Lexer state at the current position, shared by all versions.
    pub(super) snapshot: LexSnapshot,
    /// Token kept by recovery, consumed by the next step.
    pub(super) pending: Option<Lookahead>,
    reuse: Option<ReuseCursor>,
    /// Unchanged old nodes whose first leaf is the current lookahead,
    /// outermost first.
    node_candidates: Vec<Subtree>,
    /// Lex mode a reused node was followed by, in force until the next
    /// non-extra token.
    resume_mode: Option<LexModeId>,
    pub(super) diagnostics: Diagnostics,
    pub(super) changed: Vec<Range<usize>>,
    fuel: Option<u64>,
    pub(super) last_recovery: Option<usize>,
    overflow_at: Option<usize>,
    pub(super) tracer: &'a mut T,
}

impl<'a, T: Tracer> Driver<'a, T> {
    pub fn new(
        table: &'a GrammarTable,
        options: &'a ParseOptions,
        cancellation: Option<&'a CancellationFlag>,
        text: &'a str,
        scanner: Option<&'a mut dyn ExternalScanner>,
        reuse: Option<ReuseCursor>,
        tracer: &'a mut T,
    ) -> Self {
        let mut lexer = Lexer::new(table, text);
        if let Some(scanner) = scanner {
            scanner.deserialize(&[]);
            lexer = lexer.with_scanner(scanner);
        }
        let initial = table.initial_state();
        let mut snapshot = LexSnapshot::start();
        snapshot.mode = table.lex_mode(initial);

        Self {
            table,
            options,
            cancellation,
            text,
            lexer,
            arena: StackArena::new(initial),
            versions: vec![StackVersion {
                head: 0,
                error_cost: 0,
                dynamic_precedence: 0,
                id: 0,
            }],
            next_id: 1,
            snapshot,
            pending: None,
            reuse,
            node_candidates: Vec::new(),
            resume_mode: None,
            diagnostics: Diagnostics::new(),
            changed: Vec::new(),
            fuel: options.exec_fuel,
            last_recovery: None,
            overflow_at: None,
            tracer,
        }
    }

    pub fn run(mut self) -> Outcome {
        loop {
            if self.cancellation.is_some_and(CancellationFlag::is_cancelled) {
                return self.partial(ParseStatus::Cancelled);
            }

            let recovered = self.pending.is_some();
            let lookahead = self.next_lookahead();
            match self.step(&lookahead, recovered) {
                Step::Continue => self.advance_past(&lookahead),
                Step::Reused(node) => self.advance_over(lookahead.start, &node),
                Step::Accept(version) => return self.accept(version),
                Step::Failed(dead) => {
                    if let Some(root) = self.recover(dead, lookahead) {
                        return self.finish(root, ParseStatus::Complete);
                    }
                }
                Step::OutOfFuel => return self.partial(ParseStatus::FuelExhausted),
            }
        }
    }

    fn next_version_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(super) fn consume_fuel(&mut self) -> bool {
        match &mut self.fuel {
            None => true,
            Some(0) => false,
            Some(fuel) => {
                *fuel -= 1;
                true
            }
        }
    }

    pub(super) fn is_extra_symbol(&self, symbol: SymbolId) -> bool {
        self.table.symbol(symbol).extra
    }

    /// Terminals any live version accepts, and whether all versions agree on
    /// the lex mode. The snapshot takes the first version's mode.
    fn valid_terminals(&mut self) -> (Vec<SymbolId>, bool) {
        if let Some(mode) = self.resume_mode
            && self.versions.len() == 1
        {
            self.snapshot.mode = mode;
            return (self.table.lex_mode_terminals(mode).to_vec(), true);
        }
        let modes: Vec<LexModeId> = self
            .versions
            .iter()
            .map(|v| self.table.lex_mode(self.arena.state(v.head)))
            .collect();
        let Some(&first) = modes.first() else {
            return (Vec::new(), false);
        };
        self.snapshot.mode = first;

        if modes.iter().all(|&m| m == first) {
            return (self.table.lex_mode_terminals(first).to_vec(), true);
        }
        let union: BTreeSet<SymbolId> = modes
            .iter()
            .flat_map(|&m| self.table.lex_mode_terminals(m).iter().copied())
            .collect();
        (union.into_iter().collect(), false)
    }

    pub(super) fn leaf(&self, token: &Token) -> Subtree {
        let size = Length::of(&self.text[token.byte_range()]);
        Subtree::leaf(token, size, self.table.initial_state())
    }

    pub(super) fn lex(&mut self, snapshot: &LexSnapshot, valid: &[SymbolId]) -> Lookahead {
        let token = self.lexer.lex(snapshot.position, &snapshot.request(valid));
        self.tracer.trace_lex(&token);
        if !token.is_empty() {
            self.changed.push(token.byte_range());
        }
        Lookahead {
            subtree: self.leaf(&token),
            start: token.start_byte,
        }
    }

    fn next_lookahead(&mut self) -> Lookahead {
        self.node_candidates.clear();
        if let Some(pending) = self.pending.take() {
            return pending;
        }

        let (valid, uniform) = self.valid_terminals();
        if uniform && let Some(reused) = self.reusable_leaf() {
            return reused;
        }

        let snapshot = self.snapshot.clone();
        self.lex(&snapshot, &valid)
    }

    /// The old leaf at the current position, if it was lexed in the same
    /// state and nothing it examined changed. Its unchanged ancestors become
    /// node candidates.
    fn reusable_leaf(&mut self) -> Option<Lookahead> {
        let position = self.snapshot.position;
        let reuse = self.reuse.as_mut()?;
        let mut chain = reuse.candidates(position);
        let (leaf, old_start) = chain.pop()?;

        if !leaf.is_leaf() || leaf.is_fragile() || leaf.has_error() {
            return None;
        }
        if leaf.entry_snapshot(position) != self.snapshot || !reuse.unchanged(&leaf, old_start) {
            return None;
        }

        self.node_candidates = chain
            .into_iter()
            .filter(|(node, old_start)| {
                !node.is_empty()
                    && !node.is_extra()
                    && !node.is_fragile()
                    && !node.has_error()
                    && reuse.unchanged(node, *old_start)
            })
            .map(|(node, _)| node)
            .collect();

        self.tracer
            .trace_reuse(leaf.symbol(), position..position + leaf.len());
        Some(Lookahead {
            subtree: leaf,
            start: position,
        })
    }

    /// Outermost node candidate that was pushed from `state`, with the state
    /// it leads to.
    fn reusable_node(&mut self, state: StateId) -> Option<(Subtree, StateId)> {
        let candidates = std::mem::take(&mut self.node_candidates);
        candidates.into_iter().find_map(|node| {
            if node.parse_state() != state {
                return None;
            }
            let goto = self.table.goto(state, node.symbol())?;
            Some((node, goto))
        })
    }

    fn step(&mut self, lookahead: &Lookahead, recovered: bool) -> Step {
        let table = self.table;
        let symbol = lookahead.symbol();
        let resume_mode = self.resume_mode.take();
        let follow_mode = lookahead.subtree.lex_mode();
        // Nodes reduced on a token kept by recovery or lexed in error mode
        // depend on more than their own text.
        let after_error = recovered || follow_mode == LexModeId::ERROR;
        let mut work: VecDeque<StackVersion> = std::mem::take(&mut self.versions).into();
        let ambiguous_at_start = work.len() > 1;
        let budget = STEP_ACTIONS_PER_VERSION * self.options.max_versions;
        let mut spent = 0;
        let mut forked = false;
        let mut overflow = false;
        let mut shifted = Vec::new();
        let mut accepted = Vec::new();
        let mut dead = Vec::new();
        let mut reused = None;
        let mut only_extras = true;

        while let Some(version) = work.pop_front() {
            let state = self.arena.state(version.head);
            let actions = table.actions(state, symbol);
            if actions.is_empty() {
                dead.push(version);
                continue;
            }
            if spent >= budget {
                overflow = true;
                dead.push(version);
                continue;
            }

            for (i, &action) in actions.iter().enumerate() {
                let mut current = version;
                if i + 1 < actions.len() {
                    current = version.fork(self.next_version_id());
                    forked = true;
                    self.tracer.trace_fork(version.id, current.id);
                }
                if !self.consume_fuel() {
                    let mut alive = shifted;
                    alive.push(version);
                    alive.extend(work);
                    alive.extend(dead);
                    self.versions = alive;
                    return Step::OutOfFuel;
                }
                spent += 1;
                let fragile = ambiguous_at_start || forked || after_error;
                only_extras &= action == ParseAction::ShiftExtra;

                match action {
                    ParseAction::Shift { state: next } => {
                        match self.reusable_node(state).filter(|_| !fragile) {
                            Some((node, goto)) => {
                                self.push_reused(&mut current, goto, &node, lookahead.start);
                                reused = Some(node);
                            }
                            None => self.shift(&mut current, next, lookahead, false, fragile),
                        }
                        shifted.push(current);
                    }
                    ParseAction::ShiftExtra => {
                        self.shift(&mut current, state, lookahead, true, fragile);
                        shifted.push(current);
                    }
                    ParseAction::Reduce { production } => {
                        let end = lookahead.lookahead_end();
                        if self.reduce(&mut current, production, end, follow_mode, fragile) {
                            work.push_back(current);
                        } else {
                            dead.push(current);
                        }
                    }
                    ParseAction::Accept => accepted.push(current),
                }
            }
        }

        if let Some(best) = accepted.into_iter().min_by_key(StackVersion::preference_key) {
            return Step::Accept(best);
        }
        if shifted.is_empty() {
            return Step::Failed(dead);
        }
        for version in &dead {
            self.tracer.trace_prune(version.id);
        }
        self.versions = shifted;
        self.merge_versions(lookahead.start);
        if overflow {
            self.report_overflow(lookahead.start);
        }
        if only_extras {
            self.resume_mode = resume_mode;
        }
        match reused {
            Some(node) => Step::Reused(node),
            None => Step::Continue,
        }
    }

    fn shift(
        &mut self,
        version: &mut StackVersion,
        next: StateId,
        lookahead: &Lookahead,
        extra: bool,
        fragile: bool,
    ) {
        let state = self.arena.state(version.head);
        let leaf = lookahead.subtree.for_push(state, extra, fragile);
        self.tracer.trace_shift(version.id, next, leaf.symbol());
        version.head = self.arena.push(version.head, next, leaf);
    }

    fn push_reused(
        &mut self,
        version: &mut StackVersion,
        goto: StateId,
        node: &Subtree,
        start: usize,
    ) {
        self.tracer.trace_reuse(node.symbol(), start..start + node.len());
        version.head = self.arena.push(version.head, goto, node.clone());
        version.dynamic_precedence += node.dynamic_precedence();
    }

    /// Returns `false` when the stack cannot hold the reduction.
    fn reduce(
        &mut self,
        version: &mut StackVersion,
        production: ProductionId,
        lookahead_end: usize,
        follow_mode: LexModeId,
        fragile: bool,
    ) -> bool {
        let rule = self.table.production(production);
        let Some(popped) = self.arena.pop(version.head, rule.len()) else {
            debug_assert!(false, "reduce below the stack bottom");
            return false;
        };
        let base_state = self.arena.state(popped.base);
        let Some(goto) = self.table.goto(base_state, rule.lhs) else {
            debug_assert!(false, "missing goto after reduce");
            return false;
        };

        let child_count = popped.children.len();
        let node = Subtree::node(NodeSpec {
            symbol: rule.lhs,
            production: Some(production),
            children: popped.children,
            parse_state: base_state,
            lookahead_end,
            start: self.arena.end(popped.base),
            extra: false,
            fragile,
            error_cost: 0,
            dynamic_precedence: rule.dynamic_precedence,
            entry: self.snapshot.clone(),
            follow_mode,
        });

        let mut head = self.arena.push(popped.base, goto, node);
        for extra in popped.trailing {
            head = self.arena.push(head, goto, extra);
        }
        version.head = head;
        version.dynamic_precedence += rule.dynamic_precedence;
        self.tracer.trace_reduce(version.id, production, child_count);
        true
    }

    /// Merge versions with equal state sequences, then cap the count.
    fn merge_versions(&mut self, position: usize) {
        let versions = std::mem::take(&mut self.versions);
        let mut kept: Vec<StackVersion> = Vec::with_capacity(versions.len());

        for version in versions {
            let arena = &self.arena;
            match kept.iter_mut().find(|k| arena.same_states(k.head, version.head)) {
                Some(existing) => {
                    if version.preference_key() < existing.preference_key() {
                        self.tracer.trace_merge(version.id, existing.id);
                        *existing = version;
                    } else {
                        self.tracer.trace_merge(existing.id, version.id);
                    }
                }
                None => kept.push(version),
            }
        }

        if kept.len() > self.options.max_versions {
            kept.sort_by_key(StackVersion::preference_key);
            for dropped in kept.drain(self.options.max_versions..) {
                self.tracer.trace_prune(dropped.id);
            }
            self.report_overflow(position);
        }
        kept.sort_by_key(|v| v.id);
        self.versions = kept;
    }

    fn report_overflow(&mut self, position: usize) {
        if self.overflow_at == Some(position) {
            return;
        }
        self.overflow_at = Some(position);
        self.diagnostics
            .report(DiagnosticKind::AmbiguityOverflow, text_range(position..position))
            .message(format!("kept the best {}", self.options.max_versions))
            .emit();
    }

    fn advance_past(&mut self, lookahead: &Lookahead) {
        self.snapshot.position = lookahead.end();
        self.snapshot.scanner_state = lookahead.subtree.scanner_after().clone();
        self.snapshot.immediate_ok = !self.is_extra_symbol(lookahead.symbol());
    }

    /// Move past a reused node. The next token is lexed the way the token
    /// after the node was in the previous parse.
    fn advance_over(&mut self, start: usize, node: &Subtree) {
        self.snapshot.position = start + node.len();
        self.snapshot.scanner_state = node.scanner_after().clone();
        self.snapshot.immediate_ok = !self.is_extra_symbol(last_leaf(node).symbol());
        self.resume_mode = Some(node.follow_mode());
    }

    fn accept(mut self, version: StackVersion) -> Outcome {
        self.tracer.trace_accept(version.id);
        let subtrees = self.arena.subtrees(version.head);
        let root = self.build_root(subtrees);
        self.finish(root, ParseStatus::Complete)
    }

    /// Splice extras around the start node into it, or wrap everything in a
    /// fresh start node when errors lie outside of it.
    fn build_root(&self, subtrees: Vec<Subtree>) -> Subtree {
        let start_symbol = self.table.start_symbol();
        let main = subtrees
            .iter()
            .position(|s| !s.is_extra() && s.symbol() == start_symbol);
        let Some(main) = main else {
            return self.wrap(SymbolId::ERROR, subtrees, 0);
        };
        if subtrees.len() == 1 {
            return subtrees[main].clone();
        }

        let errors_outside = subtrees
            .iter()
            .enumerate()
            .any(|(i, s)| i != main && s.has_error());
        if errors_outside {
            return self.wrap(start_symbol, subtrees, 0);
        }

        let start = &subtrees[main];
        let mut children = subtrees[..main].to_vec();
        children.extend(start.children().iter().cloned());
        children.extend(subtrees[main + 1..].iter().cloned());
        Subtree::node(NodeSpec {
            symbol: start_symbol,
            production: start.production(),
            children,
            parse_state: ROOT_STATE,
            lookahead_end: self.text.len() + 1,
            start: 0,
            extra: false,
            fragile: false,
            error_cost: 0,
            dynamic_precedence: 0,
            entry: LexSnapshot::start(),
            follow_mode: LexModeId::ERROR,
        })
    }

    /// Root node over `children` with no production.
    pub(super) fn wrap(&self, symbol: SymbolId, children: Vec<Subtree>, error_cost: u32) -> Subtree {
        Subtree::node(NodeSpec {
            symbol,
            production: None,
            children,
            parse_state: ROOT_STATE,
            lookahead_end: self.text.len() + 1,
            start: 0,
            extra: false,
            fragile: false,
            error_cost,
            dynamic_precedence: 0,
            entry: LexSnapshot::start(),
            follow_mode: LexModeId::ERROR,
        })
    }

    /// Everything parsed so far plus an error leaf over the unparsed tail.
    fn partial(mut self, status: ParseStatus) -> Outcome {
        let version = self
            .versions
            .iter()
            .copied()
            .min_by_key(StackVersion::preference_key);
        let (mut children, end) = match version {
            Some(v) => (self.arena.subtrees(v.head), self.arena.end(v.head)),
            None => (Vec::new(), 0),
        };

        let len = self.text.len();
        if end < len {
            let token = self.error_token(end..len);
            children.push(self.leaf(&token));
        }

        let kind = match status {
            ParseStatus::FuelExhausted => DiagnosticKind::FuelExhausted,
            _ => DiagnosticKind::Cancelled,
        };
        self.diagnostics.report(kind, text_range(end..len)).emit();

        let root = self.wrap(SymbolId::ERROR, children, 0);
        self.finish(root, status)
    }

    pub(super) fn error_token(&self, range: Range<usize>) -> Token {
        Token {
            symbol: SymbolId::ERROR,
            start_byte: range.start,
            end_byte: range.end,
            start_point: self.lexer.point(range.start),
            is_extra: false,
            is_error: true,
            lex_mode: LexModeId::ERROR,
            immediate_ok: false,
            lookahead_end: range.end + 1,
            scanner_before: ScannerState::default(),
            scanner_after: ScannerState::default(),
        }
    }

    pub(super) fn finish(self, root: Subtree, status: ParseStatus) -> Outcome {
        let mut changed = self.changed;
        changed.sort_by_key(|r| (r.start, r.end));
        Outcome {
            root,
            diagnostics: self.diagnostics,
            status,
            changed_ranges: merge_ranges(changed),
        }
    }
}

fn last_leaf(subtree: &Subtree) -> Subtree {
    let mut current = subtree.clone();
    while let Some(child) = current.children().iter().rev().find(|c| !c.is_empty()).cloned() {
        current = child;
    }
    current
}
