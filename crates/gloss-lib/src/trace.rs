//! Parser instrumentation.
//!
//! The parser reports lexing, stack actions, forks and recoveries through a
//! [`Tracer`]. With [`NoopTracer`] every call is an `#[inline(always)]` empty
//! function, so an untraced parse pays nothing. [`PrintTracer`] formats the
//! events into lines for the CLI's `--trace`.

use std::ops::Range;

use gloss_table::{GrammarTable, ProductionId, StateId, SymbolId};

use crate::lexer::Token;

/// How much a [`PrintTracer`] records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Shift, reduce, recover, reuse and accept.
    #[default]
    Default,
    /// Adds lexing, forks, merges and pruning.
    Verbose,
    /// Adds token text.
    VeryVerbose,
}

/// Parser event hooks. Versions are identified by their creation id.
pub trait Tracer {
    fn trace_lex(&mut self, token: &Token);

    fn trace_shift(&mut self, version: u32, state: StateId, symbol: SymbolId);

    fn trace_reduce(&mut self, version: u32, production: ProductionId, child_count: usize);

    fn trace_fork(&mut self, from: u32, to: u32);

    fn trace_merge(&mut self, kept: u32, dropped: u32);

    fn trace_prune(&mut self, version: u32);

    fn trace_recover(&mut self, version: u32, skip: usize, unwind: usize, cost: u32);

    fn trace_reuse(&mut self, symbol: SymbolId, range: Range<usize>);

    fn trace_accept(&mut self, version: u32);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_lex(&mut self, _token: &Token) {}

    #[inline(always)]
    fn trace_shift(&mut self, _version: u32, _state: StateId, _symbol: SymbolId) {}

    #[inline(always)]
    fn trace_reduce(&mut self, _version: u32, _production: ProductionId, _child_count: usize) {}

    #[inline(always)]
    fn trace_fork(&mut self, _from: u32, _to: u32) {}

    #[inline(always)]
    fn trace_merge(&mut self, _kept: u32, _dropped: u32) {}

    #[inline(always)]
    fn trace_prune(&mut self, _version: u32) {}

    #[inline(always)]
    fn trace_recover(&mut self, _version: u32, _skip: usize, _unwind: usize, _cost: u32) {}

    #[inline(always)]
    fn trace_reuse(&mut self, _symbol: SymbolId, _range: Range<usize>) {}

    #[inline(always)]
    fn trace_accept(&mut self, _version: u32) {}
}

/// Tracer that collects formatted lines.
pub struct PrintTracer<'t> {
    table: &'t GrammarTable,
    source: &'t str,
    verbosity: Verbosity,
    lines: Vec<String>,
}

impl<'t> PrintTracer<'t> {
    pub fn new(table: &'t GrammarTable, source: &'t str, verbosity: Verbosity) -> Self {
        Self {
            table,
            source,
            verbosity,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }

    fn push(&mut self, tag: &str, body: String) {
        self.lines.push(format!("{tag:<8}{body}"));
    }

    fn verbose(&self) -> bool {
        self.verbosity >= Verbosity::Verbose
    }

    fn text(&self, range: Range<usize>) -> Option<&'t str> {
        if self.verbosity < Verbosity::VeryVerbose {
            return None;
        }
        self.source.get(range)
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_lex(&mut self, token: &Token) {
        if !self.verbose() {
            return;
        }
        let name = self.table.symbol_name(token.symbol);
        let mut body = format!("{name} {}..{}", token.start_byte, token.end_byte);
        if let Some(text) = self.text(token.byte_range()) {
            body.push_str(&format!(" {text:?}"));
        }
        self.push("lex", body);
    }

    fn trace_shift(&mut self, version: u32, state: StateId, symbol: SymbolId) {
        let name = self.table.symbol_name(symbol);
        self.push("shift", format!("v{version} s{} {name}", state.0));
    }

    fn trace_reduce(&mut self, version: u32, production: ProductionId, child_count: usize) {
        let lhs = self.table.production(production).lhs;
        let name = self.table.symbol_name(lhs);
        self.push(
            "reduce",
            format!("v{version} {name} <- {child_count} children"),
        );
    }

    fn trace_fork(&mut self, from: u32, to: u32) {
        if self.verbose() {
            self.push("fork", format!("v{from} -> v{to}"));
        }
    }

    fn trace_merge(&mut self, kept: u32, dropped: u32) {
        if self.verbose() {
            self.push("merge", format!("v{dropped} into v{kept}"));
        }
    }

    fn trace_prune(&mut self, version: u32) {
        if self.verbose() {
            self.push("prune", format!("v{version}"));
        }
    }

    fn trace_recover(&mut self, version: u32, skip: usize, unwind: usize, cost: u32) {
        self.push(
            "recover",
            format!("v{version} skip={skip} unwind={unwind} cost={cost}"),
        );
    }

    fn trace_reuse(&mut self, symbol: SymbolId, range: Range<usize>) {
        let name = self.table.symbol_name(symbol);
        let mut body = format!("{name} {}..{}", range.start, range.end);
        if let Some(text) = self.text(range) {
            body.push_str(&format!(" {text:?}"));
        }
        self.push("reuse", body);
    }

    fn trace_accept(&mut self, version: u32) {
        self.push("accept", format!("v{version}"));
    }
}
