//! GLR parser driver.
//!
//! [`Parser`] owns the configuration and an optional external scanner; each
//! call to [`Parser::parse`] runs a fresh driver over the text, optionally
//! reusing subtrees of a previous tree.

mod driver;
mod recovery;
mod reuse;
mod stack;

#[cfg(test)]
mod recovery_tests;
#[cfg(test)]
mod stack_tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gloss_table::GrammarTable;

use crate::edit::{Edit, EditError, EditedTree};
use crate::lexer::ExternalScanner;
use crate::trace::{NoopTracer, Tracer};
use crate::tree::Tree;

use driver::Driver;
use reuse::ReuseCursor;

/// Limits for a single parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Live stack versions kept after each step (default: 6).
    pub(crate) max_versions: usize,
    /// Non-extra tokens recovery may skip (default: 16).
    pub(crate) max_skip: usize,
    /// Most expensive recovery tried before falling back (default: 64).
    pub(crate) max_recovery_cost: u32,
    /// Parser actions allowed (default: unlimited).
    pub(crate) exec_fuel: Option<u64>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_versions: 6,
            max_skip: 16,
            max_recovery_cost: 64,
            exec_fuel: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// At least one version is always kept.
    pub fn max_versions(mut self, n: usize) -> Self {
        self.max_versions = n.max(1);
        self
    }

    pub fn max_skip(mut self, n: usize) -> Self {
        self.max_skip = n;
        self
    }

    pub fn max_recovery_cost(mut self, cost: u32) -> Self {
        self.max_recovery_cost = cost;
        self
    }

    pub fn exec_fuel(mut self, fuel: u64) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    pub fn get_max_versions(&self) -> usize {
        self.max_versions
    }

    pub fn get_max_skip(&self) -> usize {
        self.max_skip
    }

    pub fn get_max_recovery_cost(&self) -> u32 {
        self.max_recovery_cost
    }

    pub fn get_exec_fuel(&self) -> Option<u64> {
        self.exec_fuel
    }
}

/// Shared flag that stops a running parse at its next step.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Parser {
    table: Arc<GrammarTable>,
    options: ParseOptions,
    cancellation: Option<CancellationFlag>,
    scanner: Option<Box<dyn ExternalScanner + Send>>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("table", &self.table)
            .field("options", &self.options)
            .field("cancellation", &self.cancellation)
            .field("scanner", &self.scanner.is_some())
            .finish()
    }
}

pub struct ParserBuilder {
    table: Arc<GrammarTable>,
    options: ParseOptions,
    cancellation: Option<CancellationFlag>,
    scanner: Option<Box<dyn ExternalScanner + Send>>,
}

impl ParserBuilder {
    pub fn new(table: Arc<GrammarTable>) -> Self {
        Self {
            table,
            options: ParseOptions::default(),
            cancellation: None,
            scanner: None,
        }
    }

    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_versions(mut self, n: usize) -> Self {
        self.options = self.options.max_versions(n);
        self
    }

    pub fn max_skip(mut self, n: usize) -> Self {
        self.options = self.options.max_skip(n);
        self
    }

    pub fn max_recovery_cost(mut self, cost: u32) -> Self {
        self.options = self.options.max_recovery_cost(cost);
        self
    }

    pub fn exec_fuel(mut self, fuel: u64) -> Self {
        self.options = self.options.exec_fuel(fuel);
        self
    }

    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn external_scanner(mut self, scanner: impl ExternalScanner + Send + 'static) -> Self {
        self.scanner = Some(Box::new(scanner));
        self
    }

    pub fn build(self) -> Parser {
        Parser {
            table: self.table,
            options: self.options,
            cancellation: self.cancellation,
            scanner: self.scanner,
        }
    }
}

impl Parser {
    pub fn new(table: Arc<GrammarTable>) -> Self {
        ParserBuilder::new(table).build()
    }

    pub fn builder(table: Arc<GrammarTable>) -> ParserBuilder {
        ParserBuilder::new(table)
    }

    pub fn table(&self) -> &Arc<GrammarTable> {
        &self.table
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse `text`, reusing `previous` when given.
    ///
    /// Parsing itself never fails. The only error is an edit that does not
    /// match the previous and new texts.
    pub fn parse(&mut self, text: &str, previous: Option<(&Tree, &Edit)>) -> Result<Tree, EditError> {
        self.parse_with_tracer(text, previous, &mut NoopTracer)
    }

    pub fn parse_with_tracer<T: Tracer>(
        &mut self,
        text: &str,
        previous: Option<(&Tree, &Edit)>,
        tracer: &mut T,
    ) -> Result<Tree, EditError> {
        Ok(self.run(text, previous, tracer)?.tree)
    }

    /// Reparse after `edit`, reporting which ranges were re-lexed.
    pub fn edit(&mut self, tree: &Tree, edit: &Edit, new_text: &str) -> Result<EditedTree, EditError> {
        self.run(new_text, Some((tree, edit)), &mut NoopTracer)
    }

    pub fn edit_with_tracer<T: Tracer>(
        &mut self,
        tree: &Tree,
        edit: &Edit,
        new_text: &str,
        tracer: &mut T,
    ) -> Result<EditedTree, EditError> {
        self.run(new_text, Some((tree, edit)), tracer)
    }

    fn run<T: Tracer>(
        &mut self,
        text: &str,
        previous: Option<(&Tree, &Edit)>,
        tracer: &mut T,
    ) -> Result<EditedTree, EditError> {
        let mut version = 0;
        let mut reuse = None;
        if let Some((tree, edit)) = previous {
            edit.validate(tree.text(), text)?;
            version = tree.version() + 1;
            if Arc::ptr_eq(tree.table(), &self.table) {
                reuse = Some(ReuseCursor::new(tree.root_subtree().clone(), *edit));
            }
        }

        let Parser {
            table,
            options,
            cancellation,
            scanner,
        } = self;
        let text: Arc<str> = Arc::from(text);
        let outcome = {
            let scanner: Option<&mut dyn ExternalScanner> = match scanner {
                Some(s) => Some(s.as_mut()),
                None => None,
            };
            Driver::new(table, options, cancellation.as_ref(), &text, scanner, reuse, tracer).run()
        };

        let tree = Tree::new(
            outcome.root,
            text,
            Arc::clone(table),
            version,
            outcome.diagnostics,
            outcome.status,
        );
        Ok(EditedTree {
            tree,
            changed_ranges: outcome.changed_ranges,
        })
    }
}
