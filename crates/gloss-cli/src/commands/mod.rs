pub mod compile;
pub mod edit;
pub mod input;
pub mod parse;
pub mod table;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod edit_tests;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use gloss_lib::{GrammarTable, ParseOptions, Parser, SexpOptions, Tree};

use crate::cli::{LimitArgs, OutputArgs};

/// Failures that stop a command before it produces output.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Gloss(#[from] gloss_lib::Error),

    #[error("{0}")]
    Usage(String),
}

impl From<gloss_lib::EditError> for CliError {
    fn from(e: gloss_lib::EditError) -> Self {
        CliError::Gloss(e.into())
    }
}

/// Tree rendering settings shared by `parse` and `edit`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Render {
    pub raw: bool,
    pub spans: bool,
    pub color: bool,
}

impl From<&OutputArgs> for Render {
    fn from(args: &OutputArgs) -> Self {
        Self {
            raw: args.raw,
            spans: args.spans,
            color: args.color.should_colorize(),
        }
    }
}

impl Render {
    pub fn tree(&self, tree: &Tree) -> String {
        let mut out = tree.to_sexp_with(SexpOptions {
            include_anonymous: self.raw,
            spans: self.spans,
        });
        out.push('\n');
        out
    }

    /// Diagnostics plus a note when the parse stopped early. Empty when clean.
    pub fn diagnostics(&self, tree: &Tree, path: &str) -> String {
        let mut out = String::new();
        if !tree.diagnostics().is_empty() {
            out.push_str(
                &tree
                    .diagnostics()
                    .printer(tree.text())
                    .path(path)
                    .colored(self.color)
                    .render(),
            );
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        if !tree.is_complete() {
            out.push_str(&format!("note: parse stopped early ({})\n", tree.status()));
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Limits {
    pub max_versions: Option<usize>,
    pub fuel: Option<u64>,
}

impl From<&LimitArgs> for Limits {
    fn from(args: &LimitArgs) -> Self {
        Self {
            max_versions: args.max_versions,
            fuel: args.fuel,
        }
    }
}

impl Limits {
    pub fn parser(&self, table: &Arc<GrammarTable>) -> Parser {
        let mut options = ParseOptions::new();
        if let Some(n) = self.max_versions {
            options = options.max_versions(n);
        }
        if let Some(fuel) = self.fuel {
            options = options.exec_fuel(fuel);
        }
        Parser::builder(Arc::clone(table)).options(options).build()
    }
}
