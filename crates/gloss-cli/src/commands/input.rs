//! Loading tables and sources from the command line.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gloss_lib::GrammarTable;

use super::CliError;

/// Where the parse table comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableSource {
    Grammar(PathBuf),
    Binary(PathBuf),
}

impl TableSource {
    pub fn from_args(grammar: Option<PathBuf>, table: Option<PathBuf>) -> Result<Self, CliError> {
        match (grammar, table) {
            (Some(path), None) => Ok(TableSource::Grammar(path)),
            (None, Some(path)) => Ok(TableSource::Binary(path)),
            _ => Err(CliError::Usage(
                "exactly one of --grammar or --table is required".to_string(),
            )),
        }
    }

    pub fn load(&self) -> Result<Arc<GrammarTable>, CliError> {
        match self {
            TableSource::Grammar(path) => {
                let json = read_text(path)?;
                Ok(gloss_lib::compile_grammar(&json)?)
            }
            TableSource::Binary(path) => {
                let bytes = fs::read(path).map_err(|source| CliError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(gloss_lib::load_table(&bytes)?)
            }
        }
    }
}

/// Reads a UTF-8 file, or stdin for `-`.
pub fn read_text(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read {
                path: "<stdin>".to_string(),
                source,
            })?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Name used in diagnostics for `path`.
pub fn display_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
