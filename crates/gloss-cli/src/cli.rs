use std::ops::Range;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            // Piping either stream turns colors off.
            ColorChoice::Auto => {
                std::io::IsTerminal::is_terminal(&std::io::stdout())
                    && std::io::IsTerminal::is_terminal(&std::io::stderr())
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "gloss", bin_name = "gloss")]
#[command(about = "Incremental GLR parsing for tree-sitter-style grammars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile grammar.json into a binary parse table
    #[command(after_help = r#"EXAMPLES:
  gloss compile grammar.json
  gloss compile grammar.json -o calc.table"#)]
    Compile {
        /// Grammar in tree-sitter's grammar.json format
        #[arg(value_name = "GRAMMAR")]
        grammar: PathBuf,

        /// Output path (default: GRAMMAR with a .table extension)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Parse a file and print its syntax tree
    #[command(after_help = r#"EXAMPLES:
  gloss parse --grammar grammar.json input.txt
  gloss parse --table calc.table input.txt --spans
  gloss parse --grammar grammar.json input.txt --raw
  gloss parse --grammar grammar.json input.txt --trace -vv"#)]
    Parse {
        #[command(flatten)]
        table: TableArgs,

        /// Source file (use "-" for stdin)
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print parser actions before the tree
        #[arg(long)]
        trace: bool,

        /// Trace verbosity (-v lexing and forks, -vv token text)
        #[arg(short = 'v', action = clap::ArgAction::Count)]
        verbose: u8,
    },

    /// Apply an edit to a file and reparse incrementally
    #[command(after_help = r#"EXAMPLES:
  gloss edit --grammar grammar.json input.txt --range 4..5 --text 30"#)]
    Edit {
        #[command(flatten)]
        table: TableArgs,

        /// Source file (use "-" for stdin)
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Byte range to replace
        #[arg(long, value_name = "START..END", value_parser = parse_range)]
        range: Range<usize>,

        /// Replacement text
        #[arg(long, value_name = "NEW", default_value = "")]
        text: String,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Dump symbols, states and lex modes of a table
    Table {
        #[command(flatten)]
        table: TableArgs,

        /// Print symbols as JSON instead
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
#[group(id = "table_input", required = true, multiple = false)]
pub struct TableArgs {
    /// Grammar in grammar.json format, compiled on the fly
    #[arg(long, value_name = "FILE")]
    pub grammar: Option<PathBuf>,

    /// Binary table written by `gloss compile`
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Include anonymous nodes (literals, punctuation)
    #[arg(long)]
    pub raw: bool,

    /// Show byte ranges
    #[arg(long)]
    pub spans: bool,

    /// Colorize diagnostics
    #[arg(long, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,
}

#[derive(Args)]
pub struct LimitArgs {
    /// Live parse versions kept after each token
    #[arg(long, value_name = "N")]
    pub max_versions: Option<usize>,

    /// Parser actions allowed before giving up
    #[arg(long, value_name = "N")]
    pub fuel: Option<u64>,
}

/// Parses `START..END` into a byte range.
pub fn parse_range(value: &str) -> Result<Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got `{value}`"))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start offset `{start}`"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end offset `{end}`"))?;
    if start > end {
        return Err(format!("start {start} is after end {end}"));
    }
    Ok(start..end)
}
