mod cli;
mod commands;


use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use commands::input::TableSource;
use commands::{CliError, compile, edit, parse, table};

fn main() -> ExitCode {
    match dispatch(Cli::parse().command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Command) -> Result<ExitCode, CliError> {
    match command {
        Command::Compile { grammar, output } => {
            compile::run(compile::CompileArgs { grammar, output })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse {
            table,
            source,
            output,
            limits,
            trace,
            verbose,
        } => parse::run(parse::ParseArgs {
            table: TableSource::from_args(table.grammar, table.table)?,
            source,
            render: (&output).into(),
            limits: (&limits).into(),
            trace: trace.then(|| parse::verbosity(verbose)),
        }),
        Command::Edit {
            table,
            source,
            range,
            text,
            output,
            limits,
        } => edit::run(edit::EditArgs {
            table: TableSource::from_args(table.grammar, table.table)?,
            source,
            range,
            text,
            render: (&output).into(),
            limits: (&limits).into(),
        }),
        Command::Table { table: args, json } => {
            table::run(table::TableArgs {
                table: TableSource::from_args(args.grammar, args.table)?,
                json,
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
